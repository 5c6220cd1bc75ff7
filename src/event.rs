// Monitoring events and the actions that consume them

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// What happened to a monitored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A watched process came (back) up
    ProcessExists,
    /// A watched process went away
    ProcessDoesNotExist,
    /// A rule tripped its threshold
    RuleFailed,
    /// A tripped rule returned in-bounds
    RuleRecovered,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventType::ProcessExists => "process exists",
            EventType::ProcessDoesNotExist => "process does not exist",
            EventType::RuleFailed => "rule failed",
            EventType::RuleRecovered => "rule recovered",
        };
        f.write_str(label)
    }
}

/// A transient monitoring event. The source is the producing entity's name,
/// carried as a snapshot so events can cross into detached tasks.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event_type: EventType,
    pub source: String,
    pub owner: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub at: DateTime<Utc>,
    pub message: Option<String>,
}

impl Event {
    pub fn new(event_type: EventType, source: &str, owner: &str, message: Option<String>) -> Self {
        Self {
            event_type,
            source: source.to_string(),
            owner: owner.to_string(),
            at: Utc::now(),
            message,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "[{}] {}: {}", self.source, self.event_type, msg),
            None => write!(f, "[{}] {}", self.source, self.event_type),
        }
    }
}

/// Consumes events. Triggered synchronously by the verify pass and by
/// process-status transitions; implementations that do real I/O detach it.
pub trait Action: Send + Sync {
    fn trigger(&self, event: &Event);
}

/// Writes the event to the structured log
pub struct LogAction;

impl Action for LogAction {
    fn trigger(&self, event: &Event) {
        match event.event_type {
            EventType::ProcessDoesNotExist | EventType::RuleFailed => {
                tracing::error!(source = %event.source, owner = %event.owner, "{}", event);
            }
            EventType::ProcessExists | EventType::RuleRecovered => {
                tracing::info!(source = %event.source, owner = %event.owner, "{}", event);
            }
        }
    }
}

/// POSTs the JSON-serialized event to a webhook. The HTTP call is
/// fire-and-forget: failures are logged, never surfaced to the caller.
pub struct WebhookAction {
    client: reqwest::Client,
    url: String,
}

impl WebhookAction {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Action for WebhookAction {
    fn trigger(&self, event: &Event) {
        let client = self.client.clone();
        let url = self.url.clone();
        let payload = event.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!(url = %url, "Delivered alert for {}", payload.source);
                }
                Ok(resp) => {
                    tracing::warn!(url = %url, status = %resp.status(), "Alert webhook rejected event");
                }
                Err(e) => {
                    tracing::warn!(url = %url, "Failed to deliver alert: {}", e);
                }
            }
        });
    }
}
