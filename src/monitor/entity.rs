// Shared state for anything procwatch can check

use crate::event::Event;
use crate::metrics::Storage;
use crate::rules::Rule;
use std::collections::HashMap;

/// A named thing which can be checked: name, frozen parameters, a fixed
/// ordered rule set, and an exclusively-owned metrics store.
pub struct Entity {
    name: String,
    parameters: HashMap<String, String>,
    rules: Vec<Rule>,
    metrics: Storage,
}

impl Entity {
    pub fn new(
        name: impl Into<String>,
        parameters: HashMap<String, String>,
        rules: Vec<Rule>,
        metrics: Storage,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            rules,
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn owner(&self) -> &str {
        self.parameter("owner").unwrap_or_default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn metrics(&self) -> &Storage {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut Storage {
        &mut self.metrics
    }

    /// Run every rule in order against the current metrics. Each produced
    /// event is dispatched to that rule's actions synchronously, in the
    /// rule's configured order, and collected into the returned sequence.
    pub fn verify(&mut self) -> Vec<Event> {
        let source = self.name.clone();
        let owner = self.owner().to_string();

        let mut events = Vec::new();
        for rule in &mut self.rules {
            if let Some(event) = rule.check(&self.metrics, &source, &owner) {
                for action in rule.actions() {
                    action.trigger(&event);
                }
                events.push(event);
            }
        }
        events
    }
}
