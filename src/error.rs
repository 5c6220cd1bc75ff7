// Error types for procwatch

use thiserror::Error;

/// Result type alias using anyhow::Error
pub type Result<T> = anyhow::Result<T>;

/// Procwatch-specific error types
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to connect to init system bus: {0}")]
    BusConnection(String),

    #[error("Failed to look up service '{service}': {message}")]
    ServiceLookup { service: String, message: String },

    #[error("Failed to control service '{service}': {message}")]
    ServiceControl { service: String, message: String },

    #[error("Could not find service '{0}', did you misspell it?")]
    ServiceUnresolved(String),

    #[error("Failed to capture metrics: {0}")]
    MetricsCapture(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
