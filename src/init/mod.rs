// Init system integration: the lookup/restart contract and its adapters

pub mod registry;
pub mod systemd;

#[cfg(test)]
mod tests;

pub use registry::{ManagerId, ManagerRegistry};
pub use systemd::SystemdManager;

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Lifecycle state of a service's backing process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Never resolved; the only legal initial state
    Unknown,
    Starting,
    Up,
    Down,
}

/// What an init system knows about a service's process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    pub pid: i32,
    pub state: ProcessState,
}

impl ProcessStatus {
    pub fn unknown() -> Self {
        Self { pid: 0, state: ProcessState::Unknown }
    }

    pub fn starting() -> Self {
        Self { pid: 0, state: ProcessState::Starting }
    }

    pub fn up(pid: i32) -> Self {
        Self { pid, state: ProcessState::Up }
    }

    pub fn down() -> Self {
        Self { pid: 0, state: ProcessState::Down }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            ProcessState::Unknown => write!(f, "unknown"),
            ProcessState::Starting => write!(f, "starting"),
            ProcessState::Up => write!(f, "up (pid {})", self.pid),
            ProcessState::Down => write!(f, "down"),
        }
    }
}

/// Why a service lookup failed. NotFound is the soft "this manager simply
/// doesn't manage that service" condition; resolution continues past it.
/// Anything else aborts resolution.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("service not managed by this init system")]
    NotFound,

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// An init system that can look up and restart OS-managed services
#[async_trait]
pub trait InitSystem: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Resolve a service name to its current process status
    async fn lookup_service(&self, service: &str) -> std::result::Result<ProcessStatus, LookupError>;

    /// Ask the init system to restart a service
    async fn restart_service(&self, service: &str) -> Result<()>;
}
