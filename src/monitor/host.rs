// Host is the local machine

use crate::error::Result;
use crate::metrics::{capture_host, Storage};
use crate::monitor::Entity;
use crate::rules::Rule;
use crate::scheduler::CompletionGuard;
use std::collections::HashMap;
use std::path::Path;

/// The local machine. Always trivially resolved; has no backing process
/// and no restart capability.
pub struct Host {
    entity: Entity,
}

impl Host {
    pub fn new(parameters: HashMap<String, String>, rules: Vec<Rule>) -> Self {
        Self {
            entity: Entity::new("localhost", parameters, rules, Storage::host_store()),
        }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    /// One monitoring cycle for the host. A capture failure is non-fatal;
    /// the next cycle retries. The guard signals the scheduler on drop.
    pub async fn collect(&mut self, proc_root: &Path, _done: CompletionGuard) {
        if let Err(e) = self.capture(proc_root) {
            tracing::warn!("Error collecting host metrics: {}", e);
        }
    }

    pub fn capture(&mut self, proc_root: &Path) -> Result<()> {
        capture_host(self.entity.metrics_mut(), proc_root)
    }
}
