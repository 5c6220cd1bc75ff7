// A service is an entity which resolves to a process we can monitor

use crate::error::{AgentError, Result};
use crate::event::{Action, Event, EventType};
use crate::init::{LookupError, ManagerId, ManagerRegistry, ProcessState, ProcessStatus};
use crate::metrics::{capture_process, process_exists, Storage};
use crate::monitor::checkable::Restartable;
use crate::monitor::Entity;
use crate::rules::Rule;
use crate::scheduler::CompletionGuard;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// An entity bound to exactly one OS process, managed by the init system
/// it resolved against at startup.
pub struct Service {
    entity: Entity,
    /// Handles process events: exists, doesn't exist
    event_handler: Arc<dyn Action>,
    process: ProcessStatus,
    manager: Option<ManagerId>,
}

impl Service {
    pub fn new(
        name: impl Into<String>,
        parameters: HashMap<String, String>,
        rules: Vec<Rule>,
        event_handler: Arc<dyn Action>,
    ) -> Self {
        Self {
            entity: Entity::new(name, parameters, rules, Storage::process_store()),
            event_handler,
            process: ProcessStatus::unknown(),
            manager: None,
        }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    pub fn process(&self) -> ProcessStatus {
        self.process
    }

    pub fn manager(&self) -> Option<ManagerId> {
        self.manager
    }

    /// The single state-change primitive. Replaces the process status
    /// wholesale and emits a process event to the handler when warranted:
    /// a recovery into Up (never the first Unknown -> Up at startup), or
    /// any move to Down. Down always resets the pid to 0.
    pub fn transition(&mut self, mut new_status: ProcessStatus) {
        let old_state = self.process.state;
        if new_status.state == ProcessState::Down {
            new_status.pid = 0;
        }
        self.process = new_status;

        match self.process.state {
            ProcessState::Up if old_state != ProcessState::Unknown => {
                self.emit(EventType::ProcessExists);
            }
            ProcessState::Down => {
                self.emit(EventType::ProcessDoesNotExist);
            }
            _ => {}
        }
    }

    fn emit(&self, event_type: EventType) {
        let event = Event::new(event_type, self.entity.name(), self.entity.owner(), None);
        self.event_handler.trigger(&event);
    }

    /// One-time startup binding to the first init system that recognizes
    /// this service. A NotFound lookup moves on to the next manager; any
    /// other lookup failure aborts resolution. When two managers both
    /// claim the name, the first in registry order wins; beyond that the
    /// behavior is undefined.
    pub async fn resolve(&mut self, managers: &ManagerRegistry) -> Result<()> {
        for (id, manager) in managers.iter() {
            match manager.lookup_service(self.entity.name()).await {
                Err(LookupError::NotFound) => {
                    tracing::debug!("{} doesn't have {}", manager.name(), self.entity.name());
                    continue;
                }
                Err(LookupError::Failed(e)) => return Err(e),
                Ok(status) => {
                    tracing::info!(
                        "Found {}/{} with status {}",
                        manager.name(),
                        self.entity.name(),
                        status
                    );
                    self.manager = Some(id);
                    self.transition(status);
                    break;
                }
            }
        }

        if self.manager.is_none() {
            return Err(AgentError::ServiceUnresolved(self.entity.name().to_string()).into());
        }
        Ok(())
    }

    /// One monitoring cycle: confirm the service is up, then capture its
    /// process metrics. Errors are handled here, never returned; the guard
    /// signals the scheduler on drop, on every exit path.
    ///
    /// The manager is only re-queried while the state is not Up, so an
    /// Up -> Down -> Up flap faster than one cycle can go unobserved.
    pub async fn collect(&mut self, managers: &ManagerRegistry, proc_root: &Path, _done: CompletionGuard) {
        let Some(id) = self.manager else {
            // Couldn't resolve it when we started up so we can't collect it.
            return;
        };
        let Some(manager) = managers.get(id) else {
            return;
        };

        if self.process.state != ProcessState::Up {
            match manager.lookup_service(self.entity.name()).await {
                Ok(status) => self.transition(status),
                Err(e) => {
                    // Transient manager trouble; leave the state machine alone
                    tracing::warn!("Failed to look up {}: {}", self.entity.name(), e);
                }
            }
        }

        if self.process.state == ProcessState::Up {
            if let Err(capture_err) = self.capture(proc_root) {
                if process_exists(self.process.pid) {
                    tracing::warn!(
                        "Error capturing metrics for process {}: {}",
                        self.process.pid,
                        capture_err
                    );
                } else {
                    tracing::info!(
                        "Service {} with process {} does not exist",
                        self.entity.name(),
                        self.process.pid
                    );
                    self.transition(ProcessStatus::down());
                }
            }
        }
    }

    pub fn capture(&mut self, proc_root: &Path) -> Result<()> {
        let pid = self.process.pid;
        capture_process(self.entity.metrics_mut(), proc_root, pid)
    }
}

impl Restartable for Service {
    /// Set an optimistic Starting placeholder and hand the actual restart
    /// to a detached task. The task only logs its outcome; the next
    /// collect cycle's lookup corrects the state either way. The caller
    /// is never blocked on the init system.
    fn restart(&mut self, managers: &ManagerRegistry) -> Result<()> {
        let Some(manager) = self.manager.and_then(|id| managers.handle(id)) else {
            return Err(AgentError::ServiceUnresolved(self.entity.name().to_string()).into());
        };

        self.process = ProcessStatus::starting();

        let name = self.entity.name().to_string();
        tokio::spawn(async move {
            tracing::debug!("Restarting {}", name);
            match manager.restart_service(&name).await {
                Ok(()) => tracing::debug!("Restarted {}", name),
                Err(e) => tracing::warn!("Failed to restart {}: {}", name, e),
            }
        });

        Ok(())
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.entity.name(), self.process)
    }
}
