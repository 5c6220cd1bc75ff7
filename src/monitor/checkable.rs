// The polymorphic monitorable contract

use crate::error::Result;
use crate::event::Event;
use crate::init::ManagerRegistry;
use crate::metrics::Storage;
use crate::monitor::{Entity, Host, Service};
use crate::rules::Rule;
use crate::scheduler::CompletionGuard;
use std::collections::HashMap;
use std::path::Path;

/// Something a service can ask its init system to do again
pub trait Restartable {
    fn restart(&mut self, managers: &ManagerRegistry) -> Result<()>;
}

/// Anything procwatch can monitor: the local host, or a service bound to
/// one OS process. Collect and verify run once per cycle per checkable.
pub enum Checkable {
    Host(Host),
    Service(Service),
}

impl Checkable {
    fn entity(&self) -> &Entity {
        match self {
            Checkable::Host(h) => h.entity(),
            Checkable::Service(s) => s.entity(),
        }
    }

    pub fn name(&self) -> &str {
        self.entity().name()
    }

    pub fn owner(&self) -> &str {
        self.entity().owner()
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        self.entity().parameters()
    }

    pub fn metrics(&self) -> &Storage {
        self.entity().metrics()
    }

    pub fn rules(&self) -> &[Rule] {
        self.entity().rules()
    }

    /// One-time startup binding. Trivial for the host; services search the
    /// manager registry in order.
    pub async fn resolve(&mut self, managers: &ManagerRegistry) -> Result<()> {
        match self {
            Checkable::Host(_) => Ok(()),
            Checkable::Service(s) => s.resolve(managers).await,
        }
    }

    /// One monitoring cycle. The guard signals completion on every exit
    /// path, which is what lets the scheduler build its cycle barrier.
    pub async fn collect(&mut self, managers: &ManagerRegistry, proc_root: &Path, done: CompletionGuard) {
        match self {
            Checkable::Host(h) => h.collect(proc_root, done).await,
            Checkable::Service(s) => s.collect(managers, proc_root, done).await,
        }
    }

    /// Run the rule engine against the current metrics
    pub fn verify(&mut self) -> Vec<Event> {
        match self {
            Checkable::Host(h) => h.entity_mut().verify(),
            Checkable::Service(s) => s.entity_mut().verify(),
        }
    }

    /// Capability query: only services can be restarted
    pub fn as_restartable(&mut self) -> Option<&mut dyn Restartable> {
        match self {
            Checkable::Host(_) => None,
            Checkable::Service(s) => Some(s),
        }
    }
}

impl From<Host> for Checkable {
    fn from(host: Host) -> Self {
        Checkable::Host(host)
    }
}

impl From<Service> for Checkable {
    fn from(service: Service) -> Self {
        Checkable::Service(service)
    }
}
