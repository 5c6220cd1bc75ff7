// Ordered registry of available init systems

use crate::init::InitSystem;
use std::sync::Arc;

/// Non-owning handle a service keeps to the init system it resolved
/// against. The registry owns the adapters; services only hold an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerId(usize);

/// Ordered collection of init system slots. A slot may be absent when the
/// corresponding manager was unavailable at startup; resolution skips
/// absent slots without failing.
#[derive(Default)]
pub struct ManagerRegistry {
    slots: Vec<Option<Arc<dyn InitSystem>>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a usable init system, returning its handle
    pub fn register(&mut self, manager: Arc<dyn InitSystem>) -> ManagerId {
        self.slots.push(Some(manager));
        ManagerId(self.slots.len() - 1)
    }

    /// Add a placeholder for a manager that could not be brought up
    pub fn register_absent(&mut self) {
        self.slots.push(None);
    }

    /// Iterate usable managers in registration order
    pub fn iter(&self) -> impl Iterator<Item = (ManagerId, &Arc<dyn InitSystem>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|m| (ManagerId(i), m)))
    }

    pub fn get(&self, id: ManagerId) -> Option<&Arc<dyn InitSystem>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Clone out an owned handle, for detached tasks that outlive a borrow
    pub fn handle(&self, id: ManagerId) -> Option<Arc<dyn InitSystem>> {
        self.get(id).cloned()
    }

    /// Number of usable managers
    pub fn available(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }
}
