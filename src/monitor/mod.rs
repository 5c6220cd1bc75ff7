// Entity orchestration: the checkable abstraction, the process-status
// state machine and the per-cycle collect/verify control flow

pub mod checkable;
pub mod entity;
pub mod host;
pub mod service;


pub use checkable::{Checkable, Restartable};
pub use entity::Entity;
pub use host::Host;
pub use service::Service;
