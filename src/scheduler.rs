// The cycle loop: parallel collect, completion barrier, verify pass

use crate::init::ManagerRegistry;
use crate::monitor::Checkable;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// Signals the scheduler's completion channel exactly once, when dropped.
/// Collect receives one per invocation; because the signal rides on Drop
/// it fires on every exit path, early returns and panics included.
pub struct CompletionGuard {
    tx: mpsc::UnboundedSender<String>,
    name: String,
}

impl CompletionGuard {
    pub fn new(name: impl Into<String>, tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx, name: name.into() }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(std::mem::take(&mut self.name));
    }
}

struct Slot {
    name: String,
    checkable: Arc<Mutex<Checkable>>,
}

/// Dispatches one task per checkable per cycle. Entities run in parallel
/// across the cycle; the per-entity mutex keeps collect and verify for the
/// same entity from overlapping.
pub struct Scheduler {
    slots: Vec<Slot>,
    managers: Arc<ManagerRegistry>,
    proc_root: PathBuf,
    interval: Duration,
}

impl Scheduler {
    pub fn new(
        entities: Vec<Checkable>,
        managers: Arc<ManagerRegistry>,
        proc_root: PathBuf,
        interval: Duration,
    ) -> Self {
        let slots = entities
            .into_iter()
            .map(|c| Slot {
                name: c.name().to_string(),
                checkable: Arc::new(Mutex::new(c)),
            })
            .collect();

        Self { slots, managers, proc_root, interval }
    }

    /// Resolve every entity against the manager registry. A resolution
    /// failure is reported once; the entity is then skipped by every
    /// future cycle rather than crashing the agent.
    pub async fn resolve_all(&self) {
        for slot in &self.slots {
            if let Err(e) = slot.checkable.lock().await.resolve(&self.managers).await {
                tracing::error!("{}", e);
            }
        }
    }

    /// Run cycles forever at the configured interval
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One full monitoring cycle: spawn a collect task per entity, wait
    /// for every completion guard to fire, then run the verify pass.
    pub async fn run_cycle(&self) {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        for slot in &self.slots {
            let guard = CompletionGuard::new(slot.name.clone(), tx.clone());
            let checkable = slot.checkable.clone();
            let managers = self.managers.clone();
            let proc_root = self.proc_root.clone();

            tokio::spawn(async move {
                checkable.lock().await.collect(&managers, &proc_root, guard).await;
            });
        }
        drop(tx);

        // Cycle barrier: the channel closes once every guard has fired
        let mut completed = 0usize;
        while let Some(name) = rx.recv().await {
            tracing::debug!("Collected {}", name);
            completed += 1;
        }
        tracing::debug!("Cycle complete, {} entities collected", completed);

        for slot in &self.slots {
            let events = slot.checkable.lock().await.verify();
            if !events.is_empty() {
                tracing::debug!("{} emitted {} rule event(s)", slot.name, events.len());
            }
        }
    }

    /// The monitored entities, in configuration order
    pub fn checkables(&self) -> impl Iterator<Item = &Arc<Mutex<Checkable>>> {
        self.slots.iter().map(|s| &s.checkable)
    }
}
