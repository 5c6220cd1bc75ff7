// Metrics storage and /proc-based capture

pub mod host;
pub mod process;


pub use host::capture_host;
pub use process::{capture_process, process_exists};

use std::collections::HashMap;
use std::collections::VecDeque;

/// Samples kept per host series
pub const HOST_HISTORY: usize = 15;
/// Samples kept per process series
pub const PROCESS_HISTORY: usize = 5;

/// Bounded-history numeric store keyed by (family, name).
/// Owned exclusively by one entity; capture functions append to it and
/// rules read the most recent sample.
#[derive(Debug)]
pub struct Storage {
    series: HashMap<(String, String), VecDeque<f64>>,
    capacity: usize,
}

impl Storage {
    /// Create a store sized for host metrics
    pub fn host_store() -> Self {
        Self::with_capacity(HOST_HISTORY)
    }

    /// Create a store sized for per-process metrics
    pub fn process_store() -> Self {
        Self::with_capacity(PROCESS_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            series: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample, rotating out the oldest once the series is full
    pub fn record(&mut self, family: &str, name: &str, value: f64) {
        let series = self
            .series
            .entry((family.to_string(), name.to_string()))
            .or_default();
        if series.len() == self.capacity {
            series.pop_front();
        }
        series.push_back(value);
    }

    /// Most recent sample for a series, if any has been recorded
    pub fn get(&self, family: &str, name: &str) -> Option<f64> {
        self.series
            .get(&(family.to_string(), name.to_string()))
            .and_then(|s| s.back().copied())
    }

    /// Full recorded history for a series, oldest first
    pub fn history(&self, family: &str, name: &str) -> Vec<f64> {
        self.series
            .get(&(family.to_string(), name.to_string()))
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }
}
