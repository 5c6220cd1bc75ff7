// Procwatch - Host and Service Monitoring Agent
// Library root

pub mod config;
pub mod error;
pub mod event;
pub mod init;
pub mod metrics;
pub mod monitor;
pub mod rules;
pub mod scheduler;
pub mod version;

// Test modules (only compiled during tests)
#[cfg(test)]
mod config_tests;
