// Host-level metrics capture from a /proc-style tree

use crate::error::{AgentError, Result};
use crate::metrics::Storage;
use std::path::Path;

/// Capture load, memory, swap and CPU metrics for the local machine.
/// `root` is normally `/proc`; tests point it at a fixture tree.
///
/// Series populated: `load/1`, `load/5`, `load/15`, `memory/` (% used),
/// `swap/` (% used), `cpu/user`, `cpu/system`, `cpu/iowait`, `cpu/steal`
/// and `cpu/` (% busy). CPU percentages are deltas against the previous
/// capture, so the first capture records zeros.
pub fn capture_host(store: &mut Storage, root: &Path) -> Result<()> {
    collect_load(store, root)?;
    collect_memory(store, root)?;
    collect_cpu(store, root)?;
    Ok(())
}

fn collect_load(store: &mut Storage, root: &Path) -> Result<()> {
    let content = std::fs::read_to_string(root.join("loadavg"))
        .map_err(|e| AgentError::MetricsCapture(format!("Failed to read loadavg: {}", e)))?;

    let mut fields = content.split_whitespace();
    for name in ["1", "5", "15"] {
        let value = fields
            .next()
            .and_then(|f| f.parse::<f64>().ok())
            .ok_or_else(|| AgentError::MetricsCapture(format!("Malformed loadavg: {}", content.trim())))?;
        store.record("load", name, value);
    }
    Ok(())
}

fn collect_memory(store: &mut Storage, root: &Path) -> Result<()> {
    let content = std::fs::read_to_string(root.join("meminfo"))
        .map_err(|e| AgentError::MetricsCapture(format!("Failed to read meminfo: {}", e)))?;

    let mut total = 0u64;
    let mut available = 0u64;
    let mut swap_total = 0u64;
    let mut swap_free = 0u64;

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            let value = parts[1].parse::<u64>().unwrap_or(0);
            match parts[0] {
                "MemTotal:" => total = value,
                "MemAvailable:" => available = value,
                "SwapTotal:" => swap_total = value,
                "SwapFree:" => swap_free = value,
                _ => {}
            }
        }
    }

    store.record("memory", "", percent_used(total, available));
    store.record("swap", "", percent_used(swap_total, swap_free));
    Ok(())
}

fn percent_used(total: u64, free: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (total.saturating_sub(free) as f64 / total as f64) * 100.0
}

fn collect_cpu(store: &mut Storage, root: &Path) -> Result<()> {
    let content = std::fs::read_to_string(root.join("stat"))
        .map_err(|e| AgentError::MetricsCapture(format!("Failed to read stat: {}", e)))?;

    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| AgentError::MetricsCapture("No aggregate cpu line in stat".to_string()))?;

    // cpu  user nice system idle iowait irq softirq steal ...
    let ticks: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|f| f.parse().ok())
        .collect();
    if ticks.len() < 5 {
        return Err(AgentError::MetricsCapture(format!("Malformed cpu line: {}", line)).into());
    }

    let user = ticks[0];
    let system = ticks[2];
    let idle = ticks[3];
    let iowait = ticks[4];
    let steal = *ticks.get(7).unwrap_or(&0);
    let total: u64 = ticks.iter().sum();

    let prev_total = store.get("cpu", "total_ticks");
    let prev_user = store.get("cpu", "user_ticks").unwrap_or(0.0);
    let prev_system = store.get("cpu", "system_ticks").unwrap_or(0.0);
    let prev_idle = store.get("cpu", "idle_ticks").unwrap_or(0.0);
    let prev_iowait = store.get("cpu", "iowait_ticks").unwrap_or(0.0);
    let prev_steal = store.get("cpu", "steal_ticks").unwrap_or(0.0);

    // Raw cumulative counters kept so the next capture can take deltas
    store.record("cpu", "total_ticks", total as f64);
    store.record("cpu", "user_ticks", user as f64);
    store.record("cpu", "system_ticks", system as f64);
    store.record("cpu", "idle_ticks", idle as f64);
    store.record("cpu", "iowait_ticks", iowait as f64);
    store.record("cpu", "steal_ticks", steal as f64);

    match prev_total {
        Some(pt) if (total as f64) > pt => {
            let dt = total as f64 - pt;
            let busy = dt - (idle as f64 - prev_idle) - (iowait as f64 - prev_iowait);
            store.record("cpu", "user", (user as f64 - prev_user) / dt * 100.0);
            store.record("cpu", "system", (system as f64 - prev_system) / dt * 100.0);
            store.record("cpu", "iowait", (iowait as f64 - prev_iowait) / dt * 100.0);
            store.record("cpu", "steal", (steal as f64 - prev_steal) / dt * 100.0);
            store.record("cpu", "", busy / dt * 100.0);
        }
        _ => {
            // First capture, or the counters went backwards (reboot)
            for name in ["user", "system", "iowait", "steal", ""] {
                store.record("cpu", name, 0.0);
            }
        }
    }
    Ok(())
}
