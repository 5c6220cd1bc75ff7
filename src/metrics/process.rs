// Per-process metrics capture and the pid liveness probe

use crate::error::{AgentError, Result};
use crate::metrics::Storage;
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::path::Path;

/// Capture memory, thread and CPU metrics for one process.
/// `root` is normally `/proc`; tests point it at a fixture tree.
///
/// Series populated: `memory/rss`, `memory/vsz` (bytes), `threads/`,
/// `cpu/user`, `cpu/system` and `cpu/` (ticks consumed since the
/// previous capture; zero on the first).
pub fn capture_process(store: &mut Storage, root: &Path, pid: i32) -> Result<()> {
    let dir = root.join(pid.to_string());
    collect_memory(store, &dir, pid)?;
    collect_cpu(store, &dir, pid)?;
    Ok(())
}

/// Zero-effect existence check for a pid. EPERM means the process exists
/// but belongs to someone else, which still counts as alive.
pub fn process_exists(pid: i32) -> bool {
    matches!(kill(Pid::from_raw(pid), None), Ok(()) | Err(Errno::EPERM))
}

fn collect_memory(store: &mut Storage, dir: &Path, pid: i32) -> Result<()> {
    let content = std::fs::read_to_string(dir.join("status")).map_err(|e| {
        AgentError::MetricsCapture(format!("Failed to read status for pid {}: {}", pid, e))
    })?;

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            // VmRSS/VmSize are reported in kB
            let bytes = parts[1].parse::<u64>().unwrap_or(0) * 1024;
            match parts[0] {
                "VmRSS:" => store.record("memory", "rss", bytes as f64),
                "VmSize:" => store.record("memory", "vsz", bytes as f64),
                _ => {}
            }
        }
    }
    Ok(())
}

fn collect_cpu(store: &mut Storage, dir: &Path, pid: i32) -> Result<()> {
    let content = std::fs::read_to_string(dir.join("stat")).map_err(|e| {
        AgentError::MetricsCapture(format!("Failed to read stat for pid {}: {}", pid, e))
    })?;

    // The comm field may contain spaces, so parse from after its closing paren
    let rest = content
        .rsplit_once(')')
        .map(|(_, rest)| rest)
        .ok_or_else(|| AgentError::MetricsCapture(format!("Malformed stat for pid {}", pid)))?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    if fields.len() < 18 {
        return Err(AgentError::MetricsCapture(format!("Malformed stat for pid {}", pid)).into());
    }

    let utime = fields[11].parse::<u64>().unwrap_or(0);
    let stime = fields[12].parse::<u64>().unwrap_or(0);
    let threads = fields[17].parse::<u64>().unwrap_or(0);

    let prev_user = store.get("cpu", "user_ticks");
    let prev_system = store.get("cpu", "system_ticks").unwrap_or(0.0);

    store.record("cpu", "user_ticks", utime as f64);
    store.record("cpu", "system_ticks", stime as f64);
    store.record("threads", "", threads as f64);

    match prev_user {
        Some(pu) if utime as f64 >= pu && stime as f64 >= prev_system => {
            let du = utime as f64 - pu;
            let ds = stime as f64 - prev_system;
            store.record("cpu", "user", du);
            store.record("cpu", "system", ds);
            store.record("cpu", "", du + ds);
        }
        _ => {
            for name in ["user", "system", ""] {
                store.record("cpu", name, 0.0);
            }
        }
    }
    Ok(())
}
