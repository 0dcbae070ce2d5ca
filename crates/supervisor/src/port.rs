//! Best-effort reclamation of the node port before launch.

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::ReclaimError;

/// Finds the pid of a `process_name` process in `lsof -i` output.
///
/// Matches lines whose command column starts with `process_name` and reads the
/// pid from the second column. The last matching line wins.
pub fn find_port_owner(lsof_output: &str, process_name: &str) -> Option<u32> {
    lsof_output
        .lines()
        .filter(|line| line.starts_with(process_name))
        .filter_map(|line| line.split_whitespace().nth(1)?.parse::<u32>().ok())
        .last()
}

/// Terminates a stale node still bound to `port`.
///
/// Returns the pid that was signalled, or `None` when no matching process
/// holds the port. Callers treat every error as non-fatal.
pub async fn reclaim_port(port: u16, process_name: &str) -> Result<Option<u32>, ReclaimError> {
    let output = Command::new("lsof")
        .arg("-i")
        .arg(format!(":{port}"))
        .output()
        .await
        .map_err(|source| ReclaimError::Inspect { source })?;

    // lsof exits non-zero when nothing is bound, so only stdout matters.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let Some(pid) = find_port_owner(&stdout, process_name) else {
        debug!(port, process = process_name, "No stale process holds the port");
        return Ok(None);
    };

    terminate(pid)?;
    info!(port, pid, "Killed existing process occupying port");
    Ok(Some(pid))
}

#[cfg(unix)]
fn terminate(pid: u32) -> Result<(), ReclaimError> {
    let raw_pid = libc::pid_t::try_from(pid).map_err(|_| ReclaimError::Kill {
        pid,
        reason: "pid out of range".to_string(),
    })?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(raw_pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(ReclaimError::Kill {
            pid,
            reason: std::io::Error::last_os_error().to_string(),
        })
    }
}

#[cfg(not(unix))]
fn terminate(_pid: u32) -> Result<(), ReclaimError> {
    Err(ReclaimError::Unsupported)
}
