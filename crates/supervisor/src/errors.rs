//! Error types for node supervision.

use std::path::PathBuf;

use thiserror::Error;

use crate::process::NodeExit;
use crate::status::NodeStatus;

/// Fatal supervision errors.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Localnet crashed on startup ({exit})")]
    Crashed { exit: NodeExit },

    #[error("Failed to observe localnet process: {source}")]
    Wait {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to forward interrupt to localnet (pid {pid}): {reason}")]
    Interrupt { pid: u32, reason: String },

    #[error("Failed to build readiness client: {source}")]
    ProbeClient {
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid node status transition: {from} -> {to}")]
    InvalidTransition { from: NodeStatus, to: NodeStatus },
}

impl SupervisorError {
    /// True when the node never became ready, either because it could not be
    /// spawned or because it exited during startup.
    pub fn is_startup_failure(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::Crashed { .. })
    }
}

/// Errors from best-effort port reclamation. Never fatal.
#[derive(Debug, Error)]
pub enum ReclaimError {
    #[error("Failed to inspect port owners: {source}")]
    Inspect {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to terminate pid {pid}: {reason}")]
    Kill { pid: u32, reason: String },

    #[error("Port reclamation is not supported on this platform")]
    Unsupported,
}
