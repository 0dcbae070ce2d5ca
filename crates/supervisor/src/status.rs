//! Node lifecycle states.

use std::fmt;
use std::time::SystemTime;

use tracing::debug;

use crate::errors::SupervisorError;

/// Status of the supervised node process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Nothing has been spawned yet.
    NotStarted,
    /// Process spawned, readiness not yet confirmed.
    Starting,
    /// Readiness endpoint answered; provisioning may run.
    Ready,
    /// Process exited before it became ready.
    Crashed,
    /// Provisioning finished (or was skipped); waiting for exit.
    Running,
    /// Process exited on its own.
    ExitedNormally,
    /// An interrupt was received.
    Interrupted,
    /// Interrupt forwarded, waiting for the process to exit.
    ShuttingDown,
    /// Process exited after an interrupt.
    Exited,
}

impl NodeStatus {
    pub fn display(&self) -> &'static str {
        match self {
            NodeStatus::NotStarted => "NotStarted",
            NodeStatus::Starting => "Starting",
            NodeStatus::Ready => "Ready",
            NodeStatus::Crashed => "Crashed",
            NodeStatus::Running => "Running",
            NodeStatus::ExitedNormally => "ExitedNormally",
            NodeStatus::Interrupted => "Interrupted",
            NodeStatus::ShuttingDown => "ShuttingDown",
            NodeStatus::Exited => "Exited",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeStatus::Crashed | NodeStatus::ExitedNormally | NodeStatus::Exited)
    }

    pub fn can_transition_to(&self, next: NodeStatus) -> bool {
        use NodeStatus::*;
        matches!(
            (self, next),
            (NotStarted, Starting)
                | (Starting, Ready | Crashed | Interrupted)
                | (Ready, Running | Interrupted)
                | (Running, ExitedNormally | Interrupted)
                | (Interrupted, ShuttingDown)
                | (ShuttingDown, Exited)
        )
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// A recorded status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: NodeStatus,
    pub at: SystemTime,
}

/// Tracks the node through its lifecycle and rejects illegal transitions.
#[derive(Debug, Clone)]
pub struct NodeLifecycle {
    status: NodeStatus,
    history: Vec<StatusChange>,
}

impl NodeLifecycle {
    pub fn new() -> Self {
        Self {
            status: NodeStatus::NotStarted,
            history: vec![StatusChange {
                status: NodeStatus::NotStarted,
                at: SystemTime::now(),
            }],
        }
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    /// Statuses visited so far, oldest first.
    pub fn path(&self) -> Vec<NodeStatus> {
        self.history.iter().map(|change| change.status).collect()
    }

    pub fn transition(&mut self, next: NodeStatus) -> Result<(), SupervisorError> {
        if !self.status.can_transition_to(next) {
            return Err(SupervisorError::InvalidTransition { from: self.status, to: next });
        }
        debug!(from = %self.status, to = %next, "node status changed");
        self.status = next;
        self.history.push(StatusChange {
            status: next,
            at: SystemTime::now(),
        });
        Ok(())
    }
}

impl Default for NodeLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
