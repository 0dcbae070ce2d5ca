//! Launching and observing the node process.

use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::info;

use crate::errors::SupervisorError;

/// How a node process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeExit {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
}

impl NodeExit {
    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            success: code == 0,
        }
    }

    pub fn signalled() -> Self {
        Self { code: None, success: false }
    }
}

impl From<ExitStatus> for NodeExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}

impl fmt::Display for NodeExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Handle to a launched node process.
///
/// The supervisor owns the handle exclusively from launch until exit.
#[async_trait]
pub trait NodeProcess: Send {
    /// OS process id, if the process has not been reaped yet.
    fn id(&self) -> Option<u32>;

    /// Non-blocking liveness check. `Some` once the process has exited.
    fn try_exit(&mut self) -> Result<Option<NodeExit>, SupervisorError>;

    /// Waits for the process to exit. Must be cancel safe.
    async fn wait(&mut self) -> Result<NodeExit, SupervisorError>;

    /// Asks the process to shut down gracefully.
    fn interrupt(&mut self) -> Result<(), SupervisorError>;
}

/// Program and arguments used to start the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// Runs a local network with the indexer API enabled. A fresh restart
    /// wipes previous state and auto-confirms the CLI's prompts.
    pub fn localnet(program: impl Into<PathBuf>, force_restart: bool) -> Self {
        let mut args: Vec<String> = ["node", "run-localnet", "--with-indexer-api"].iter().map(|arg| arg.to_string()).collect();
        if force_restart {
            args.extend(["--force-restart".to_string(), "--assume-yes".to_string()]);
        }
        Self {
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A node running as a child of this process.
#[derive(Debug)]
pub struct ChildNode {
    child: Child,
}

impl ChildNode {
    pub fn new(child: Child) -> Self {
        Self { child }
    }
}

/// Spawns the node described by `spec`.
///
/// On unix the child gets its own process group, so a terminal interrupt is
/// delivered to the supervisor only and forwarded exactly once. Stdin is
/// detached because a background process group can't read the terminal.
pub fn launch(spec: &LaunchSpec) -> Result<ChildNode, SupervisorError> {
    let mut command = Command::new(&spec.program);
    command.args(&spec.args).stdin(Stdio::null()).kill_on_drop(false);
    #[cfg(unix)]
    command.process_group(0);

    let child = command.spawn().map_err(|source| SupervisorError::Launch {
        program: spec.program.clone(),
        source,
    })?;
    info!(pid = child.id().unwrap_or_default(), command = %spec, "Launched localnet");
    Ok(ChildNode::new(child))
}

#[async_trait]
impl NodeProcess for ChildNode {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_exit(&mut self) -> Result<Option<NodeExit>, SupervisorError> {
        self.child
            .try_wait()
            .map(|status| status.map(NodeExit::from))
            .map_err(|source| SupervisorError::Wait { source })
    }

    async fn wait(&mut self) -> Result<NodeExit, SupervisorError> {
        self.child
            .wait()
            .await
            .map(NodeExit::from)
            .map_err(|source| SupervisorError::Wait { source })
    }

    fn interrupt(&mut self) -> Result<(), SupervisorError> {
        let Some(pid) = self.child.id() else {
            // Already reaped; nothing left to signal.
            return Ok(());
        };
        send_interrupt(pid)
    }
}

#[cfg(unix)]
fn send_interrupt(pid: u32) -> Result<(), SupervisorError> {
    let raw_pid = libc::pid_t::try_from(pid).map_err(|_| SupervisorError::Interrupt {
        pid,
        reason: "pid out of range".to_string(),
    })?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(raw_pid, libc::SIGINT) };
    if rc == 0 {
        Ok(())
    } else {
        Err(SupervisorError::Interrupt {
            pid,
            reason: std::io::Error::last_os_error().to_string(),
        })
    }
}

#[cfg(not(unix))]
fn send_interrupt(pid: u32) -> Result<(), SupervisorError> {
    Err(SupervisorError::Interrupt {
        pid,
        reason: "signals are not supported on this platform".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_launch_omits_restart_flags() {
        let spec = LaunchSpec::localnet("aptos", false);
        assert_eq!(spec.args, vec!["node", "run-localnet", "--with-indexer-api"]);
    }

    #[test]
    fn fresh_launch_forces_restart_and_confirms() {
        let spec = LaunchSpec::localnet("/opt/aptos", true);
        assert_eq!(spec.to_string(), "/opt/aptos node run-localnet --with-indexer-api --force-restart --assume-yes");
    }

    #[test]
    fn exit_display_distinguishes_signals() {
        assert_eq!(NodeExit::with_code(0).to_string(), "exit code 0");
        assert!(NodeExit::with_code(0).success);
        assert_eq!(NodeExit::signalled().to_string(), "terminated by signal");
    }

    #[tokio::test]
    async fn launch_reports_missing_binary() {
        let spec = LaunchSpec::localnet("/definitely/not/a/real/aptos", false);
        let error = launch(&spec).unwrap_err();
        assert!(error.is_startup_failure());
        assert!(matches!(error, SupervisorError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_node_reports_exit() {
        let spec = LaunchSpec {
            program: "sh".into(),
            args: vec!["-c".into(), "exit 3".into()],
        };
        let mut node = launch(&spec).unwrap();
        let exit = node.wait().await.unwrap();
        assert_eq!(exit, NodeExit::with_code(3));
        assert_eq!(node.try_exit().unwrap(), Some(NodeExit::with_code(3)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn interrupt_stops_child() {
        let spec = LaunchSpec {
            program: "sleep".into(),
            args: vec!["30".into()],
        };
        let mut node = launch(&spec).unwrap();
        node.interrupt().unwrap();
        let exit = node.wait().await.unwrap();
        assert!(!exit.success);
    }
}
