//! End-to-end supervision of one localnet run.
//!
//! A session launches the node, waits for it to become ready, runs the
//! provisioning hook exactly once, then blocks until the node exits or the
//! operator interrupts it.

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

use localnet_types::NodeConfig;

use crate::errors::SupervisorError;
use crate::port::reclaim_port;
use crate::process::{LaunchSpec, NodeExit, NodeProcess, launch};
use crate::readiness::{HttpReadinessProbe, ReadinessProbe, ReadyOutcome, wait_until_ready};
use crate::shutdown::{InterruptReceiver, listen_for_interrupts, shutdown, wait_for_exit};
use crate::status::{NodeLifecycle, NodeStatus};

/// What happened to the provisioning hook during a session.
#[derive(Debug)]
pub enum ProvisioningOutcome {
    /// The node never became ready, or was interrupted before provisioning.
    NotRun,
    Succeeded,
    /// Interrupted while provisioning was in flight.
    Cancelled,
    Failed(anyhow::Error),
}

impl ProvisioningOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Summary of a finished session.
#[derive(Debug)]
pub struct SessionReport {
    pub exit: NodeExit,
    /// The node was shut down because of an operator interrupt.
    pub interrupted: bool,
    pub provisioning: ProvisioningOutcome,
    pub lifecycle: NodeLifecycle,
}

impl SessionReport {
    /// Converts the report into the binary's exit result.
    ///
    /// A failed provisioning run is surfaced even though the node itself was
    /// left running until it exited.
    pub fn into_result(self) -> anyhow::Result<NodeExit> {
        match self.provisioning {
            ProvisioningOutcome::Failed(error) => Err(error),
            _ => Ok(self.exit),
        }
    }
}

/// Owns the node process for one run.
#[derive(Debug, Clone)]
pub struct Supervisor {
    config: NodeConfig,
}

impl Supervisor {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec::localnet(&self.config.cli_path, self.config.force_restart)
    }

    /// Reclaims the node port, launches the node and supervises it.
    ///
    /// `provision` is awaited once, only after the node reports ready.
    pub async fn run<F, Fut>(&self, provision: F) -> Result<SessionReport, SupervisorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        if let Err(error) = reclaim_port(self.config.reclaim_port, &self.config.process_name).await {
            warn!(port = self.config.reclaim_port, error = %error, "Could not reclaim node port, continuing");
        }

        let interrupts = listen_for_interrupts();
        let probe = HttpReadinessProbe::new(self.config.ready_url.clone(), self.config.probe_timeout)?;
        let process = launch(&self.launch_spec())?;

        supervise(process, &probe, self.config.poll_interval, interrupts, provision).await
    }
}

enum Startup {
    Finished(ReadyOutcome),
    Interrupted,
}

enum Provisioning {
    Finished(anyhow::Result<()>),
    Interrupted,
}

/// Drives an already launched node through readiness, provisioning and exit.
///
/// An interrupt at any point forwards exactly one shutdown request to the
/// node and waits for it to exit.
pub async fn supervise<P, R, F, Fut>(
    mut process: P,
    probe: &R,
    poll_interval: Duration,
    mut interrupts: InterruptReceiver,
    provision: F,
) -> Result<SessionReport, SupervisorError>
where
    P: NodeProcess,
    R: ReadinessProbe + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let mut lifecycle = NodeLifecycle::new();
    lifecycle.transition(NodeStatus::Starting)?;
    info!("Waiting for localnet to start up...");

    let startup = tokio::select! {
        outcome = wait_until_ready(&mut process, probe, poll_interval) => Startup::Finished(outcome?),
        Some(()) = interrupts.recv() => Startup::Interrupted,
    };

    match startup {
        Startup::Finished(ReadyOutcome::Ready) => {
            lifecycle.transition(NodeStatus::Ready)?;
            info!("Localnet came up!");
        }
        Startup::Finished(ReadyOutcome::Crashed(exit)) => {
            lifecycle.transition(NodeStatus::Crashed)?;
            error!(%exit, "Localnet crashed on startup, exiting...");
            return Err(SupervisorError::Crashed { exit });
        }
        Startup::Interrupted => {
            let exit = shutdown(&mut process, &mut interrupts, &mut lifecycle).await?;
            return Ok(SessionReport {
                exit,
                interrupted: true,
                provisioning: ProvisioningOutcome::NotRun,
                lifecycle,
            });
        }
    }

    let provisioning = tokio::select! {
        result = provision() => Provisioning::Finished(result),
        Some(()) = interrupts.recv() => Provisioning::Interrupted,
    };

    let provisioning = match provisioning {
        Provisioning::Finished(Ok(())) => ProvisioningOutcome::Succeeded,
        Provisioning::Finished(Err(failure)) => {
            error!(error = %format!("{failure:#}"), "Provisioning failed; leaving localnet running for inspection");
            ProvisioningOutcome::Failed(failure)
        }
        Provisioning::Interrupted => {
            warn!("Provisioning interrupted");
            let exit = shutdown(&mut process, &mut interrupts, &mut lifecycle).await?;
            return Ok(SessionReport {
                exit,
                interrupted: true,
                provisioning: ProvisioningOutcome::Cancelled,
                lifecycle,
            });
        }
    };

    lifecycle.transition(NodeStatus::Running)?;
    if !provisioning.is_failed() {
        info!("Setup complete, localnet is ready and running");
    }

    let (exit, interrupted) = wait_for_exit(&mut process, &mut interrupts, &mut lifecycle).await?;
    info!("Done, goodbye!");
    Ok(SessionReport {
        exit,
        interrupted,
        provisioning,
        lifecycle,
    })
}
