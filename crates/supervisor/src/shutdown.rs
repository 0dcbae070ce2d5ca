//! Interrupt handling while the node runs.

use tokio::signal;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::{debug, info, warn};

use crate::errors::SupervisorError;
use crate::process::{NodeExit, NodeProcess};
use crate::status::{NodeLifecycle, NodeStatus};

/// Stream of interrupt notifications, one message per ctrl-c.
pub type InterruptReceiver = UnboundedReceiver<()>;

/// Installs a ctrl-c handler and forwards every interrupt into a channel.
///
/// Must be called from within a Tokio runtime. Once installed, the default
/// "terminate on SIGINT" behaviour no longer applies to this process.
pub fn listen_for_interrupts() -> InterruptReceiver {
    let (sender, receiver) = unbounded_channel();
    tokio::spawn(async move {
        loop {
            if let Err(error) = signal::ctrl_c().await {
                warn!(error = %error, "Failed to listen for ctrl-c");
                break;
            }
            if sender.send(()).is_err() {
                break;
            }
        }
    });
    receiver
}

/// Blocks until the node exits on its own or an interrupt arrives.
///
/// The lifecycle must be in `Running`.
pub async fn wait_for_exit<P>(
    process: &mut P,
    interrupts: &mut InterruptReceiver,
    lifecycle: &mut NodeLifecycle,
) -> Result<(NodeExit, bool), SupervisorError>
where
    P: NodeProcess + ?Sized,
{
    tokio::select! {
        exit = process.wait() => {
            let exit = exit?;
            lifecycle.transition(NodeStatus::ExitedNormally)?;
            info!(%exit, "Localnet exited");
            return Ok((exit, false));
        }
        Some(()) = interrupts.recv() => {}
    }
    let exit = shutdown(process, interrupts, lifecycle).await?;
    Ok((exit, true))
}

/// Forwards a single interrupt to the node and waits for it to exit.
///
/// Further interrupts received while waiting are logged and dropped; the node
/// already handles its own shutdown. The process is never force-killed here.
pub async fn shutdown<P>(process: &mut P, interrupts: &mut InterruptReceiver, lifecycle: &mut NodeLifecycle) -> Result<NodeExit, SupervisorError>
where
    P: NodeProcess + ?Sized,
{
    info!("Received ctrl-c, shutting down localnet");
    lifecycle.transition(NodeStatus::Interrupted)?;
    if let Err(error) = process.interrupt() {
        warn!(error = %error, "Failed to forward interrupt, waiting for localnet to exit on its own");
    }
    lifecycle.transition(NodeStatus::ShuttingDown)?;

    let exit = loop {
        tokio::select! {
            exit = process.wait() => break exit?,
            Some(()) = interrupts.recv() => {
                debug!("Interrupt already forwarded, still waiting for localnet to exit");
            }
        }
    };

    lifecycle.transition(NodeStatus::Exited)?;
    info!(%exit, "Localnet shut down");
    Ok(exit)
}
