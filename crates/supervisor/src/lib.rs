//! # Localnet Supervisor
//!
//! Owns the local node process end to end:
//!
//! - **`port`**: reclaims the node port from a stale process (best effort)
//! - **`process`**: launches the node and exposes it through [`NodeProcess`]
//! - **`readiness`**: polls the readiness endpoint until ready or crashed
//! - **`shutdown`**: forwards a single interrupt and waits for a clean exit
//! - **`session`**: composes the above and runs provisioning exactly once
//!
//! ```rust,ignore
//! use localnet_supervisor::Supervisor;
//!
//! let report = Supervisor::new(node_config).run(|| async { Ok(()) }).await?;
//! println!("localnet exited with {}", report.exit);
//! ```

pub mod errors;
pub mod port;
pub mod process;
pub mod readiness;
pub mod session;
pub mod shutdown;
pub mod status;

pub use errors::{ReclaimError, SupervisorError};
pub use port::{find_port_owner, reclaim_port};
pub use process::{ChildNode, LaunchSpec, NodeExit, NodeProcess, launch};
pub use readiness::{HttpReadinessProbe, PollEvent, PollPhase, PollTransition, ProbeOutcome, ReadinessProbe, ReadyOutcome, wait_until_ready};
pub use session::{ProvisioningOutcome, SessionReport, Supervisor, supervise};
pub use shutdown::{InterruptReceiver, listen_for_interrupts, shutdown, wait_for_exit};
pub use status::{NodeLifecycle, NodeStatus, StatusChange};
