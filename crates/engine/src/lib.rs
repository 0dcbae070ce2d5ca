//! # Localnet Engine
//!
//! Provisions a freshly started localnet into the hongbao demo state: three
//! registered accounts, the published module, one gift and one claimed share.
//!
//! The run is an ordered list of [`ProvisioningStep`]s threading a growing
//! [`Bindings`] map. External effects go through two seams, [`ChainCli`] for
//! submissions and [`NodeApi`] for reading committed transactions, so the
//! whole workflow can be driven against a simulated network in tests.
//!
//! ```rust,ignore
//! use localnet_engine::{AptosCli, NodeApiClient, StepContext, Workflow};
//!
//! let cli = AptosCli::new("aptos", &config.package_dir);
//! let api = NodeApiClient::new(config.api_url.clone(), Duration::from_secs(10))?;
//! let report = Workflow::standard()?.run(&StepContext::new(&config, &cli, &api)).await?;
//! println!("gift at {:?}", report.gift_address());
//! ```

pub mod bindings;
pub mod cli;
pub mod errors;
pub mod node_api;
pub mod step;
pub mod steps;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use bindings::Bindings;
pub use cli::{AptosCli, ChainCli, CliInvocation, CliOutput, MoveArg};
pub use errors::{ApiError, CliError, ProvisionError, StepFailure};
pub use node_api::{NodeApi, NodeApiClient};
pub use step::{ProvisioningStep, StepContext};
pub use steps::standard_steps;
pub use workflow::{ProvisioningReport, StepRecord, Workflow};
