//! The provisioning step abstraction.

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use localnet_types::{ProvisioningConfig, TransactionSubmission};

use crate::bindings::Bindings;
use crate::cli::{ChainCli, CliInvocation};
use crate::errors::StepFailure;
use crate::node_api::NodeApi;

/// Collaborators and configuration shared by every step of a run.
pub struct StepContext<'a> {
    pub config: &'a ProvisioningConfig,
    pub cli: &'a dyn ChainCli,
    pub api: &'a dyn NodeApi,
    clock: fn() -> i64,
}

impl<'a> StepContext<'a> {
    pub fn new(config: &'a ProvisioningConfig, cli: &'a dyn ChainCli, api: &'a dyn NodeApi) -> Self {
        Self {
            config,
            cli,
            api,
            clock: || Utc::now().timestamp(),
        }
    }

    /// Replaces the wall clock used for expiry timestamps.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Current unix time in seconds.
    pub fn now_unix(&self) -> i64 {
        (self.clock)()
    }

    /// Submits a transaction through the CLI and checks that it executed.
    pub async fn submit(&self, invocation: &CliInvocation) -> Result<TransactionSubmission, StepFailure> {
        let submission = self.cli.invoke(invocation).await?.submission()?;
        if submission.success == Some(false) {
            let vm_status = submission.vm_status.clone().unwrap_or_else(|| "unknown VM status".to_string());
            warn!(hash = %submission.transaction_hash, vm_status = %vm_status, "Transaction was committed but failed");
            return Err(StepFailure::TransactionFailed {
                hash: submission.transaction_hash,
                vm_status,
            });
        }
        Ok(submission)
    }
}

/// One unit of provisioning work.
///
/// A step reads the bindings produced by earlier steps and returns the new
/// bindings it produced. It must only read names listed in [`requires`] and
/// must return every name listed in [`produces`].
///
/// [`requires`]: ProvisioningStep::requires
/// [`produces`]: ProvisioningStep::produces
#[async_trait]
pub trait ProvisioningStep: Send + Sync {
    /// Stable identifier used in errors and the run report.
    fn name(&self) -> &'static str;

    /// Progress message shown when the step starts.
    fn description(&self) -> &'static str;

    fn requires(&self) -> &'static [&'static str];

    fn produces(&self) -> &'static [&'static str];

    async fn run(&self, ctx: &StepContext<'_>, bindings: &Bindings) -> Result<Bindings, StepFailure>;
}
