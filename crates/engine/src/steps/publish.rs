use async_trait::async_trait;
use tracing::info;

use crate::bindings::{Bindings, DEPLOYER_ADDRESS, MODULE_ID, PUBLISH_TXN_HASH};
use crate::cli::CliInvocation;
use crate::errors::StepFailure;
use crate::step::{ProvisioningStep, StepContext};

/// Publishes the Move package with its named address bound to the deployer.
pub struct PublishModule;

#[async_trait]
impl ProvisioningStep for PublishModule {
    fn name(&self) -> &'static str {
        "publish-module"
    }

    fn description(&self) -> &'static str {
        "Publishing the hongbao Move module"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[DEPLOYER_ADDRESS]
    }

    fn produces(&self) -> &'static [&'static str] {
        &[MODULE_ID, PUBLISH_TXN_HASH]
    }

    async fn run(&self, ctx: &StepContext<'_>, bindings: &Bindings) -> Result<Bindings, StepFailure> {
        let deployer = bindings.require(DEPLOYER_ADDRESS)?;
        let invocation = CliInvocation::Publish {
            named_addresses: vec![(ctx.config.named_address.clone(), deployer.to_string())],
            profile: ctx.config.identities.deployer.name.clone(),
            skip_fetch_git_deps: ctx.config.offline,
        };
        let submission = ctx.submit(&invocation).await?;

        let module_id = format!("{deployer}::{}", ctx.config.module_name);
        info!(module = %module_id, hash = %submission.transaction_hash, "Published the Move module");
        Ok(Bindings::new()
            .with(MODULE_ID, module_id)
            .with(PUBLISH_TXN_HASH, submission.transaction_hash))
    }
}
