use async_trait::async_trait;
use tracing::info;

use crate::bindings::{BYSTANDER_ADDRESS, Bindings, CLAIMANT_ADDRESS, DEPLOYER_ADDRESS};
use crate::cli::CliInvocation;
use crate::errors::StepFailure;
use crate::step::{ProvisioningStep, StepContext};

/// Registers every configured identity under its fixed private key, so the
/// resulting addresses are deterministic.
pub struct CreateIdentities;

#[async_trait]
impl ProvisioningStep for CreateIdentities {
    fn name(&self) -> &'static str {
        "create-identities"
    }

    fn description(&self) -> &'static str {
        "Creating accounts"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn produces(&self) -> &'static [&'static str] {
        &[DEPLOYER_ADDRESS, CLAIMANT_ADDRESS, BYSTANDER_ADDRESS]
    }

    async fn run(&self, ctx: &StepContext<'_>, _bindings: &Bindings) -> Result<Bindings, StepFailure> {
        for identity in ctx.config.identities.iter() {
            let invocation = CliInvocation::Init {
                network: ctx.config.network.clone(),
                private_key: identity.private_key.clone(),
                profile: identity.name.clone(),
            };
            ctx.cli.invoke(&invocation).await?;
            info!(profile = %identity.name, address = %identity.canonical_address(), "Created account on localnet");
        }

        // Later steps match struct tags printed by the node, which always use
        // the long lowercase form.
        let identities = &ctx.config.identities;
        Ok(Bindings::new()
            .with(DEPLOYER_ADDRESS, identities.deployer.canonical_address())
            .with(CLAIMANT_ADDRESS, identities.claimant.canonical_address())
            .with(BYSTANDER_ADDRESS, identities.bystander.canonical_address()))
    }
}
