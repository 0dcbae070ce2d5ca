use async_trait::async_trait;
use tracing::info;

use crate::bindings::{Bindings, CLAIM_TXN_HASH, CLAIMANT_ADDRESS, GIFT_ADDRESS, MODULE_ID};
use crate::cli::{CliInvocation, MoveArg};
use crate::errors::StepFailure;
use crate::step::{ProvisioningStep, StepContext};

use super::function_id;

/// Snatches one share of the gift as the claimant, without a paylink
/// signature or keyless proof.
pub struct ClaimShare;

#[async_trait]
impl ProvisioningStep for ClaimShare {
    fn name(&self) -> &'static str {
        "claim-share"
    }

    fn description(&self) -> &'static str {
        "Snatching a share as the claimant"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[MODULE_ID, GIFT_ADDRESS, CLAIMANT_ADDRESS]
    }

    fn produces(&self) -> &'static [&'static str] {
        &[CLAIM_TXN_HASH]
    }

    async fn run(&self, ctx: &StepContext<'_>, bindings: &Bindings) -> Result<Bindings, StepFailure> {
        let module_id = bindings.require(MODULE_ID)?;
        let gift_address = bindings.require(GIFT_ADDRESS)?;
        let claimant_address = bindings.require(CLAIMANT_ADDRESS)?;
        let claimant = &ctx.config.identities.claimant;

        let invocation = CliInvocation::Run {
            profile: claimant.name.clone(),
            function_id: function_id(module_id, "snatch_packet"),
            type_args: Vec::new(),
            args: vec![
                MoveArg::Address(gift_address.to_string()),
                MoveArg::Bytes(Vec::new()),
                MoveArg::Bytes(Vec::new()),
            ],
        };
        let submission = ctx.submit(&invocation).await?;

        info!(profile = %claimant.name, address = %claimant_address, gift = %gift_address, "Snatched a share");
        Ok(Bindings::new().with(CLAIM_TXN_HASH, submission.transaction_hash))
    }
}
