use async_trait::async_trait;
use tracing::info;

use crate::bindings::{Bindings, GIFT_TXN_HASH, MODULE_ID};
use crate::cli::{CliInvocation, MoveArg};
use crate::errors::StepFailure;
use crate::step::{ProvisioningStep, StepContext};

use super::function_id;

/// Creates a coin gift as the deployer.
///
/// Arguments, in entry function order: share count, expiry (unix seconds),
/// amount per share, paylink public key (empty for none), keyless only.
pub struct CreateGift;

#[async_trait]
impl ProvisioningStep for CreateGift {
    fn name(&self) -> &'static str {
        "create-gift"
    }

    fn description(&self) -> &'static str {
        "Creating a gift as the deployer"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[MODULE_ID]
    }

    fn produces(&self) -> &'static [&'static str] {
        &[GIFT_TXN_HASH]
    }

    async fn run(&self, ctx: &StepContext<'_>, bindings: &Bindings) -> Result<Bindings, StepFailure> {
        let module_id = bindings.require(MODULE_ID)?;
        let gift = &ctx.config.gift;
        let expiry = gift.expiry_from(ctx.now_unix());

        let invocation = CliInvocation::Run {
            profile: ctx.config.identities.deployer.name.clone(),
            function_id: function_id(module_id, "create_gift_coin"),
            type_args: vec![gift.coin_type.clone()],
            args: vec![
                MoveArg::U64(gift.share_count),
                MoveArg::U64(expiry),
                MoveArg::U64(gift.per_share_amount),
                MoveArg::Bytes(gift.paylink_public_key.clone()),
                MoveArg::Bool(gift.keyless_only),
            ],
        };
        let submission = ctx.submit(&invocation).await?;

        info!(
            hash = %submission.transaction_hash,
            shares = gift.share_count,
            per_share = gift.per_share_amount,
            expiry,
            "Submitted gift creation"
        );
        Ok(Bindings::new().with(GIFT_TXN_HASH, submission.transaction_hash))
    }
}
