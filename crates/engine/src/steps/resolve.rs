use async_trait::async_trait;
use tracing::{debug, info};

use crate::bindings::{Bindings, GIFT_ADDRESS, GIFT_TXN_HASH, MODULE_ID};
use crate::errors::StepFailure;
use crate::step::{ProvisioningStep, StepContext};

/// Looks up the gift creation transaction and extracts the new gift's address
/// from its state changes.
pub struct ResolveGiftAddress;

#[async_trait]
impl ProvisioningStep for ResolveGiftAddress {
    fn name(&self) -> &'static str {
        "resolve-gift-address"
    }

    fn description(&self) -> &'static str {
        "Resolving the gift address"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[MODULE_ID, GIFT_TXN_HASH]
    }

    fn produces(&self) -> &'static [&'static str] {
        &[GIFT_ADDRESS]
    }

    async fn run(&self, ctx: &StepContext<'_>, bindings: &Bindings) -> Result<Bindings, StepFailure> {
        let module_id = bindings.require(MODULE_ID)?;
        let hash = bindings.require(GIFT_TXN_HASH)?;
        let gift_type = format!("{module_id}::Gift");

        let transaction = ctx.api.transaction_by_hash(hash).await?;
        if transaction.success == Some(false) {
            return Err(StepFailure::TransactionFailed {
                hash: hash.to_string(),
                vm_status: transaction.vm_status.unwrap_or_else(|| "unknown VM status".to_string()),
            });
        }

        for change in &transaction.changes {
            debug!(
                kind = change.kind.as_deref().unwrap_or("-"),
                address = change.address.as_deref().unwrap_or("-"),
                resource_type = change.resource_type().unwrap_or("-"),
                "Inspecting state change"
            );
        }

        let address = transaction
            .first_change_address(&gift_type)
            .ok_or_else(|| StepFailure::NoMatchingChange {
                hash: hash.to_string(),
                resource_type: gift_type.clone(),
                scanned: transaction.changes.len(),
            })?;

        info!(gift = %address, "Created gift");
        Ok(Bindings::new().with(GIFT_ADDRESS, address))
    }
}
