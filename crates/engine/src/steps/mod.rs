//! The standard hongbao provisioning steps, in execution order.

mod claim;
mod gift;
mod identities;
mod publish;
mod resolve;

pub use claim::ClaimShare;
pub use gift::CreateGift;
pub use identities::CreateIdentities;
pub use publish::PublishModule;
pub use resolve::ResolveGiftAddress;

use crate::step::ProvisioningStep;

/// Register identities, publish the module, create a gift, find it, claim a share.
pub fn standard_steps() -> Vec<Box<dyn ProvisioningStep>> {
    let steps: [Box<dyn ProvisioningStep>; 5] = [
        Box::new(CreateIdentities),
        Box::new(PublishModule),
        Box::new(CreateGift),
        Box::new(ResolveGiftAddress),
        Box::new(ClaimShare),
    ];
    steps.into()
}

/// Entry function id `<module_id>::<function>`.
fn function_id(module_id: &str, function: &str) -> String {
    format!("{module_id}::{function}")
}
