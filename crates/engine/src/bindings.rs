//! Named values passed from one provisioning step to the next.

use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::StepFailure;

pub const DEPLOYER_ADDRESS: &str = "deployer_address";
pub const CLAIMANT_ADDRESS: &str = "claimant_address";
pub const BYSTANDER_ADDRESS: &str = "bystander_address";
/// `<deployer>::<module>` the gift module was published under.
pub const MODULE_ID: &str = "module_id";
pub const PUBLISH_TXN_HASH: &str = "publish_txn_hash";
pub const GIFT_TXN_HASH: &str = "gift_txn_hash";
pub const GIFT_ADDRESS: &str = "gift_address";
pub const CLAIM_TXN_HASH: &str = "claim_txn_hash";

/// Insertion-ordered map of binding name to value.
///
/// Bindings only grow; a later step never overwrites what an earlier step produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bindings(IndexMap<String, String>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a binding a step depends on.
    pub fn require(&self, name: &str) -> Result<&str, StepFailure> {
        self.get(name).ok_or_else(|| StepFailure::MissingBinding { name: name.to_string() })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Builder-style [`Bindings::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Merges `other` into `self`, keeping existing values on conflict.
    pub fn extend(&mut self, other: Bindings) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_values_win() {
        let mut bindings = Bindings::new().with(GIFT_ADDRESS, "0x1");
        bindings.extend(Bindings::new().with(GIFT_ADDRESS, "0x2").with(CLAIM_TXN_HASH, "0xbeef"));
        assert_eq!(bindings.get(GIFT_ADDRESS), Some("0x1"));
        assert_eq!(bindings.iter().map(|(name, _)| name).collect::<Vec<_>>(), vec![GIFT_ADDRESS, CLAIM_TXN_HASH]);
    }

    #[test]
    fn require_reports_missing_name() {
        let error = Bindings::new().require(GIFT_TXN_HASH).unwrap_err();
        assert!(matches!(error, StepFailure::MissingBinding { name } if name == GIFT_TXN_HASH));
    }
}
