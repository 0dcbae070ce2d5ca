//! Wire models for submitted transactions.
//!
//! Two sources feed these types: the JSON the external CLI prints after
//! submitting a transaction, and the node's
//! `GET /v1/transactions/by_hash/{hash}` response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level JSON envelope printed by the external CLI.
///
/// Successful commands print `{"Result": ...}`; failures print `{"Error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CliResponse {
    Result(Value),
    Error(String),
}

impl CliResponse {
    pub fn parse(stdout: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(stdout.trim())
    }

    /// Interprets the `Result` payload as a transaction submission summary.
    ///
    /// Returns `Err` with a human readable reason when the CLI reported an
    /// error or the payload carries no `transaction_hash`.
    pub fn into_submission(self) -> Result<TransactionSubmission, String> {
        match self {
            Self::Error(message) => Err(message),
            Self::Result(payload) => serde_json::from_value(payload).map_err(|error| format!("unexpected result payload: {error}")),
        }
    }
}

/// Summary of a transaction the CLI submitted and waited on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSubmission {
    pub transaction_hash: String,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub vm_status: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub gas_used: Option<u64>,
}

/// Committed transaction as returned by the node REST API.
///
/// Only the fields provisioning inspects are modelled; everything else in the
/// response is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub hash: String,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub vm_status: Option<String>,
    #[serde(default)]
    pub changes: Vec<StateChange>,
}

impl TransactionResult {
    /// Address of the first state change whose resource type equals `resource_type`.
    ///
    /// Records without a type or an address are skipped. When several records
    /// match, the earliest one in the response wins.
    pub fn first_change_address(&self, resource_type: &str) -> Option<&str> {
        self.changes
            .iter()
            .find(|change| change.resource_type() == Some(resource_type) && change.address.is_some())
            .and_then(|change| change.address.as_deref())
    }
}

/// One write-set entry of a committed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    /// Change kind, e.g. `write_resource` or `delete_resource`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub data: Option<StateChangeData>,
}

impl StateChange {
    pub fn resource_type(&self) -> Option<&str> {
        self.data.as_ref().and_then(|data| data.resource_type.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChangeData {
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GIFT: &str = "0xabc::hongbao::Gift";

    fn change(resource_type: Option<&str>, address: Option<&str>) -> Value {
        let mut value = json!({ "type": "write_resource" });
        if let Some(address) = address {
            value["address"] = json!(address);
        }
        if let Some(resource_type) = resource_type {
            value["data"] = json!({ "type": resource_type, "data": {} });
        }
        value
    }

    fn result_with(changes: Vec<Value>) -> TransactionResult {
        serde_json::from_value(json!({ "hash": "0x1", "success": true, "changes": changes })).unwrap()
    }

    #[test]
    fn first_matching_change_wins() {
        let result = result_with(vec![
            change(Some("0x1::account::Account"), Some("0xaaa")),
            change(Some(GIFT), Some("0xfirst")),
            change(Some(GIFT), Some("0xsecond")),
        ]);
        assert_eq!(result.first_change_address(GIFT), Some("0xfirst"));
    }

    #[test]
    fn no_matching_change_yields_none() {
        let result = result_with(vec![
            change(Some("0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>"), Some("0xaaa")),
            change(None, Some("0xbbb")),
        ]);
        assert_eq!(result.first_change_address(GIFT), None);
    }

    #[test]
    fn skips_matching_change_without_address() {
        let result = result_with(vec![change(Some(GIFT), None), change(Some(GIFT), Some("0xc"))]);
        assert_eq!(result.first_change_address(GIFT), Some("0xc"));
    }

    #[test]
    fn type_match_is_exact() {
        let result = result_with(vec![change(Some("0xabc::hongbao::GiftConfig"), Some("0xd"))]);
        assert_eq!(result.first_change_address(GIFT), None);
    }

    #[test]
    fn parses_cli_success_envelope() {
        let stdout = r#"{
  "Result": {
    "transaction_hash": "0xfeed",
    "gas_used": 1234,
    "success": true,
    "version": 77,
    "vm_status": "Executed successfully"
  }
}"#;
        let submission = CliResponse::parse(stdout).unwrap().into_submission().unwrap();
        assert_eq!(submission.transaction_hash, "0xfeed");
        assert_eq!(submission.success, Some(true));
        assert_eq!(submission.version, Some(77));
    }

    #[test]
    fn cli_error_envelope_surfaces_message() {
        let response = CliResponse::parse(r#"{"Error": "Account already exists"}"#).unwrap();
        assert_eq!(response.into_submission().unwrap_err(), "Account already exists");
    }
}
