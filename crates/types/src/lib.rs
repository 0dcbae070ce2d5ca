//! Shared type definitions for the localnet bootstrapper.
//!
//! The supervisor and the provisioning engine both consume the configuration
//! structs defined here, and the engine decodes the external CLI and node REST
//! responses into the wire models from [`transaction`].

pub mod config;
pub mod identity;
pub mod transaction;

pub use config::{
    ConfigError, DEFAULT_API_URL, DEFAULT_NODE_PORT, DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_TIMEOUT, DEFAULT_READY_URL, GiftParameters,
    NodeConfig, ProvisioningConfig, parse_url,
};
pub use identity::{Identity, IdentitySet, canonical_address};
pub use transaction::{CliResponse, StateChange, StateChangeData, TransactionResult, TransactionSubmission};
