//! Runtime configuration for the supervisor and the provisioning workflow.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::identity::IdentitySet;

/// Default readiness endpoint served by the localnet once every service is up.
pub const DEFAULT_READY_URL: &str = "http://127.0.0.1:8070";
/// Default node REST API.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
/// Port reclaimed before launching so repeated runs don't hit "address in use".
pub const DEFAULT_NODE_PORT: u16 = 8080;
/// Delay between readiness probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Upper bound for a single readiness probe request.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors raised while assembling or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid identity '{name}': {reason}")]
    InvalidIdentity { name: String, reason: String },

    #[error("Duplicate profile name: {name}")]
    DuplicateProfile { name: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse identities: {reason}")]
    Parse { reason: String },

    #[error("Invalid URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl ConfigError {
    pub fn invalid_identity(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Parses a URL, attributing failures to the offending value.
pub fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })
}

/// How the node process is launched and supervised.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Path or alias of the external CLI that also hosts the node.
    pub cli_path: PathBuf,
    /// Wipe previous localnet state and auto-confirm prompts.
    pub force_restart: bool,
    /// Endpoint answering 200 once the node is serving.
    pub ready_url: Url,
    /// Port whose stale owner is reclaimed before launch.
    pub reclaim_port: u16,
    /// Process name matched against the port inspection output.
    pub process_name: String,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
}

impl NodeConfig {
    pub fn new(cli_path: impl Into<PathBuf>, force_restart: bool, ready_url: Url) -> Self {
        Self {
            cli_path: cli_path.into(),
            force_restart,
            ready_url,
            reclaim_port: DEFAULT_NODE_PORT,
            process_name: "aptos".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Fixed parameters of the demo gift created during provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftParameters {
    /// Number of claimable shares ("packets").
    pub share_count: u64,
    /// Amount paid out per share, in octas.
    pub per_share_amount: u64,
    /// Time from creation until the gift expires.
    pub lifetime: Duration,
    /// Coin type the gift is funded with.
    pub coin_type: String,
    /// Restrict claims to holders of a paylink key. Empty means no restriction.
    pub paylink_public_key: Vec<u8>,
    /// Only allow keyless accounts to claim.
    pub keyless_only: bool,
}

impl Default for GiftParameters {
    fn default() -> Self {
        Self {
            share_count: 4,
            per_share_amount: 10_000_000,
            lifetime: Duration::from_secs(30 * 60),
            coin_type: "0x1::aptos_coin::AptosCoin".to_string(),
            paylink_public_key: Vec::new(),
            keyless_only: false,
        }
    }
}

impl GiftParameters {
    /// Unix timestamp (seconds) at which a gift created at `now_unix` expires.
    pub fn expiry_from(&self, now_unix: i64) -> u64 {
        let expiry = now_unix.saturating_add(i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX));
        u64::try_from(expiry).unwrap_or(0)
    }
}

/// Inputs to the provisioning workflow.
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    pub identities: IdentitySet,
    /// Directory holding the Move package; CLI commands run from here.
    pub package_dir: PathBuf,
    /// Module providing the gift and claim entry functions.
    pub module_name: String,
    /// Named address in `Move.toml` bound to the deployer on publish.
    pub named_address: String,
    /// Network selector passed to identity registration.
    pub network: String,
    /// Node REST API used to look up submitted transactions.
    pub api_url: Url,
    /// Skip fetching the latest git dependencies on publish.
    pub offline: bool,
    pub gift: GiftParameters,
}

impl ProvisioningConfig {
    pub fn new(identities: IdentitySet, package_dir: impl AsRef<Path>, api_url: Url) -> Self {
        Self {
            identities,
            package_dir: package_dir.as_ref().to_path_buf(),
            module_name: "hongbao".to_string(),
            named_address: "addr".to_string(),
            network: "local".to_string(),
            api_url,
            offline: false,
            gift: GiftParameters::default(),
        }
    }
}
