//! Accounts registered with the localnet during provisioning.
//!
//! An [`Identity`] pairs a CLI profile name with a fixed private key and the
//! address that key derives to. Keys are fixed so the rest of the stack (web
//! frontends, backends, scripts) can rely on deterministic account addresses
//! across fresh restarts.

use std::{collections::HashSet, fs, path::Path};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

static PRIVATE_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("valid private key regex"));
static ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{1,64}$").expect("valid address regex"));

/// An account to be created on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// CLI profile name the account is registered under.
    pub name: String,
    /// Hex encoded ed25519 private key, `0x` prefixed.
    pub private_key: String,
    /// Account address derived from `private_key`.
    pub address: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, private_key: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            private_key: private_key.into(),
            address: address.into(),
        }
    }

    /// The address in the long form the node prints in struct tags.
    pub fn canonical_address(&self) -> String {
        canonical_address(&self.address)
    }

    /// Checks that the profile name, key and address are well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_identity("<unnamed>", "profile name must not be empty"));
        }
        if !PRIVATE_KEY_PATTERN.is_match(&self.private_key) {
            return Err(ConfigError::invalid_identity(
                &self.name,
                "private key must be 0x followed by 64 hex characters",
            ));
        }
        if !ADDRESS_PATTERN.is_match(&self.address) {
            return Err(ConfigError::invalid_identity(
                &self.name,
                "address must be 0x followed by 1 to 64 hex characters",
            ));
        }
        Ok(())
    }
}

/// Lowercase, `0x` prefixed and zero padded to 64 hex digits.
///
/// Expects an address that already passed validation.
pub fn canonical_address(address: &str) -> String {
    let digits = address.strip_prefix("0x").unwrap_or(address);
    format!("0x{:0>64}", digits.to_ascii_lowercase())
}

/// The three accounts used by provisioning, keyed by role.
///
/// The deployer publishes the module and funds the gift. The claimant snatches
/// a share right after the gift is created. The bystander is registered but
/// left untouched so demos have a second snatcher with a full balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySet {
    pub deployer: Identity,
    pub claimant: Identity,
    pub bystander: Identity,
}

impl IdentitySet {
    /// Development identities shared with the frontend and backend configs.
    ///
    /// These keys only ever hold localnet funds.
    pub fn localnet_defaults() -> Self {
        Self {
            deployer: Identity::new(
                "deployer",
                "0xc7e8f661af55fa7e8e52f5b2f5d3daf3f3f49040ea1f05c07c29c47c3ad877c0",
                "0x5322ac25e855378909b517008c4a16137fc9dbd6c6ff8c5e762ab887002442e5",
            ),
            claimant: Identity::new(
                "local",
                "0xece937b5a5f1df41ba6a550e212492ee98573d3799d0035aa20c29674cd0ceff",
                "0x296102a3893d43e11de2aa142fbb126377120d7d71c246a2f95d5b4f3ba16b30",
            ),
            bystander: Identity::new(
                "player2",
                "0xece937b5a5f1df41ba6a550e212492ee98573d3799d0035aa20c29674cd0cefd",
                "0xaf769425b319270f91768e8910ed4cde16c4cea32751062c9ab3f2b21adc27b4",
            ),
        }
    }

    /// Iterates the identities in registration order: deployer first.
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        [&self.deployer, &self.claimant, &self.bystander].into_iter()
    }

    /// Validates every identity and rejects duplicate profile names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for identity in self.iter() {
            identity.validate()?;
            if !seen.insert(identity.name.as_str()) {
                return Err(ConfigError::DuplicateProfile {
                    name: identity.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Parses an identities document. YAML is expected, JSON is accepted as well.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let identities: Self = serde_yaml::from_str(content).map_err(|error| ConfigError::Parse {
            reason: error.to_string(),
        })?;
        identities.validate()?;
        Ok(identities)
    }

    /// Loads and validates an identities file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}

impl Default for IdentitySet {
    fn default() -> Self {
        Self::localnet_defaults()
    }
}
