//! Scripted collaborators for step unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use localnet_types::{IdentitySet, ProvisioningConfig, TransactionResult};

use crate::cli::{ChainCli, CliInvocation, CliOutput};
use crate::errors::{ApiError, CliError};
use crate::node_api::NodeApi;
use crate::step::StepContext;

pub fn submitted(hash: &str) -> String {
    format!(r#"{{"Result": {{"transaction_hash": "{hash}", "success": true, "vm_status": "Executed successfully"}}}}"#)
}

/// Replays queued stdout/errors and records every invocation.
pub struct ScriptedCli {
    responses: Mutex<VecDeque<Result<String, CliError>>>,
    invocations: Mutex<Vec<CliInvocation>>,
}

impl ScriptedCli {
    pub fn new(responses: Vec<Result<String, CliError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn always_ok() -> Self {
        Self::new(Vec::new())
    }

    pub fn invocations(&self) -> Vec<CliInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainCli for ScriptedCli {
    async fn invoke(&self, invocation: &CliInvocation) -> Result<CliOutput, CliError> {
        self.invocations.lock().unwrap().push(invocation.clone());
        let next = self.responses.lock().unwrap().pop_front();
        let stdout = next.unwrap_or_else(|| Ok(submitted("0xstub")))?;
        Ok(CliOutput::new(invocation.label(), stdout))
    }
}

/// Answers every lookup with the same transaction.
pub struct FixedApi {
    transaction: TransactionResult,
    lookups: Mutex<Vec<String>>,
}

impl FixedApi {
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeApi for FixedApi {
    async fn transaction_by_hash(&self, hash: &str) -> Result<TransactionResult, ApiError> {
        self.lookups.lock().unwrap().push(hash.to_string());
        Ok(self.transaction.clone())
    }
}

pub struct Harness {
    pub config: ProvisioningConfig,
    pub cli: ScriptedCli,
    pub api: FixedApi,
}

impl Harness {
    pub fn new(cli: ScriptedCli) -> Self {
        let empty = TransactionResult {
            hash: "0x0".into(),
            success: Some(true),
            vm_status: None,
            changes: Vec::new(),
        };
        Self::with_api(cli, empty)
    }

    pub fn with_api(cli: ScriptedCli, transaction: TransactionResult) -> Self {
        let config = ProvisioningConfig::new(
            IdentitySet::localnet_defaults(),
            "move",
            Url::parse("http://127.0.0.1:8080").unwrap(),
        );
        Self {
            config,
            cli,
            api: FixedApi {
                transaction,
                lookups: Mutex::new(Vec::new()),
            },
        }
    }

    pub fn context(&self) -> StepContext<'_> {
        StepContext::new(&self.config, &self.cli, &self.api)
    }
}
