//! Invocations of the external chain CLI.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use localnet_types::{CliResponse, TransactionSubmission};
use localnet_util::redact_sensitive;

use crate::errors::CliError;

/// Typed positional argument of an entry function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveArg {
    U64(u64),
    Bool(bool),
    Address(String),
    /// A `vector<u8>`; empty encodes `option::none` for optional keys and proofs.
    Bytes(Vec<u8>),
}

impl fmt::Display for MoveArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveArg::U64(value) => write!(f, "u64:{value}"),
            MoveArg::Bool(value) => write!(f, "bool:{value}"),
            MoveArg::Address(address) => write!(f, "address:{address}"),
            MoveArg::Bytes(bytes) => {
                let items: Vec<String> = bytes.iter().map(u8::to_string).collect();
                write!(f, "u8:[{}]", items.join(","))
            }
        }
    }
}

/// One operation against the chain CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliInvocation {
    /// Registers an account profile with a fixed private key.
    Init {
        network: String,
        private_key: String,
        profile: String,
    },
    /// Publishes the Move package in the working directory.
    Publish {
        named_addresses: Vec<(String, String)>,
        profile: String,
        skip_fetch_git_deps: bool,
    },
    /// Calls an entry function.
    Run {
        profile: String,
        function_id: String,
        type_args: Vec<String>,
        args: Vec<MoveArg>,
    },
}

impl CliInvocation {
    /// Short label used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            CliInvocation::Init { .. } => "init",
            CliInvocation::Publish { .. } => "move publish",
            CliInvocation::Run { .. } => "move run",
        }
    }

    pub fn profile(&self) -> &str {
        match self {
            CliInvocation::Init { profile, .. } | CliInvocation::Publish { profile, .. } | CliInvocation::Run { profile, .. } => profile,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        match self {
            CliInvocation::Init {
                network,
                private_key,
                profile,
            } => vec![
                "init".into(),
                "--network".into(),
                network.clone(),
                "--private-key".into(),
                private_key.clone(),
                "--assume-yes".into(),
                "--profile".into(),
                profile.clone(),
            ],
            CliInvocation::Publish {
                named_addresses,
                profile,
                skip_fetch_git_deps,
            } => {
                let named: Vec<String> = named_addresses.iter().map(|(name, address)| format!("{name}={address}")).collect();
                let mut args = vec![
                    "move".into(),
                    "publish".into(),
                    "--named-addresses".into(),
                    named.join(","),
                    "--assume-yes".into(),
                    "--profile".into(),
                    profile.clone(),
                ];
                if *skip_fetch_git_deps {
                    args.push("--skip-fetch-latest-git-deps".into());
                }
                args
            }
            CliInvocation::Run {
                profile,
                function_id,
                type_args,
                args,
            } => {
                let mut rendered = vec![
                    "move".into(),
                    "run".into(),
                    "--assume-yes".into(),
                    "--profile".into(),
                    profile.clone(),
                    "--function-id".into(),
                    function_id.clone(),
                ];
                if !type_args.is_empty() {
                    rendered.push("--type-args".into());
                    rendered.extend(type_args.iter().cloned());
                }
                if !args.is_empty() {
                    rendered.push("--args".into());
                    rendered.extend(args.iter().map(MoveArg::to_string));
                }
                rendered
            }
        }
    }
}

/// Captured output of a successful CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    pub command: String,
    pub stdout: String,
}

impl CliOutput {
    pub fn new(command: impl Into<String>, stdout: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            stdout: stdout.into(),
        }
    }

    /// Reads the `{"Result": {"transaction_hash": ..}}` envelope.
    pub fn submission(&self) -> Result<TransactionSubmission, CliError> {
        let response = CliResponse::parse(&self.stdout).map_err(|error| CliError::Output {
            command: self.command.clone(),
            reason: error.to_string(),
        })?;
        match response {
            CliResponse::Error(message) => Err(CliError::rejected(self.command.clone(), message)),
            response => response.into_submission().map_err(|reason| CliError::Output {
                command: self.command.clone(),
                reason,
            }),
        }
    }
}

/// Account, package and transaction operations against the network.
#[async_trait]
pub trait ChainCli: Send + Sync {
    async fn invoke(&self, invocation: &CliInvocation) -> Result<CliOutput, CliError>;
}

/// Runs the real CLI binary as a subprocess.
#[derive(Debug, Clone)]
pub struct AptosCli {
    program: PathBuf,
    working_dir: PathBuf,
}

impl AptosCli {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    fn render(&self, args: &[String]) -> String {
        redact_sensitive(&format!("{} {}", self.program.display(), args.join(" ")))
    }
}

#[async_trait]
impl ChainCli for AptosCli {
    async fn invoke(&self, invocation: &CliInvocation) -> Result<CliOutput, CliError> {
        let args = invocation.to_args();
        let label = invocation.label();
        debug!(command = %self.render(&args), cwd = %self.working_dir.display(), "Running chain CLI");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| CliError::Spawn {
                command: label.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(command = label, stdout = %redact_sensitive(stdout.trim()), "Chain CLI finished");

        if !output.status.success() {
            let message = match CliResponse::parse(&stdout) {
                Ok(CliResponse::Error(message)) => message,
                _ => String::from_utf8_lossy(&output.stderr).trim().to_string(),
            };
            return Err(CliError::failed(label, output.status.to_string(), redact_sensitive(&message)));
        }

        Ok(CliOutput::new(label, stdout))
    }
}
