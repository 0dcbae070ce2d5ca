//! Error types for the provisioning workflow.

use thiserror::Error;

/// Failure of the external chain CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {message}")]
    Failed { command: String, status: String, message: String },

    #[error("`{command}` was rejected: {message}")]
    Rejected { command: String, message: String },

    #[error("`{command}` printed unexpected output: {reason}")]
    Output { command: String, reason: String },
}

impl CliError {
    pub fn failed(command: impl Into<String>, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            command: command.into(),
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn rejected(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Failure talking to the node REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid node API URL {url}")]
    InvalidUrl { url: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Why a single provisioning step failed.
#[derive(Debug, Error)]
pub enum StepFailure {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Binding `{name}` is not available")]
    MissingBinding { name: String },

    #[error("Step finished without producing `{name}`")]
    MissingOutput { name: String },

    #[error("Transaction {hash} has no state change of type {resource_type} ({scanned} records scanned)")]
    NoMatchingChange {
        hash: String,
        resource_type: String,
        scanned: usize,
    },

    #[error("Transaction {hash} failed: {vm_status}")]
    TransactionFailed { hash: String, vm_status: String },
}

/// Fatal provisioning errors.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Provisioning step {index} ({step}) failed: {source}")]
    Step {
        /// 1-based position of the failing step.
        index: usize,
        step: &'static str,
        #[source]
        source: StepFailure,
    },

    #[error("Step `{step}` requires `{binding}`, which no earlier step produces")]
    UnorderedBinding { step: &'static str, binding: &'static str },

    #[error("Step `{step}` produces `{binding}`, which `{earlier}` already produces")]
    DuplicateBinding {
        step: &'static str,
        earlier: &'static str,
        binding: &'static str,
    },

    #[error("Step `{step}` is declared more than once")]
    DuplicateStep { step: &'static str },
}

impl ProvisionError {
    /// Name of the step that failed, if the error came from running one.
    pub fn failed_step(&self) -> Option<&'static str> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_names_the_step_and_cause() {
        let error = ProvisionError::Step {
            index: 4,
            step: "resolve-gift-address",
            source: StepFailure::NoMatchingChange {
                hash: "0xfeed".into(),
                resource_type: "0xabc::hongbao::Gift".into(),
                scanned: 3,
            },
        };
        assert_eq!(error.failed_step(), Some("resolve-gift-address"));
        let message = error.to_string();
        assert!(message.contains("step 4 (resolve-gift-address)"), "{message}");
        assert!(message.contains("0xabc::hongbao::Gift"), "{message}");
    }

    #[test]
    fn cli_failures_convert_into_step_failures() {
        let failure: StepFailure = CliError::rejected("move run", "EGIFT_EXPIRED").into();
        assert!(matches!(failure, StepFailure::Cli(CliError::Rejected { .. })));
        assert_eq!(failure.to_string(), "`move run` was rejected: EGIFT_EXPIRED");
    }
}
