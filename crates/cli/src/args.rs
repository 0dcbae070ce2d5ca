use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};
use url::Url;

use localnet_types::{DEFAULT_API_URL, DEFAULT_NODE_PORT, DEFAULT_READY_URL, parse_url};
use localnet_util::expand_tilde;

/// Run a localnet and, on a fresh start, provision it with the hongbao demo state.
///
/// Run from the root of the repo. You usually want `-f`.
#[derive(Debug, Parser)]
#[command(name = "localnet", version, about)]
pub struct RootArgs {
    /// Enable debug logging.
    #[arg(short, long)]
    pub debug: bool,

    /// Start afresh: wipe localnet state and provision it again.
    #[arg(short, long)]
    pub force_restart: bool,

    /// Work offline, assuming Move dependencies are already present.
    #[arg(long)]
    pub offline: bool,

    #[command(flatten)]
    pub paths: PathArgs,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Path or alias of the chain CLI.
    #[arg(long, default_value = "aptos", value_parser = parse_path)]
    pub aptos_cli_path: PathBuf,

    /// Directory containing the hongbao Move package.
    #[arg(long, default_value = "move", value_parser = parse_path)]
    pub move_dir: PathBuf,

    /// YAML or JSON file with the deployer, claimant and bystander identities.
    #[arg(long, value_parser = parse_path)]
    pub identities: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct NodeArgs {
    /// Readiness endpoint of the localnet.
    #[arg(long, default_value = DEFAULT_READY_URL, value_parser = parse_url)]
    pub ready_url: Url,

    /// Node REST API used to look up transactions.
    #[arg(long, default_value = DEFAULT_API_URL, value_parser = parse_url)]
    pub api_url: Url,

    /// Port freed from a stale localnet before launching.
    #[arg(long, default_value_t = DEFAULT_NODE_PORT)]
    pub node_port: u16,

    /// Milliseconds between readiness probes.
    #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,
}

impl NodeArgs {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_path(value: &str) -> Result<PathBuf, String> {
    Ok(expand_tilde(value))
}
