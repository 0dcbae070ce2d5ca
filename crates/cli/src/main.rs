mod args;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use localnet_engine::{AptosCli, NodeApiClient, StepContext, Workflow};
use localnet_supervisor::Supervisor;
use localnet_types::{IdentitySet, NodeConfig, ProvisioningConfig};
use localnet_util::default_identities_path;

use crate::args::RootArgs;

const API_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.debug);

    let identities = load_identities(args.paths.identities.as_deref())?;
    let supervisor = Supervisor::new(node_config(&args));
    let provisioning = provisioning_config(&args, identities);
    let cli_path = args.paths.aptos_cli_path.clone();
    let fresh = args.force_restart;

    let report = supervisor
        .run(move || provision(provisioning, cli_path, fresh))
        .await
        .context("Localnet failed")?;

    let exit = report.into_result().context("Provisioning failed")?;
    debug!(%exit, "Localnet process finished");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Identities from `--identities`, else the default identities file if
/// present, else the built-in development accounts.
fn load_identities(explicit: Option<&Path>) -> Result<IdentitySet> {
    if let Some(path) = explicit {
        return IdentitySet::from_path(path).with_context(|| format!("Failed to load identities from {}", path.display()));
    }

    let path = default_identities_path();
    if path.is_file() {
        info!(path = %path.display(), "Loading identities");
        return IdentitySet::from_path(&path).with_context(|| format!("Failed to load identities from {}", path.display()));
    }

    debug!("Using built-in localnet identities");
    Ok(IdentitySet::localnet_defaults())
}

fn node_config(args: &RootArgs) -> NodeConfig {
    let mut config = NodeConfig::new(&args.paths.aptos_cli_path, args.force_restart, args.node.ready_url.clone());
    config.reclaim_port = args.node.node_port;
    config.poll_interval = args.node.poll_interval();
    config
}

fn provisioning_config(args: &RootArgs, identities: IdentitySet) -> ProvisioningConfig {
    let mut config = ProvisioningConfig::new(identities, &args.paths.move_dir, args.node.api_url.clone());
    config.offline = args.offline;
    config
}

/// Provisions a freshly restarted localnet. Resumed state is left alone,
/// since it was provisioned when it was created.
async fn provision(config: ProvisioningConfig, cli_path: PathBuf, fresh: bool) -> Result<()> {
    if !fresh {
        info!("Resuming existing localnet state, skipping provisioning");
        return Ok(());
    }

    let cli = AptosCli::new(cli_path, &config.package_dir);
    let api = NodeApiClient::new(config.api_url.clone(), API_TIMEOUT)?;
    let ctx = StepContext::new(&config, &cli, &api);

    let workflow = Workflow::standard()?;
    let report = workflow.run(&ctx).await?;
    for step in &report.steps {
        debug!(step = step.name, elapsed_ms = step.elapsed.as_millis() as u64, "Step finished");
    }
    Ok(())
}
