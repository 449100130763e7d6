//! # LPCTL CLI
//!
//! Command-line interface for the Latency Profile Controller.
//!
//! ## Usage
//!
//! ```bash
//! # Show the published rollout conditions and the controller's health
//! lpctl status
//!
//! # Evaluate the fleet now, without writing anything
//! lpctl check
//!
//! # Show the arguments a profile implies
//! lpctl resolve MediumUpdateAverageReaction
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::Client;
use latency_profile_controller::config::ControllerConfig;

mod check;
mod resolve;
mod status;

/// Latency Profile Controller CLI
#[derive(Parser)]
#[command(name = "lpctl")]
#[command(
    about = "Latency Profile Controller CLI",
    long_about = None,
    after_help = "\
Examples:
  lpctl status
  lpctl check --target cluster
  lpctl resolve LowUpdateSlowReaction
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Name of the node config resource (defaults to TARGET_NAME or 'cluster')
    #[arg(long, global = true)]
    target: Option<String>,

    /// Name of the kube-controller-manager operator resource
    #[arg(long, global = true)]
    operator: Option<String>,

    /// Namespace of the per-revision config maps
    #[arg(short, long, global = true)]
    namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show rollout conditions and the controller's operational condition
    Status,
    /// Evaluate convergence of the fleet without updating any status
    Check,
    /// Print the controller-manager arguments implied by a profile
    Resolve {
        /// Profile value, e.g. "Default", "MediumUpdateAverageReaction", "LowUpdateSlowReaction"
        /// or "" for no profile
        #[arg(value_name = "PROFILE")]
        profile: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|existing| {
            anyhow::anyhow!("Failed to install rustls crypto provider, one is already set: {existing:?}")
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lpctl=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ControllerConfig::from_env();
    if let Some(target) = cli.target {
        config.target_name = target;
    }
    if let Some(operator) = cli.operator {
        config.operator_name = operator;
    }
    if let Some(namespace) = cli.namespace {
        config.target_namespace = namespace;
    }

    if let Commands::Resolve { profile } = &cli.command {
        return resolve::resolve_command(profile);
    }

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;

    match cli.command {
        Commands::Status => status::status_command(client, &config).await,
        Commands::Check => check::check_command(client, config).await,
        Commands::Resolve { .. } => Ok(()),
    }
}
