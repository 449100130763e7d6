//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics,
//! server startup, and Kubernetes client setup.

use crate::config::ControllerConfig;
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::observability;
use crate::store::KubeStore;
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// Reconciler context
    pub reconciler: Arc<Reconciler>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("reconciler", &self.reconciler)
            .field("server_ready", &self.server_state.is_ready())
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Configuration loading
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - Reconciler setup
pub async fn initialize() -> Result<InitializationResult> {
    // Must run before any TLS connection is made
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|existing| {
            anyhow::anyhow!("Failed to install rustls crypto provider, one is already set: {existing:?}")
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "latency_profile_controller=info".into()),
        )
        .init();

    info!("Starting Latency Profile Controller");
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let config = ControllerConfig::from_env();
    info!(
        target_name = %config.target_name,
        operator_name = %config.operator_name,
        namespace = %config.target_namespace,
        resync_secs = config.resync_interval_secs,
        "Loaded controller configuration"
    );

    observability::register_metrics()?;

    let server_state = Arc::new(ServerState::default());

    // Start server in background task
    let server_state_clone = Arc::clone(&server_state);
    let server_port = config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    wait_for_server_ready(&server_state, &server_handle, &config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let store = Arc::new(KubeStore::new(client.clone()));
    let reconciler = Arc::new(Reconciler::new(store, config));

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        reconciler,
        server_state,
    })
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
    config: &ControllerConfig,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(config.server_startup_timeout_secs);
    let poll_interval = Duration::from_millis(config.server_poll_interval_ms);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}
