//! # Watch Loop
//!
//! Runs the kube-runtime controller for the target node config.
//!
//! Three watches feed the same reconcile key (the target):
//! - the node config itself, narrowed to the target by field selector
//! - the kube-controller-manager operator resource (node revisions change)
//! - per-revision config maps in the target namespace
//!
//! Successful cycles requeue after the resync interval.

use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::crd::{KubeControllerManager, NodeConfig};
use crate::runtime::error_policy::handle_reconciliation_error;
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::Api;
use kube::Client;
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

/// Run the controller watch loop until a shutdown signal arrives
pub async fn run_watch_loop(
    client: Client,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let config = &reconciler.config;
    let nodes: Api<NodeConfig> = Api::all(client.clone());
    let operators: Api<KubeControllerManager> = Api::all(client.clone());
    let config_maps: Api<ConfigMap> = Api::namespaced(client, &config.target_namespace);

    // Mark not ready as soon as shutdown starts
    let shutdown_state = Arc::clone(&server_state);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received shutdown signal, waiting for in-flight reconciliations to complete...");
        shutdown_state.set_ready(false);
    });

    let operator_target = config.target_name.clone();
    let config_map_target = config.target_name.clone();
    let config_map_prefix = format!("{}-", config.config_map_base_name);

    let watch_span = tracing::span!(
        tracing::Level::INFO,
        "controller.watch",
        resource.name = %config.target_name
    );
    info!(parent: &watch_span, "Starting controller watch loop...");

    Controller::new(
        nodes,
        watcher::Config::default().fields(&format!("metadata.name={}", config.target_name)),
    )
    .watches(
        operators,
        watcher::Config::default().fields(&format!("metadata.name={}", config.operator_name)),
        move |_: KubeControllerManager| Some(ObjectRef::<NodeConfig>::new(&operator_target)),
    )
    .watches(config_maps, watcher::Config::default(), move |cm: ConfigMap| {
        cm.metadata
            .name
            .as_deref()
            .filter(|name| name.starts_with(&config_map_prefix))
            .map(|_| ObjectRef::<NodeConfig>::new(&config_map_target))
    })
    .shutdown_on_signal()
    .run(reconcile, handle_reconciliation_error, Arc::clone(&reconciler))
    .for_each(|result| async move {
        match result {
            Ok((obj, action)) => debug!(object = %obj, action = ?action, "watch.event.success"),
            Err(e) => warn!("Controller stream error: {}", e),
        }
    })
    .instrument(watch_span)
    .await;

    info!("Controller stopped gracefully");
    Ok(())
}
