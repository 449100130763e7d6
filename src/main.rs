//! # Latency Profile Controller
//!
//! A Kubernetes controller that reports whether the kube-controller-manager
//! fleet has rolled out the cluster's worker latency profile.
//!
//! ## Overview
//!
//! 1. **Watching** the `cluster` node config, the kube-controller-manager
//!    operator resource and the per-revision config maps
//! 2. **Resolving** the worker latency profile to the expected
//!    `node-monitor-grace-period`
//! 3. **Checking** the config snapshot of every revision the fleet runs
//! 4. **Publishing** Degraded / Progressing / Complete conditions on the node
//!    config status, plus the controller's own health on the operator status
//!
//! Prometheus metrics and health probes are served over HTTP.

use anyhow::Result;
use latency_profile_controller::runtime::{initialize, run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    run_watch_loop(
        init.client,
        init.reconciler,
        init.server_state,
    )
    .await
}
