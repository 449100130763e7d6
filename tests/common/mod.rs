//! Common fixtures for integration tests
//!
//! Builds in-memory clusters with a node config, a kube-controller-manager
//! fleet and per-revision config snapshots.

#![allow(dead_code, reason = "each test binary uses a different subset of fixtures")]

use latency_profile_controller::config::ControllerConfig;
use latency_profile_controller::constants::CONTROLLER_DEGRADED_CONDITION;
use latency_profile_controller::controller::backoff::ExponentialBackoff;
use latency_profile_controller::controller::reconciler::{ConditionKind, ConfigSnapshot, Reconciler};
use latency_profile_controller::crd::{Condition, ConditionStatus};
use latency_profile_controller::store::InMemoryCluster;
use std::sync::Arc;

pub const NAMESPACE: &str = "openshift-kube-controller-manager";
pub const TARGET: &str = "cluster";
pub const GRACE_PERIOD: &str = "node-monitor-grace-period";

/// Snapshot carrying a single `node-monitor-grace-period` value
pub fn grace(period: &str) -> ConfigSnapshot {
    ConfigSnapshot::with_arguments([(GRACE_PERIOD, period)])
}

/// Cluster with the given profile, one replica per entry of `replicas`, and
/// a `config-<rev>` snapshot for every `(rev, period)` pair
pub fn cluster(profile: &str, replicas: &[i32], snapshots: &[(i32, &str)]) -> Arc<InMemoryCluster> {
    let cluster = InMemoryCluster::new()
        .with_target(profile)
        .with_revisions(replicas);
    for (revision, period) in snapshots {
        cluster.put_snapshot(NAMESPACE, &format!("config-{revision}"), &grace(period));
    }
    Arc::new(cluster)
}

/// Reconciler over `cluster` with delay-free conflict retries
pub fn reconciler(cluster: &Arc<InMemoryCluster>) -> Reconciler {
    let store: Arc<InMemoryCluster> = Arc::clone(cluster);
    Reconciler::new(store, ControllerConfig::default())
        .with_conflict_backoff(ExponentialBackoff::immediate(4))
}

pub fn node_condition(cluster: &InMemoryCluster, kind: ConditionKind) -> Option<Condition> {
    cluster
        .node_status()?
        .conditions()
        .iter()
        .find(|c| c.r#type == kind.as_str())
        .cloned()
}

pub fn node_statuses(cluster: &InMemoryCluster) -> [Option<ConditionStatus>; 3] {
    ConditionKind::ALL.map(|kind| node_condition(cluster, kind).map(|c| c.status))
}

pub fn controller_degraded(cluster: &InMemoryCluster) -> Option<Condition> {
    cluster
        .operator_status()?
        .conditions
        .into_iter()
        .find(|c| c.r#type == CONTROLLER_DEGRADED_CONDITION)
}
