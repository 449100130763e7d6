//! # Node Config
//!
//! Cluster-scoped `nodes.config.openshift.io` resource. Its spec carries the
//! worker latency profile chosen by the cluster administrator, its status
//! carries the rollout conditions published by this controller.

use crate::crd::Condition;
use serde::{Deserialize, Serialize};

/// Cluster-wide node configuration
///
/// # Example
///
/// ```yaml
/// apiVersion: config.openshift.io/v1
/// kind: Node
/// metadata:
///   name: cluster
/// spec:
///   workerLatencyProfile: MediumUpdateAverageReaction
/// ```
#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "Node",
    group = "config.openshift.io",
    version = "v1",
    status = "crate::crd::NodeConfigStatus",
    printcolumn = r#"{"name":"Profile", "type":"string", "jsonPath":".spec.workerLatencyProfile"}, {"name":"Complete", "type":"string", "jsonPath":".status.workerLatencyProfileStatus.conditions[?(@.type==\"KubeControllerManagerComplete\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfigSpec {
    /// Worker latency profile: "Default", "MediumUpdateAverageReaction" or
    /// "LowUpdateSlowReaction". Empty or absent means no profile is applied.
    /// Kept as a plain string so unknown values reach the controller and are
    /// reported instead of being rejected by deserialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_latency_profile: Option<String>,
}

/// The generated `Node` resource, named apart from the core `v1/Node`
pub type NodeConfig = Node;

/// Status of the node config resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfigStatus {
    /// Rollout state of the worker latency profile
    #[serde(default)]
    pub worker_latency_profile_status: WorkerLatencyProfileStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerLatencyProfileStatus {
    /// At most one condition per type
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl NodeConfigStatus {
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.worker_latency_profile_status.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.worker_latency_profile_status.conditions
    }
}
