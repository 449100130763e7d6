//! # KubeControllerManager Operator Resource
//!
//! Cluster-scoped `kubecontrollermanagers.operator.openshift.io` resource.
//! Its status lists the config revision every control-plane node currently
//! runs and holds the operator's own conditions, including the operational
//! condition reported by this controller.

use crate::crd::Condition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "KubeControllerManager",
    group = "operator.openshift.io",
    version = "v1",
    status = "crate::crd::KubeControllerManagerStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct KubeControllerManagerSpec {
    /// Managed, Unmanaged or Removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubeControllerManagerStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_available_revision: Option<i32>,
    /// One entry per control-plane node
    #[serde(default)]
    pub node_statuses: Vec<NodeRevisionStatus>,
    /// Fields owned by other writers, carried through unchanged on write
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Revision state of a single control-plane node
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeRevisionStatus {
    pub node_name: String,
    /// Revision the node is running right now
    #[serde(default)]
    pub current_revision: i32,
    /// Revision the node is moving to, if a rollout is under way
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_revision: Option<i32>,
    /// Installer bookkeeping such as `lastFailedRevision`
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
