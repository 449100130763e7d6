//! # Kubernetes Store
//!
//! API server backed implementation of the store traits.
//!
//! Status writes are merge patches that carry `metadata.resourceVersion`.
//! The API server rejects the patch with 409 when the version is stale,
//! which is surfaced as `StoreError::Conflict`.

use crate::constants::FIELD_MANAGER;
use crate::controller::reconciler::snapshot::RevisionId;
use crate::crd::{KubeControllerManager, KubeControllerManagerStatus, NodeConfig, NodeConfigStatus};
use crate::store::{
    RevisionSource, SnapshotSource, StatusStore, StoreError, TargetSource, Versioned,
};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn nodes(&self) -> Api<NodeConfig> {
        Api::all(self.client.clone())
    }

    fn operators(&self) -> Api<KubeControllerManager> {
        Api::all(self.client.clone())
    }
}

/// Map a write error, keeping conflicts and missing objects distinguishable
fn classify_write_error(
    error: kube::Error,
    kind: &'static str,
    name: &str,
    resource_version: &str,
) -> StoreError {
    match error {
        kube::Error::Api(api_err) if api_err.code == 409 => StoreError::Conflict {
            kind,
            name: name.to_string(),
            resource_version: resource_version.to_string(),
        },
        kube::Error::Api(api_err) if api_err.code == 404 => StoreError::NotFound {
            kind,
            name: name.to_string(),
        },
        other => StoreError::Api(other),
    }
}

/// Merge patch body replacing `status`, guarded by the optimistic token
fn guarded_status_patch<S: Serialize>(
    kind: &'static str,
    status: &S,
    resource_version: &str,
) -> Result<serde_json::Value, StoreError> {
    let status = serde_json::to_value(status)
        .map_err(|source| StoreError::Serialization { kind, source })?;
    Ok(serde_json::json!({
        "metadata": { "resourceVersion": resource_version },
        "status": status,
    }))
}

#[async_trait]
impl TargetSource for KubeStore {
    async fn get_profile(&self, name: &str) -> Result<Option<String>, StoreError> {
        let node = self.nodes().get_opt(name).await?;
        Ok(node.map(|node| node.spec.worker_latency_profile.unwrap_or_default()))
    }
}

#[async_trait]
impl StatusStore<NodeConfigStatus> for KubeStore {
    async fn read_status(
        &self,
        name: &str,
    ) -> Result<Option<Versioned<NodeConfigStatus>>, StoreError> {
        let node = self.nodes().get_opt(name).await?;
        Ok(node.map(|node| Versioned {
            resource_version: node.metadata.resource_version.unwrap_or_default(),
            value: node.status.unwrap_or_default(),
        }))
    }

    async fn write_status(
        &self,
        name: &str,
        status: &NodeConfigStatus,
        resource_version: &str,
    ) -> Result<(), StoreError> {
        let patch = guarded_status_patch("Node", status, resource_version)?;
        debug!(
            resource.name = name,
            resource.version = resource_version,
            "Patching node config status"
        );
        self.nodes()
            .patch_status(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch))
            .await
            .map_err(|e| classify_write_error(e, "Node", name, resource_version))?;
        Ok(())
    }
}

#[async_trait]
impl StatusStore<KubeControllerManagerStatus> for KubeStore {
    async fn read_status(
        &self,
        name: &str,
    ) -> Result<Option<Versioned<KubeControllerManagerStatus>>, StoreError> {
        let operator = self.operators().get_opt(name).await?;
        Ok(operator.map(|operator| Versioned {
            resource_version: operator.metadata.resource_version.unwrap_or_default(),
            value: operator.status.unwrap_or_default(),
        }))
    }

    async fn write_status(
        &self,
        name: &str,
        status: &KubeControllerManagerStatus,
        resource_version: &str,
    ) -> Result<(), StoreError> {
        let patch = guarded_status_patch("KubeControllerManager", status, resource_version)?;
        debug!(
            resource.name = name,
            resource.version = resource_version,
            "Patching kube-controller-manager operator status"
        );
        self.operators()
            .patch_status(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch))
            .await
            .map_err(|e| classify_write_error(e, "KubeControllerManager", name, resource_version))?;
        Ok(())
    }
}

#[async_trait]
impl RevisionSource for KubeStore {
    async fn current_revisions(&self, operator_name: &str) -> Result<Vec<RevisionId>, StoreError> {
        let operator = self
            .operators()
            .get_opt(operator_name)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                kind: "KubeControllerManager",
                name: operator_name.to_string(),
            })?;
        Ok(operator
            .status
            .unwrap_or_default()
            .node_statuses
            .iter()
            .map(|node| RevisionId(node.current_revision))
            .collect())
    }
}

#[async_trait]
impl SnapshotSource for KubeStore {
    async fn get_document(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>, StoreError> {
        let config_maps: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let config_map = config_maps.get_opt(name).await?;
        Ok(config_map.map(|cm| cm.data.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONTROLLER_DEGRADED_CONDITION;
    use crate::controller::reconciler::status::set_condition;
    use crate::controller::reconciler::{derive, Outcome};
    use crate::crd::{Condition, ConditionStatus};
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_guarded_status_patch_carries_resource_version() {
        let mut status = NodeConfigStatus::default();
        status
            .conditions_mut()
            .push(Condition::new("KubeControllerManagerComplete", ConditionStatus::True));

        let patch = guarded_status_patch("Node", &status, "42").unwrap();

        assert_eq!(patch["metadata"]["resourceVersion"], "42");
        assert_eq!(
            patch["status"]["workerLatencyProfileStatus"]["conditions"][0]["type"],
            "KubeControllerManagerComplete"
        );
    }

    #[test]
    fn test_node_conditions_always_carry_reason_and_message() {
        for outcome in [Outcome::ProfileEmpty, Outcome::Converged, Outcome::Progressing] {
            let mut status = NodeConfigStatus::default();
            for condition in derive(outcome).iter() {
                set_condition(status.conditions_mut(), condition.clone(), Utc::now());
            }

            let patch = guarded_status_patch("Node", &status, "7").unwrap();
            let conditions = patch["status"]["workerLatencyProfileStatus"]["conditions"]
                .as_array()
                .unwrap()
                .clone();

            assert_eq!(conditions.len(), 3);
            for condition in conditions {
                for field in ["type", "status", "lastTransitionTime", "reason", "message"] {
                    assert!(
                        condition[field].is_string(),
                        "{outcome}: {field} missing in {condition}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_operator_patch_keeps_fields_owned_by_other_writers() {
        let mut status: KubeControllerManagerStatus = serde_json::from_value(json!({
            "conditions": [{
                "type": "NodeInstallerProgressing",
                "status": "True",
                "reason": "AllNodesAtLatestRevision",
            }],
            "readyReplicas": 3,
            "nodeStatuses": [{
                "nodeName": "master-0",
                "currentRevision": 6,
                "targetRevision": 7,
                "lastFailedRevision": 5,
                "lastFailedReason": "InstallerFailed",
            }],
        }))
        .unwrap();
        set_condition(
            &mut status.conditions,
            Condition::new(CONTROLLER_DEGRADED_CONDITION, ConditionStatus::False),
            Utc::now(),
        );

        let patch = guarded_status_patch("KubeControllerManager", &status, "11").unwrap();

        let node = &patch["status"]["nodeStatuses"][0];
        assert_eq!(node["lastFailedRevision"], 5);
        assert_eq!(node["lastFailedReason"], "InstallerFailed");
        assert_eq!(node["currentRevision"], 6);
        assert_eq!(patch["status"]["readyReplicas"], 3);
        let conditions = patch["status"]["conditions"].as_array().unwrap();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0]["type"], "NodeInstallerProgressing");
        assert_eq!(conditions[1]["type"], CONTROLLER_DEGRADED_CONDITION);
    }
}
