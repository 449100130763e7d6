//! # In-Memory Store
//!
//! Deterministic implementation of every store trait, backed by a mutex.
//!
//! Resource versions are a single monotonically increasing counter, like
//! the API server's. Writes are accepted only with the current version.
//! Counters record every status write and snapshot lookup so callers can
//! assert on side effects, and a concurrent writer can be simulated to
//! exercise the optimistic retry path.

use crate::constants::DEFAULT_CONFIG_MAP_KEY;
use crate::controller::reconciler::snapshot::{ConfigSnapshot, RevisionId};
use crate::crd::{
    Condition, KubeControllerManagerStatus, NodeConfigStatus, NodeRevisionStatus,
};
use crate::store::{
    RevisionSource, SnapshotSource, StatusStore, StoreError, TargetSource, Versioned,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Target {
    profile: String,
    status: NodeConfigStatus,
    resource_version: u64,
}

#[derive(Debug, Default)]
struct Operator {
    status: KubeControllerManagerStatus,
    resource_version: u64,
}

/// Foreign edit applied by a simulated concurrent writer
#[derive(Debug, Clone)]
struct ConcurrentWriter {
    remaining: usize,
    edit: Condition,
}

#[derive(Debug, Default)]
struct State {
    next_version: u64,
    target: Option<Target>,
    operator: Option<Operator>,
    documents: BTreeMap<(String, String), BTreeMap<String, String>>,
    concurrent_writer: Option<ConcurrentWriter>,
    node_status_writes: usize,
    operator_status_writes: usize,
    snapshot_lookups: usize,
}

impl State {
    fn bump(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCluster {
    state: Mutex<State>,
}

impl InMemoryCluster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create (or replace the spec of) the target with the given raw profile
    #[must_use]
    pub fn with_target(self, profile: &str) -> Self {
        self.set_profile(profile);
        self
    }

    /// Seed the target status, creating the target with an empty profile if needed
    #[must_use]
    pub fn with_target_status(self, status: NodeConfigStatus) -> Self {
        {
            let mut state = self.state();
            let version = state.bump();
            let target = state.target.get_or_insert_with(Target::default);
            target.status = status;
            target.resource_version = version;
        }
        self
    }

    /// Create the operator resource with one replica per revision entry
    #[must_use]
    pub fn with_revisions(self, revisions: &[i32]) -> Self {
        self.set_revisions(revisions);
        self
    }

    /// Store a per-revision snapshot document under the default key
    #[must_use]
    pub fn with_snapshot(self, namespace: &str, name: &str, snapshot: &ConfigSnapshot) -> Self {
        self.put_snapshot(namespace, name, snapshot);
        self
    }

    /// Store an arbitrary raw document
    #[must_use]
    pub fn with_document(
        self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Self {
        self.state()
            .documents
            .insert((namespace.to_string(), name.to_string()), data);
        self
    }

    pub fn set_profile(&self, profile: &str) {
        let mut state = self.state();
        let version = state.bump();
        let target = state.target.get_or_insert_with(Target::default);
        target.profile = profile.to_string();
        target.resource_version = version;
    }

    pub fn remove_target(&self) {
        self.state().target = None;
    }

    pub fn set_revisions(&self, revisions: &[i32]) {
        let mut state = self.state();
        let version = state.bump();
        let operator = state.operator.get_or_insert_with(Operator::default);
        operator.status.node_statuses = revisions
            .iter()
            .enumerate()
            .map(|(i, revision)| NodeRevisionStatus {
                node_name: format!("master-{i}"),
                current_revision: *revision,
                ..NodeRevisionStatus::default()
            })
            .collect();
        operator.resource_version = version;
    }

    pub fn put_snapshot(&self, namespace: &str, name: &str, snapshot: &ConfigSnapshot) {
        let encoded = serde_json::to_string(snapshot).unwrap_or_default();
        self.state().documents.insert(
            (namespace.to_string(), name.to_string()),
            BTreeMap::from([(DEFAULT_CONFIG_MAP_KEY.to_string(), encoded)]),
        );
    }

    /// Make another actor edit the target status right before each of the
    /// next `times` writes, so those writes carry a stale token
    ///
    /// The edit replaces (or appends) the condition with the same type.
    pub fn simulate_concurrent_writer(&self, times: usize, edit: Condition) {
        self.state().concurrent_writer = Some(ConcurrentWriter {
            remaining: times,
            edit,
        });
    }

    #[must_use]
    pub fn node_status(&self) -> Option<NodeConfigStatus> {
        self.state().target.as_ref().map(|t| t.status.clone())
    }

    #[must_use]
    pub fn operator_status(&self) -> Option<KubeControllerManagerStatus> {
        self.state().operator.as_ref().map(|o| o.status.clone())
    }

    #[must_use]
    pub fn node_status_writes(&self) -> usize {
        self.state().node_status_writes
    }

    #[must_use]
    pub fn operator_status_writes(&self) -> usize {
        self.state().operator_status_writes
    }

    #[must_use]
    pub fn snapshot_lookups(&self) -> usize {
        self.state().snapshot_lookups
    }
}

fn stale(kind: &'static str, name: &str, resource_version: &str) -> StoreError {
    StoreError::Conflict {
        kind,
        name: name.to_string(),
        resource_version: resource_version.to_string(),
    }
}

#[async_trait]
impl TargetSource for InMemoryCluster {
    async fn get_profile(&self, _name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state().target.as_ref().map(|t| t.profile.clone()))
    }
}

#[async_trait]
impl StatusStore<NodeConfigStatus> for InMemoryCluster {
    async fn read_status(
        &self,
        _name: &str,
    ) -> Result<Option<Versioned<NodeConfigStatus>>, StoreError> {
        Ok(self.state().target.as_ref().map(|t| Versioned {
            value: t.status.clone(),
            resource_version: t.resource_version.to_string(),
        }))
    }

    async fn write_status(
        &self,
        name: &str,
        status: &NodeConfigStatus,
        resource_version: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state();

        if let Some(writer) = state.concurrent_writer.as_mut().filter(|w| w.remaining > 0) {
            writer.remaining -= 1;
            let edit = writer.edit.clone();
            let version = state.bump();
            if let Some(target) = state.target.as_mut() {
                let conditions = target.status.conditions_mut();
                match conditions.iter_mut().find(|c| c.r#type == edit.r#type) {
                    Some(existing) => *existing = edit,
                    None => conditions.push(edit),
                }
                target.resource_version = version;
            }
        }

        let version = state.bump();
        let target = state.target.as_mut().ok_or_else(|| StoreError::NotFound {
            kind: "Node",
            name: name.to_string(),
        })?;
        if target.resource_version.to_string() != resource_version {
            return Err(stale("Node", name, resource_version));
        }
        target.status = status.clone();
        target.resource_version = version;
        state.node_status_writes += 1;
        Ok(())
    }
}

#[async_trait]
impl StatusStore<KubeControllerManagerStatus> for InMemoryCluster {
    async fn read_status(
        &self,
        _name: &str,
    ) -> Result<Option<Versioned<KubeControllerManagerStatus>>, StoreError> {
        Ok(self.state().operator.as_ref().map(|o| Versioned {
            value: o.status.clone(),
            resource_version: o.resource_version.to_string(),
        }))
    }

    async fn write_status(
        &self,
        name: &str,
        status: &KubeControllerManagerStatus,
        resource_version: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        let version = state.bump();
        let operator = state.operator.as_mut().ok_or_else(|| StoreError::NotFound {
            kind: "KubeControllerManager",
            name: name.to_string(),
        })?;
        if operator.resource_version.to_string() != resource_version {
            return Err(stale("KubeControllerManager", name, resource_version));
        }
        operator.status = status.clone();
        operator.resource_version = version;
        state.operator_status_writes += 1;
        Ok(())
    }
}

#[async_trait]
impl RevisionSource for InMemoryCluster {
    async fn current_revisions(&self, operator_name: &str) -> Result<Vec<RevisionId>, StoreError> {
        let state = self.state();
        let operator = state.operator.as_ref().ok_or_else(|| StoreError::NotFound {
            kind: "KubeControllerManager",
            name: operator_name.to_string(),
        })?;
        Ok(operator
            .status
            .node_statuses
            .iter()
            .map(|node| RevisionId(node.current_revision))
            .collect())
    }
}

#[async_trait]
impl SnapshotSource for InMemoryCluster {
    async fn get_document(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>, StoreError> {
        let mut state = self.state();
        state.snapshot_lookups += 1;
        Ok(state
            .documents
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}
