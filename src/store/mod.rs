//! # Stores
//!
//! Seams between the reconciler and the cluster it observes.
//!
//! Each external collaborator is an async trait:
//! - `TargetSource` reads the worker latency profile of the target resource
//! - `StatusStore` reads a status sub-document together with its optimistic
//!   token and writes it back conditionally on that token
//! - `RevisionSource` lists the config revisions the fleet is running
//! - `SnapshotSource` returns the raw per-revision config document
//!
//! `kube_api::KubeStore` talks to the API server, `memory::InMemoryCluster` is a
//! deterministic double used by tests and dry runs.

use crate::controller::reconciler::snapshot::RevisionId;
use crate::crd::{KubeControllerManagerStatus, NodeConfigStatus};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

pub mod kube_api;
pub mod memory;

pub use kube_api::KubeStore;
pub use memory::InMemoryCluster;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
    /// The optimistic token used for a write is no longer current
    #[error("conflict writing {kind} '{name}': resource version {resource_version} is stale")]
    Conflict {
        kind: &'static str,
        name: String,
        resource_version: String,
    },
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),
    #[error("failed to serialize {kind} status: {source}")]
    Serialization {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// A value read from the store together with the token that must accompany
/// any write derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub resource_version: String,
}

#[async_trait]
pub trait TargetSource: Send + Sync {
    /// Raw `spec.workerLatencyProfile` of the named target
    ///
    /// `Ok(None)` means the target does not exist. An absent profile is
    /// returned as an empty string.
    async fn get_profile(&self, name: &str) -> Result<Option<String>, StoreError>;
}

#[async_trait]
pub trait StatusStore<S>: Send + Sync
where
    S: Send + Sync,
{
    /// Read the status sub-document and its optimistic token
    async fn read_status(&self, name: &str) -> Result<Option<Versioned<S>>, StoreError>;

    /// Replace the status sub-document if `resource_version` is still current
    ///
    /// Returns `StoreError::Conflict` when the token is stale.
    async fn write_status(
        &self,
        name: &str,
        status: &S,
        resource_version: &str,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RevisionSource: Send + Sync {
    /// Current revision of every replica, one entry per replica
    async fn current_revisions(&self, operator_name: &str) -> Result<Vec<RevisionId>, StoreError>;
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Raw data of the named per-revision document, `Ok(None)` when missing
    async fn get_document(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>, StoreError>;
}

/// Everything a reconcile cycle needs from the cluster
pub trait ClusterStore:
    TargetSource
    + StatusStore<NodeConfigStatus>
    + StatusStore<KubeControllerManagerStatus>
    + RevisionSource
    + SnapshotSource
    + std::fmt::Debug
{
}

impl<T> ClusterStore for T where
    T: TargetSource
        + StatusStore<NodeConfigStatus>
        + StatusStore<KubeControllerManagerStatus>
        + RevisionSource
        + SnapshotSource
        + std::fmt::Debug
{
}
