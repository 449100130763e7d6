//! # Types
//!
//! Core types for the reconciler.

use crate::config::ControllerConfig;
use crate::controller::backoff::{ExponentialBackoff, FibonacciBackoff};
use crate::controller::reconciler::profile::ProfileError;
use crate::controller::reconciler::snapshot::{SnapshotLocation, SnapshotError};
use crate::controller::reconciler::status::CommitError;
use crate::store::{ClusterStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error(transparent)]
    UnknownProfile(#[from] ProfileError),
    #[error("failed to read fleet revisions: {0}")]
    Revisions(#[source] StoreError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Commit(#[from] CommitError),
    #[error("failed to read node config: {0}")]
    Store(#[source] StoreError),
    #[error("failed to report controller status: {0}")]
    OperatorStatus(#[source] CommitError),
}

/// Backoff state for a specific resource
/// Tracks error count and backoff calculator for progressive retries
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_secs, max_secs),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count += 1;
    }

    pub fn reset(&mut self) {
        self.error_count = 0;
        self.backoff.reset();
    }
}

/// Shared context of every reconcile cycle
#[derive(Clone)]
pub struct Reconciler {
    pub store: Arc<dyn ClusterStore>,
    pub config: ControllerConfig,
    pub conflict_backoff: ExponentialBackoff,
    // Backoff state per resource name, driven by the error policy
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("store", &self.store)
            .field("target", &self.config.target_name)
            .field("operator", &self.config.operator_name)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(store: Arc<dyn ClusterStore>, config: ControllerConfig) -> Self {
        Self {
            store,
            conflict_backoff: config.conflict_backoff(),
            config,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Override the conflict retry schedule
    #[must_use]
    pub fn with_conflict_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.conflict_backoff = backoff;
        self
    }

    #[must_use]
    pub fn snapshot_location(&self) -> SnapshotLocation<'_> {
        SnapshotLocation {
            namespace: &self.config.target_namespace,
            base_name: &self.config.config_map_base_name,
            key: &self.config.config_map_key,
        }
    }

    /// Forget the error history of `name` after a successful cycle
    pub fn reset_backoff(&self, name: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            if let Some(state) = states.get_mut(name) {
                state.reset();
            }
        }
    }
}
