//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use latency_profile_controller::prelude::*;
//! ```

// CRD types - most commonly used
pub use crate::crd::*;

// Store traits and implementations
pub use crate::store::{
    ClusterStore, InMemoryCluster, KubeStore, RevisionSource, SnapshotSource, StatusStore,
    StoreError, TargetSource, Versioned,
};

// Reconciler types - core controller functionality
pub use crate::controller::reconciler::{
    evaluate_fleet, reconcile, sync, CommitError, ConditionKind, ConfigSnapshot, Outcome,
    ProfileSelector, Reconciler, ReconcilerError, Resolution, RevisionId,
};

// Config types
pub use crate::config::ControllerConfig;
