//! # Reconciler
//!
//! Measures whether the kube-controller-manager fleet runs with the
//! arguments implied by the cluster's worker latency profile, and publishes
//! the verdict as conditions on the `cluster` node config.
//!
//! ## Reconciliation Flow
//!
//! 1. Resolve the profile to expected arguments (`profile`)
//! 2. Fetch one config snapshot per distinct running revision (`snapshot`)
//! 3. Check every snapshot against the expectation (`convergence`)
//! 4. Derive the Degraded / Progressing / Complete conditions (`conditions`)
//! 5. Merge and commit them with optimistic concurrency (`status`)

pub mod conditions;
pub mod convergence;
pub mod profile;
pub mod reconcile;
pub mod snapshot;
pub mod status;
pub mod types;

// Re-export public API
pub use conditions::{derive, ConditionKind, ConditionSet, Outcome};
pub use convergence::evaluate;
pub use profile::{resolve, resolve_raw, ExpectedSettings, ProfileError, ProfileSelector, Resolution};
pub use reconcile::{evaluate_fleet, reconcile, sync, update_latency_profile_status, FleetEvaluation};
pub use snapshot::{fetch_snapshots, ConfigSnapshot, RevisionId, SnapshotError, SnapshotLocation};
pub use status::{commit_conditions, report_degraded, update_status_with_retry, CommitError};
pub use types::{BackoffState, Reconciler, ReconcilerError};
