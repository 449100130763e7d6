//! # Status Commit
//!
//! Optimistic-concurrency write loop shared by every status document.
//!
//! Each attempt reads the current document and its resource version,
//! applies the mutation to a copy, and writes the copy only if it differs.
//! A stale resource version is retried on a bounded exponential schedule.
//! Any other failure ends the loop immediately.

use crate::controller::backoff::ExponentialBackoff;
use crate::controller::reconciler::conditions::ConditionSet;
use crate::controller::reconciler::status::merge::set_condition;
use crate::crd::NodeConfigStatus;
use crate::observability;
use crate::store::{StatusStore, StoreError};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn, Instrument};

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("gave up updating {kind} '{name}' status after {attempts} conflicting attempts")]
    ConflictExhausted {
        kind: &'static str,
        name: String,
        attempts: u32,
    },
    #[error("{kind} '{name}' not found while updating status")]
    NotFound { kind: &'static str, name: String },
    #[error("failed to update status: {0}")]
    Store(#[from] StoreError),
}

/// Read, mutate, compare and conditionally write a status document
///
/// Returns whether a write happened. When the mutation leaves the document
/// unchanged nothing is written and `Ok(false)` is returned.
///
/// # Errors
///
/// - `CommitError::ConflictExhausted` once every attempt hit a stale version
/// - `CommitError::NotFound` when the object is gone
/// - `CommitError::Store` for any other store failure, without retrying
pub async fn update_status_with_retry<S, T, F>(
    store: &T,
    kind: &'static str,
    name: &str,
    backoff: &ExponentialBackoff,
    mut mutate: F,
) -> Result<bool, CommitError>
where
    S: Clone + PartialEq + Send + Sync,
    T: StatusStore<S> + ?Sized,
    F: FnMut(&mut S) + Send,
{
    let span = tracing::debug_span!("status.commit", resource.kind = kind, resource.name = name);
    async move {
        let attempts = backoff.steps();
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(backoff.delay_for_retry(attempt - 1)).await;
            }

            let current = store
                .read_status(name)
                .await?
                .ok_or_else(|| CommitError::NotFound {
                    kind,
                    name: name.to_string(),
                })?;

            let mut desired = current.value.clone();
            mutate(&mut desired);
            if desired == current.value {
                debug!("Skipping status update - status unchanged");
                return Ok(false);
            }

            match store
                .write_status(name, &desired, &current.resource_version)
                .await
            {
                Ok(()) => {
                    observability::increment_status_writes(kind);
                    debug!(attempt = attempt + 1, "Status updated");
                    return Ok(true);
                }
                Err(e) if e.is_conflict() => {
                    observability::increment_status_conflicts(kind);
                    debug!(attempt = attempt + 1, "Status write conflicted, retrying with a fresh read");
                }
                Err(e) if e.is_not_found() => {
                    return Err(CommitError::NotFound {
                        kind,
                        name: name.to_string(),
                    });
                }
                Err(e) => return Err(CommitError::Store(e)),
            }
        }

        warn!(attempts, "Giving up on status update after repeated conflicts");
        Err(CommitError::ConflictExhausted {
            kind,
            name: name.to_string(),
            attempts,
        })
    }
    .instrument(span)
    .await
}

/// Merge the three rollout conditions into the node config status
///
/// # Errors
///
/// See [`update_status_with_retry`].
pub async fn commit_conditions<T>(
    store: &T,
    name: &str,
    set: &ConditionSet,
    backoff: &ExponentialBackoff,
) -> Result<bool, CommitError>
where
    T: StatusStore<NodeConfigStatus> + ?Sized,
{
    let now = Utc::now();
    update_status_with_retry(store, "Node", name, backoff, |status: &mut NodeConfigStatus| {
        for condition in set.iter() {
            set_condition(status.conditions_mut(), condition.clone(), now);
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::reconciler::conditions::{derive, Outcome};
    use crate::crd::{Condition, ConditionStatus};
    use crate::store::InMemoryCluster;

    #[tokio::test]
    async fn test_first_commit_writes_once() {
        let cluster = InMemoryCluster::new().with_target("Default");
        let changed = commit_conditions(
            &cluster,
            "cluster",
            &derive(Outcome::Converged),
            &ExponentialBackoff::immediate(4),
        )
        .await
        .unwrap();

        assert!(changed);
        assert_eq!(cluster.node_status_writes(), 1);
        assert_eq!(cluster.node_status().unwrap().conditions().len(), 3);
    }

    #[tokio::test]
    async fn test_unchanged_commit_skips_write() {
        let cluster = InMemoryCluster::new().with_target("Default");
        let set = derive(Outcome::Progressing);
        let backoff = ExponentialBackoff::immediate(4);

        commit_conditions(&cluster, "cluster", &set, &backoff).await.unwrap();
        let changed = commit_conditions(&cluster, "cluster", &set, &backoff).await.unwrap();

        assert!(!changed);
        assert_eq!(cluster.node_status_writes(), 1);
    }

    #[tokio::test]
    async fn test_conflicts_exhaust_after_every_step() {
        let cluster = InMemoryCluster::new().with_target("Default");
        cluster.simulate_concurrent_writer(10, Condition::new("Foreign", ConditionStatus::True));

        let err = commit_conditions(
            &cluster,
            "cluster",
            &derive(Outcome::Converged),
            &ExponentialBackoff::immediate(3),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CommitError::ConflictExhausted { attempts: 3, .. }));
        assert_eq!(cluster.node_status_writes(), 0);
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let cluster = InMemoryCluster::new();
        let err = commit_conditions(
            &cluster,
            "cluster",
            &derive(Outcome::Converged),
            &ExponentialBackoff::immediate(2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CommitError::NotFound { kind: "Node", .. }));
    }
}
