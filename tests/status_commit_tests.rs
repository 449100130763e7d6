//! # Status Commit Tests
//!
//! Condition merge and the optimistic write loop against the in-memory store.

mod common;

use common::*;
use latency_profile_controller::controller::backoff::ExponentialBackoff;
use latency_profile_controller::controller::reconciler::{
    commit_conditions, derive, update_status_with_retry, CommitError, ConditionKind, Outcome,
};
use latency_profile_controller::crd::{
    Condition, ConditionStatus, KubeControllerManagerStatus, NodeConfigStatus,
};
use latency_profile_controller::store::InMemoryCluster;

const SEEDED_TIME: &str = "2020-01-01T00:00:00Z";

fn seeded(kind: ConditionKind, status: ConditionStatus, reason: &str) -> Condition {
    Condition {
        last_transition_time: Some(SEEDED_TIME.to_string()),
        ..Condition::new(kind.as_str(), status).with_reason(reason)
    }
}

/// Target whose status already reports a progressing rollout
fn progressing_cluster() -> InMemoryCluster {
    let mut status = NodeConfigStatus::default();
    status.conditions_mut().extend([
        seeded(ConditionKind::Degraded, ConditionStatus::False, "ProfileUpdateTriggered"),
        seeded(ConditionKind::Progressing, ConditionStatus::True, "ProfileUpdateTriggered"),
        seeded(ConditionKind::Completed, ConditionStatus::False, "ProfileUpdateTriggered"),
    ]);
    InMemoryCluster::new()
        .with_target("Default")
        .with_target_status(status)
}

#[tokio::test]
async fn test_transition_time_moves_only_on_status_change() {
    let cluster = progressing_cluster();

    commit_conditions(
        &cluster,
        TARGET,
        &derive(Outcome::Converged),
        &ExponentialBackoff::immediate(4),
    )
    .await
    .unwrap();

    let degraded = node_condition(&cluster, ConditionKind::Degraded).unwrap();
    assert_eq!(degraded.last_transition_time.as_deref(), Some(SEEDED_TIME));
    assert_eq!(degraded.reason, "ProfileUpdated");

    for kind in [ConditionKind::Progressing, ConditionKind::Completed] {
        let condition = node_condition(&cluster, kind).unwrap();
        assert_ne!(condition.last_transition_time.as_deref(), Some(SEEDED_TIME));
        assert_eq!(condition.reason, "ProfileUpdated");
    }
    assert_eq!(
        node_statuses(&cluster),
        [
            Some(ConditionStatus::False),
            Some(ConditionStatus::False),
            Some(ConditionStatus::True)
        ]
    );
}

#[tokio::test]
async fn test_message_only_change_keeps_transition_time() {
    let cluster = progressing_cluster();

    // Same statuses as seeded; only reasons and messages differ
    let changed = commit_conditions(
        &cluster,
        TARGET,
        &derive(Outcome::Progressing),
        &ExponentialBackoff::immediate(4),
    )
    .await
    .unwrap();

    assert!(changed);
    let progressing = node_condition(&cluster, ConditionKind::Progressing).unwrap();
    assert_eq!(progressing.last_transition_time.as_deref(), Some(SEEDED_TIME));
    assert!(!progressing.message.is_empty());
}

#[tokio::test]
async fn test_conflict_is_retried_and_foreign_edit_survives() {
    let cluster = InMemoryCluster::new().with_target("Default");
    cluster.simulate_concurrent_writer(2, Condition::new("Foreign", ConditionStatus::True));

    let changed = commit_conditions(
        &cluster,
        TARGET,
        &derive(Outcome::Converged),
        &ExponentialBackoff::immediate(4),
    )
    .await
    .unwrap();

    assert!(changed);
    assert_eq!(cluster.node_status_writes(), 1);
    let status = cluster.node_status().unwrap();
    assert_eq!(status.conditions().len(), 4);
    assert!(status.conditions().iter().any(|c| c.r#type == "Foreign"));
}

#[tokio::test]
async fn test_conflicts_beyond_budget_are_reported() {
    let cluster = InMemoryCluster::new().with_target("Default");
    cluster.simulate_concurrent_writer(4, Condition::new("Foreign", ConditionStatus::True));

    let err = commit_conditions(
        &cluster,
        TARGET,
        &derive(Outcome::Converged),
        &ExponentialBackoff::immediate(4),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        CommitError::ConflictExhausted {
            kind: "Node",
            attempts: 4,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "gave up updating Node 'cluster' status after 4 conflicting attempts"
    );
    assert_eq!(cluster.node_status_writes(), 0);
}

#[tokio::test]
async fn test_generic_loop_updates_operator_status() {
    let cluster = InMemoryCluster::new().with_revisions(&[5, 5, 6]);
    let backoff = ExponentialBackoff::immediate(2);

    let mutate = |status: &mut KubeControllerManagerStatus| {
        status.latest_available_revision = Some(6);
    };
    assert!(update_status_with_retry(&cluster, "KubeControllerManager", TARGET, &backoff, mutate)
        .await
        .unwrap());
    assert!(!update_status_with_retry(&cluster, "KubeControllerManager", TARGET, &backoff, mutate)
        .await
        .unwrap());

    let status = cluster.operator_status().unwrap();
    assert_eq!(status.latest_available_revision, Some(6));
    assert_eq!(status.node_statuses.len(), 3);
    assert_eq!(cluster.operator_status_writes(), 1);
}

#[tokio::test]
async fn test_generic_loop_reports_missing_operator() {
    let cluster = InMemoryCluster::new();

    let err = update_status_with_retry(
        &cluster,
        "KubeControllerManager",
        TARGET,
        &ExponentialBackoff::immediate(2),
        |status: &mut KubeControllerManagerStatus| status.observed_generation = Some(1),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        CommitError::NotFound {
            kind: "KubeControllerManager",
            ..
        }
    ));
}
