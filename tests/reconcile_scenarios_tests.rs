//! # Reconcile Scenario Tests
//!
//! End-to-end cycles against the in-memory cluster:
//! - Profile unset, converged and progressing fleets
//! - Unknown profile and snapshot failures leave rollout conditions untouched
//! - The operational condition tracks every cycle
//! - Missing target is a no-op

mod common;

use common::*;
use latency_profile_controller::controller::reconciler::{
    sync, ConditionKind, Outcome, ReconcilerError, SnapshotError,
};
use latency_profile_controller::crd::ConditionStatus;
use latency_profile_controller::store::InMemoryCluster;
use std::collections::BTreeMap;
use std::sync::Arc;

const FALSE: Option<ConditionStatus> = Some(ConditionStatus::False);
const TRUE: Option<ConditionStatus> = Some(ConditionStatus::True);

fn reasons(cluster: &InMemoryCluster) -> Vec<String> {
    ConditionKind::ALL
        .iter()
        .filter_map(|kind| node_condition(cluster, *kind).map(|c| c.reason))
        .collect()
}

#[tokio::test]
async fn test_unset_profile_reports_profile_empty() {
    let cluster = cluster("", &[1, 1, 1], &[]);

    let outcome = sync(&reconciler(&cluster)).await.unwrap();

    assert_eq!(outcome, Some(Outcome::ProfileEmpty));
    assert_eq!(node_statuses(&cluster), [FALSE, FALSE, FALSE]);
    assert_eq!(reasons(&cluster), vec!["ProfileEmpty"; 3]);
    assert_eq!(
        node_condition(&cluster, ConditionKind::Degraded)
            .unwrap()
            .message,
        "worker latency profile not set on cluster"
    );
    assert_eq!(cluster.snapshot_lookups(), 0);
}

#[tokio::test]
async fn test_default_profile_on_converged_fleet_is_complete() {
    let cluster = cluster("Default", &[4, 5, 5], &[(4, "40s"), (5, "40s")]);

    let outcome = sync(&reconciler(&cluster)).await.unwrap();

    assert_eq!(outcome, Some(Outcome::Converged));
    assert_eq!(node_statuses(&cluster), [FALSE, FALSE, TRUE]);
    assert_eq!(reasons(&cluster), vec!["ProfileUpdated"; 3]);
    assert_eq!(cluster.snapshot_lookups(), 2);
}

#[tokio::test]
async fn test_medium_profile_with_stale_revision_is_progressing() {
    let cluster = cluster(
        "MediumUpdateAverageReaction",
        &[6, 7],
        &[(6, "40s"), (7, "2m0s")],
    );

    let outcome = sync(&reconciler(&cluster)).await.unwrap();

    assert_eq!(outcome, Some(Outcome::Progressing));
    assert_eq!(node_statuses(&cluster), [FALSE, TRUE, FALSE]);
    assert_eq!(reasons(&cluster), vec!["ProfileUpdateTriggered"; 3]);
}

#[tokio::test]
async fn test_rollout_finishing_moves_from_progressing_to_complete() {
    let cluster = cluster("LowUpdateSlowReaction", &[2, 3], &[(2, "2m0s"), (3, "5m0s")]);
    let ctx = reconciler(&cluster);

    sync(&ctx).await.unwrap();
    assert_eq!(node_statuses(&cluster), [FALSE, TRUE, FALSE]);

    // The old revision is rolled out of the fleet
    cluster.set_revisions(&[3, 3]);
    let outcome = sync(&ctx).await.unwrap();

    assert_eq!(outcome, Some(Outcome::Converged));
    assert_eq!(node_statuses(&cluster), [FALSE, FALSE, TRUE]);
}

#[tokio::test]
async fn test_unknown_profile_preserves_conditions_and_reports_degraded() {
    let cluster = cluster("Default", &[1], &[(1, "40s")]);
    let ctx = reconciler(&cluster);
    sync(&ctx).await.unwrap();
    let before = cluster.node_status().unwrap();
    let writes_before = cluster.node_status_writes();

    cluster.set_profile("BogusValue");
    let err = sync(&ctx).await.unwrap_err();

    assert!(matches!(err, ReconcilerError::UnknownProfile(_)));
    assert_eq!(cluster.node_status().unwrap(), before);
    assert_eq!(cluster.node_status_writes(), writes_before);

    let degraded = controller_degraded(&cluster).unwrap();
    assert_eq!(degraded.status, ConditionStatus::True);
    assert_eq!(degraded.reason, "Error");
    assert!(degraded.message.contains("BogusValue"));
}

#[tokio::test]
async fn test_missing_snapshot_aborts_cycle() {
    let cluster = cluster("Default", &[1, 2], &[(1, "40s")]);

    let err = sync(&reconciler(&cluster)).await.unwrap_err();

    assert!(matches!(
        err,
        ReconcilerError::Snapshot(SnapshotError::NotFound { .. })
    ));
    assert_eq!(cluster.node_status_writes(), 0);
    assert!(cluster.node_status().unwrap().conditions().is_empty());
    assert_eq!(
        controller_degraded(&cluster).unwrap().status,
        ConditionStatus::True
    );
}

fn cluster_with_raw_snapshot(data: BTreeMap<String, String>) -> Arc<InMemoryCluster> {
    Arc::new(
        InMemoryCluster::new()
            .with_target("Default")
            .with_revisions(&[1])
            .with_document(NAMESPACE, "config-1", data),
    )
}

#[tokio::test]
async fn test_undecodable_snapshot_aborts_cycle() {
    let cluster = cluster_with_raw_snapshot(BTreeMap::from([(
        "config.yaml".to_string(),
        "{not json".to_string(),
    )]));

    let err = sync(&reconciler(&cluster)).await.unwrap_err();

    assert!(matches!(
        err,
        ReconcilerError::Snapshot(SnapshotError::Decode { .. })
    ));
    assert_eq!(cluster.node_status_writes(), 0);
}

#[tokio::test]
async fn test_snapshot_without_config_key_aborts_cycle() {
    let cluster = cluster_with_raw_snapshot(BTreeMap::from([(
        "other.yaml".to_string(),
        "{}".to_string(),
    )]));

    let err = sync(&reconciler(&cluster)).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "could not find config.yaml in config-1 config map from openshift-kube-controller-manager namespace"
    );
    assert_eq!(
        controller_degraded(&cluster).unwrap().message,
        err.to_string()
    );
}

#[tokio::test]
async fn test_recovery_clears_operational_condition() {
    let cluster = cluster("Default", &[1], &[]);
    let ctx = reconciler(&cluster);

    assert!(sync(&ctx).await.is_err());
    assert_eq!(
        controller_degraded(&cluster).unwrap().status,
        ConditionStatus::True
    );

    cluster.put_snapshot(NAMESPACE, "config-1", &grace("40s"));
    sync(&ctx).await.unwrap();

    let degraded = controller_degraded(&cluster).unwrap();
    assert_eq!(degraded.status, ConditionStatus::False);
    assert_eq!(degraded.message, "");
    assert_eq!(node_statuses(&cluster), [FALSE, FALSE, TRUE]);
}

#[tokio::test]
async fn test_missing_target_is_a_no_op() {
    let cluster = cluster("Default", &[1], &[(1, "40s")]);
    cluster.remove_target();

    let outcome = sync(&reconciler(&cluster)).await.unwrap();

    assert_eq!(outcome, None);
    assert_eq!(cluster.node_status_writes(), 0);
    assert_eq!(cluster.snapshot_lookups(), 0);
    assert_eq!(
        controller_degraded(&cluster).unwrap().status,
        ConditionStatus::False
    );
}

#[tokio::test]
async fn test_repeated_cycles_do_not_rewrite_status() {
    let cluster = cluster("Default", &[1, 1], &[(1, "40s")]);
    let ctx = reconciler(&cluster);

    sync(&ctx).await.unwrap();
    let status = cluster.node_status().unwrap();
    sync(&ctx).await.unwrap();
    sync(&ctx).await.unwrap();

    assert_eq!(cluster.node_status_writes(), 1);
    assert_eq!(cluster.operator_status_writes(), 1);
    assert_eq!(cluster.node_status().unwrap(), status);
}

#[tokio::test]
async fn test_missing_operator_resource_surfaces_operator_status_error() {
    let cluster = Arc::new(InMemoryCluster::new().with_target(""));

    let err = sync(&reconciler(&cluster)).await.unwrap_err();

    assert!(matches!(err, ReconcilerError::OperatorStatus(_)));
    // The rollout conditions were still published before the health write failed
    assert_eq!(node_statuses(&cluster), [FALSE, FALSE, FALSE]);
}
