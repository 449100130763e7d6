//! # Reconciliation Logic
//!
//! One reconcile cycle:
//!
//! 1. Read the worker latency profile of the target (missing target: no-op)
//! 2. Resolve it to the expected controller-manager arguments
//! 3. If a profile is set, collect the distinct revisions the fleet runs and
//!    fetch one config snapshot per revision
//! 4. Evaluate convergence and derive the three rollout conditions
//! 5. Merge and commit them on the target status
//! 6. Report the cycle's own health on the operator status
//!
//! Any failure in steps 1 to 4 leaves the rollout conditions untouched.

use crate::controller::reconciler::conditions::{derive, Outcome};
use crate::controller::reconciler::convergence::evaluate;
use crate::controller::reconciler::profile::{
    resolve, ExpectedSettings, ProfileSelector, Resolution,
};
use crate::controller::reconciler::snapshot::{distinct_revisions, fetch_snapshots, RevisionId};
use crate::controller::reconciler::status::{commit_conditions, report_degraded};
use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::crd::NodeConfig;
use crate::observability;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// Read-only view of the fleet for one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetEvaluation {
    pub profile: ProfileSelector,
    /// Empty when no profile is set
    pub expected: ExpectedSettings,
    /// Distinct revisions, first-seen order; empty when no profile is set
    pub revisions: Vec<RevisionId>,
    pub outcome: Outcome,
}

/// Evaluate the fleet without writing anything
///
/// Returns `Ok(None)` when the target does not exist.
///
/// # Errors
///
/// Unknown profile, revision read, and snapshot lookup or decode failures.
pub async fn evaluate_fleet(ctx: &Reconciler) -> Result<Option<FleetEvaluation>, ReconcilerError> {
    let Some(raw) = ctx
        .store
        .get_profile(&ctx.config.target_name)
        .await
        .map_err(ReconcilerError::Store)?
    else {
        return Ok(None);
    };

    let profile: ProfileSelector = raw.parse()?;
    let expected = match resolve(profile) {
        Resolution::ProfileEmpty => {
            debug!("No worker latency profile set");
            return Ok(Some(FleetEvaluation {
                profile,
                expected: ExpectedSettings::default(),
                revisions: Vec::new(),
                outcome: Outcome::ProfileEmpty,
            }));
        }
        Resolution::Expected(expected) => expected,
    };

    let revisions = ctx
        .store
        .current_revisions(&ctx.config.operator_name)
        .await
        .map_err(ReconcilerError::Revisions)?;
    let revisions = distinct_revisions(revisions);
    debug!(
        profile = %profile,
        revisions = ?revisions,
        "Checking config snapshots of running revisions"
    );

    let snapshots =
        fetch_snapshots(ctx.store.as_ref(), ctx.snapshot_location(), &revisions).await?;
    let outcome = Outcome::from_converged(evaluate(&expected, &snapshots));

    Ok(Some(FleetEvaluation {
        profile,
        expected,
        revisions,
        outcome,
    }))
}

/// Evaluate the fleet and publish the rollout conditions
///
/// Returns the outcome, or `None` when the target does not exist.
///
/// # Errors
///
/// Evaluation failures (conditions are not touched) and commit failures.
pub async fn update_latency_profile_status(
    ctx: &Reconciler,
) -> Result<Option<Outcome>, ReconcilerError> {
    let Some(evaluation) = evaluate_fleet(ctx).await? else {
        debug!(
            resource.name = %ctx.config.target_name,
            "Node config not found, nothing to do"
        );
        return Ok(None);
    };

    let changed = commit_conditions(
        ctx.store.as_ref(),
        &ctx.config.target_name,
        &derive(evaluation.outcome),
        &ctx.conflict_backoff,
    )
    .await?;

    observability::set_fleet_converged(evaluation.outcome.gauge_value());
    if changed {
        info!(
            profile = %evaluation.profile,
            outcome = %evaluation.outcome,
            "Worker latency profile status updated"
        );
    }
    Ok(Some(evaluation.outcome))
}

/// Run a full cycle and report its health on the operator status
///
/// The operational condition is written whether or not the cycle failed.
/// A failure to write it wins over the cycle's own error.
///
/// # Errors
///
/// `ReconcilerError::OperatorStatus` when the health condition could not be
/// written, otherwise the cycle's error.
pub async fn sync(ctx: &Reconciler) -> Result<Option<Outcome>, ReconcilerError> {
    let result = update_latency_profile_status(ctx).await;
    let failure = result.as_ref().err().map(ToString::to_string);

    report_degraded(
        ctx.store.as_ref(),
        &ctx.config.operator_name,
        failure.as_deref(),
        &ctx.conflict_backoff,
    )
    .await
    .map_err(ReconcilerError::OperatorStatus)?;

    result
}

/// Main reconciliation function
///
/// The watched object only signals that something changed; the cycle always
/// reads fresh state through the store. Errors are handed to the error policy.
pub async fn reconcile(
    node: Arc<NodeConfig>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let name = node.metadata.name.as_deref().unwrap_or("unknown");
    if name != ctx.config.target_name {
        debug!(resource.name = name, "Ignoring node config that is not the target");
        return Ok(Action::await_change());
    }

    let span = tracing::info_span!("reconcile", resource.kind = "Node", resource.name = name);
    async move {
        let start = Instant::now();
        observability::increment_reconciliations();
        info!("🔄 Reconciling worker latency profile");

        let result = sync(&ctx).await;
        observability::observe_reconciliation_duration(start.elapsed().as_secs_f64());

        match result {
            Ok(outcome) => {
                ctx.reset_backoff(name);
                debug!(outcome = ?outcome, "Reconciliation finished");
                Ok(Action::requeue(ctx.config.resync_interval()))
            }
            Err(e) => {
                warn!(error = %e, "Reconciliation failed");
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
