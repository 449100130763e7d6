//! Operational health condition on the kube-controller-manager operator status.

use crate::constants::CONTROLLER_DEGRADED_CONDITION;
use crate::controller::backoff::ExponentialBackoff;
use crate::controller::reconciler::status::commit::{update_status_with_retry, CommitError};
use crate::controller::reconciler::status::merge::set_condition;
use crate::crd::{Condition, ConditionStatus, KubeControllerManagerStatus};
use crate::store::StatusStore;
use chrono::Utc;

pub const REASON_ERROR: &str = "Error";

/// Condition describing whether the last cycle failed
#[must_use]
pub fn degraded_condition(failure: Option<&str>) -> Condition {
    match failure {
        Some(message) => Condition::new(CONTROLLER_DEGRADED_CONDITION, ConditionStatus::True)
            .with_reason(REASON_ERROR)
            .with_message(message),
        None => Condition::new(CONTROLLER_DEGRADED_CONDITION, ConditionStatus::False),
    }
}

/// Set `LatencyProfileControllerDegraded` on the operator status
///
/// True with reason `Error` and the failure text as message when `failure`
/// is set, False otherwise. Goes through the same retry loop as the
/// rollout conditions, so an unchanged condition is not rewritten.
///
/// # Errors
///
/// See [`update_status_with_retry`].
pub async fn report_degraded<T>(
    store: &T,
    name: &str,
    failure: Option<&str>,
    backoff: &ExponentialBackoff,
) -> Result<bool, CommitError>
where
    T: StatusStore<KubeControllerManagerStatus> + ?Sized,
{
    let condition = degraded_condition(failure);
    let now = Utc::now();
    update_status_with_retry(
        store,
        "KubeControllerManager",
        name,
        backoff,
        |status: &mut KubeControllerManagerStatus| {
            set_condition(&mut status.conditions, condition.clone(), now);
        },
    )
    .await
}
