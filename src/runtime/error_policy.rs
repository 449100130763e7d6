//! # Error Policy
//!
//! Requeue decisions for failed reconcile cycles.

use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError};
use crate::crd::NodeConfig;
use crate::observability;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Handle reconciliation errors with Fibonacci backoff
///
/// Backoff state is tracked per resource name and reset by the next
/// successful cycle.
pub fn handle_reconciliation_error(
    obj: Arc<NodeConfig>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.metadata.name.as_deref().unwrap_or("unknown");

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = name,
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}: {}", name, error);
    observability::increment_reconciliation_errors();

    let (backoff_seconds, error_count) = next_requeue(&ctx, name);

    info!(
        "🔄 Retrying with Fibonacci backoff: {}s (error count: {})",
        backoff_seconds, error_count
    );
    Action::requeue(Duration::from_secs(backoff_seconds))
}

/// Advance the backoff of `name`, returning the delay and the error count
fn next_requeue(ctx: &Reconciler, name: &str) -> (u64, u32) {
    match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(name.to_string()).or_insert_with(|| {
                BackoffState::new(
                    ctx.config.error_requeue_min_secs,
                    ctx.config.error_requeue_max_secs,
                )
            });
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!("Failed to lock backoff_states: {}, using default backoff", e);
            (ctx.config.error_requeue_max_secs, 0)
        }
    }
}
