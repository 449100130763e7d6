//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `latency_profile_reconciliations_total` - Total number of reconcile cycles
//! - `latency_profile_reconciliation_errors_total` - Total number of failed cycles
//! - `latency_profile_reconciliation_duration_seconds` - Duration of reconcile cycles
//! - `latency_profile_snapshot_lookups_total` - Per-revision snapshot lookups by result
//! - `latency_profile_status_writes_total` - Status writes by resource kind
//! - `latency_profile_status_conflicts_total` - Stale-token write rejections by resource kind
//! - `latency_profile_fleet_converged` - 1 converged, 0 progressing, -1 no profile set

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, IntGauge, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "latency_profile_reconciliations_total",
        "Total number of reconcile cycles",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "latency_profile_reconciliation_errors_total",
        "Total number of reconcile cycles that ended in an error",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "latency_profile_reconciliation_duration_seconds",
            "Duration of reconcile cycles in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static SNAPSHOT_LOOKUPS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "latency_profile_snapshot_lookups_total",
            "Total number of per-revision config snapshot lookups by result",
        ),
        &["result"],
    )
    .expect("Failed to create SNAPSHOT_LOOKUPS_TOTAL metric - this should never happen")
});

static STATUS_WRITES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "latency_profile_status_writes_total",
            "Total number of accepted status writes by resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create STATUS_WRITES_TOTAL metric - this should never happen")
});

static STATUS_CONFLICTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "latency_profile_status_conflicts_total",
            "Total number of status writes rejected for a stale resource version",
        ),
        &["kind"],
    )
    .expect("Failed to create STATUS_CONFLICTS_TOTAL metric - this should never happen")
});

static FLEET_CONVERGED: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "latency_profile_fleet_converged",
        "Fleet convergence on the expected latency profile (1 converged, 0 progressing, -1 no profile)",
    )
    .expect("Failed to create FLEET_CONVERGED metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(SNAPSHOT_LOOKUPS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STATUS_WRITES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STATUS_CONFLICTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FLEET_CONVERGED.clone()))?;
    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

/// Record one snapshot lookup; `result` is "found", "missing" or "error"
pub fn increment_snapshot_lookups(result: &str) {
    SNAPSHOT_LOOKUPS_TOTAL.with_label_values(&[result]).inc();
}

pub fn increment_status_writes(kind: &str) {
    STATUS_WRITES_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_status_conflicts(kind: &str) {
    STATUS_CONFLICTS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn set_fleet_converged(value: i64) {
    FLEET_CONVERGED.set(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_increment_reconciliations() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        assert_eq!(RECONCILIATIONS_TOTAL.get(), before + 1u64);
    }

    #[test]
    fn test_increment_reconciliation_errors() {
        let before = RECONCILIATION_ERRORS_TOTAL.get();
        increment_reconciliation_errors();
        assert_eq!(RECONCILIATION_ERRORS_TOTAL.get(), before + 1u64);
    }

    #[test]
    fn test_observe_reconciliation_duration() {
        let before = RECONCILIATION_DURATION.get_sample_count();
        observe_reconciliation_duration(0.25);
        assert_eq!(RECONCILIATION_DURATION.get_sample_count(), before + 1);
    }

    #[test]
    fn test_labelled_counters() {
        let before = STATUS_CONFLICTS_TOTAL.with_label_values(&["Node"]).get();
        increment_status_conflicts("Node");
        assert_eq!(
            STATUS_CONFLICTS_TOTAL.with_label_values(&["Node"]).get(),
            before + 1
        );

        let before = SNAPSHOT_LOOKUPS_TOTAL.with_label_values(&["missing"]).get();
        increment_snapshot_lookups("missing");
        assert_eq!(
            SNAPSHOT_LOOKUPS_TOTAL.with_label_values(&["missing"]).get(),
            before + 1
        );
    }
}
