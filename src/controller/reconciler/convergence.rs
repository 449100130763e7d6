//! # Convergence
//!
//! Decides whether every fetched snapshot carries the expected settings.

use crate::controller::reconciler::profile::ExpectedSettings;
use crate::controller::reconciler::snapshot::ConfigSnapshot;

/// A single setting passes when the argument is present and its first
/// value equals `expected` exactly. A present argument with no values passes.
fn setting_matches(snapshot: &ConfigSnapshot, name: &str, expected: &str) -> bool {
    match snapshot.argument(name) {
        None => false,
        Some(values) => values.first().map_or(true, |first| first == expected),
    }
}

/// True when every (setting, snapshot) pair passes
///
/// Stops at the first failing pair. With no snapshots the result is true.
#[must_use]
pub fn evaluate(expected: &ExpectedSettings, snapshots: &[ConfigSnapshot]) -> bool {
    snapshots.iter().all(|snapshot| {
        expected
            .iter()
            .all(|(name, value)| setting_matches(snapshot, name, value))
    })
}
