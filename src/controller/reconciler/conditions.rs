//! # Condition Derivation
//!
//! Turns an evaluation outcome into the three rollout conditions published
//! on the node config status.
//!
//! | Outcome      | Degraded | Progressing | Completed | Reason                   |
//! |--------------|----------|-------------|-----------|--------------------------|
//! | ProfileEmpty | False    | False       | False     | `ProfileEmpty`           |
//! | Converged    | False    | False       | True      | `ProfileUpdated`         |
//! | Progressing  | False    | True        | False     | `ProfileUpdateTriggered` |

use crate::crd::{Condition, ConditionStatus};
use std::fmt;

pub const REASON_PROFILE_EMPTY: &str = "ProfileEmpty";
pub const REASON_PROFILE_UPDATED: &str = "ProfileUpdated";
pub const REASON_PROFILE_UPDATE_TRIGGERED: &str = "ProfileUpdateTriggered";

pub const MESSAGE_PROFILE_EMPTY: &str = "worker latency profile not set on cluster";
pub const MESSAGE_ROLLOUT_COMPLETE: &str =
    "all kube-controller-manager(s) have updated latency profile";
pub const MESSAGE_ROLLOUT_PROGRESSING: &str =
    "kube-controller-manager(s) are updating latency profile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Degraded,
    Progressing,
    Completed,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 3] = [
        ConditionKind::Degraded,
        ConditionKind::Progressing,
        ConditionKind::Completed,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Degraded => "KubeControllerManagerDegraded",
            ConditionKind::Progressing => "KubeControllerManagerProgressing",
            ConditionKind::Completed => "KubeControllerManagerComplete",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one evaluation of the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ProfileEmpty,
    Converged,
    Progressing,
}

impl Outcome {
    #[must_use]
    pub fn from_converged(converged: bool) -> Self {
        if converged {
            Outcome::Converged
        } else {
            Outcome::Progressing
        }
    }

    /// Value exported on the fleet convergence gauge
    #[must_use]
    pub fn gauge_value(&self) -> i64 {
        match self {
            Outcome::ProfileEmpty => -1,
            Outcome::Progressing => 0,
            Outcome::Converged => 1,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::ProfileEmpty => "ProfileEmpty",
            Outcome::Converged => "Converged",
            Outcome::Progressing => "Progressing",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three rollout conditions, one per kind, without transition times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    pub degraded: Condition,
    pub progressing: Condition,
    pub completed: Condition,
}

impl ConditionSet {
    #[must_use]
    pub fn get(&self, kind: ConditionKind) -> &Condition {
        match kind {
            ConditionKind::Degraded => &self.degraded,
            ConditionKind::Progressing => &self.progressing,
            ConditionKind::Completed => &self.completed,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        ConditionKind::ALL.into_iter().map(move |kind| self.get(kind))
    }
}

/// Condition with reason and message set; an empty message is kept as `""`
fn condition(kind: ConditionKind, status: bool, reason: &str, message: &str) -> Condition {
    Condition::new(kind.as_str(), ConditionStatus::from(status))
        .with_reason(reason)
        .with_message(message)
}

#[must_use]
pub fn derive(outcome: Outcome) -> ConditionSet {
    match outcome {
        Outcome::ProfileEmpty => ConditionSet {
            degraded: condition(
                ConditionKind::Degraded,
                false,
                REASON_PROFILE_EMPTY,
                MESSAGE_PROFILE_EMPTY,
            ),
            progressing: condition(ConditionKind::Progressing, false, REASON_PROFILE_EMPTY, ""),
            completed: condition(ConditionKind::Completed, false, REASON_PROFILE_EMPTY, ""),
        },
        Outcome::Converged => ConditionSet {
            degraded: condition(ConditionKind::Degraded, false, REASON_PROFILE_UPDATED, ""),
            progressing: condition(
                ConditionKind::Progressing,
                false,
                REASON_PROFILE_UPDATED,
                "",
            ),
            completed: condition(
                ConditionKind::Completed,
                true,
                REASON_PROFILE_UPDATED,
                MESSAGE_ROLLOUT_COMPLETE,
            ),
        },
        Outcome::Progressing => ConditionSet {
            degraded: condition(
                ConditionKind::Degraded,
                false,
                REASON_PROFILE_UPDATE_TRIGGERED,
                "",
            ),
            progressing: condition(
                ConditionKind::Progressing,
                true,
                REASON_PROFILE_UPDATE_TRIGGERED,
                MESSAGE_ROLLOUT_PROGRESSING,
            ),
            completed: condition(
                ConditionKind::Completed,
                false,
                REASON_PROFILE_UPDATE_TRIGGERED,
                "",
            ),
        },
    }
}
