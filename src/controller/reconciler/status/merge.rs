//! Condition merge.

use crate::crd::Condition;
use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 timestamp at second precision, e.g. `2024-05-01T10:00:00Z`
#[must_use]
pub fn format_transition_time(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[must_use]
pub fn find_condition<'a>(conditions: &'a [Condition], r#type: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == r#type)
}

/// Merge `new` into `conditions`
///
/// An absent type is appended. For an existing type the transition time is
/// moved to `now` only when the status changes; reason and message always
/// take the new values. When `new` carries its own transition time it is
/// used instead of `now`.
pub fn set_condition(conditions: &mut Vec<Condition>, new: Condition, now: DateTime<Utc>) {
    let transition_time = new
        .last_transition_time
        .clone()
        .unwrap_or_else(|| format_transition_time(now));

    let Some(existing) = conditions.iter_mut().find(|c| c.r#type == new.r#type) else {
        conditions.push(Condition {
            last_transition_time: Some(transition_time),
            ..new
        });
        return;
    };

    if existing.status != new.status {
        existing.status = new.status;
        existing.last_transition_time = Some(transition_time);
    }
    existing.reason = new.reason;
    existing.message = new.message;
}
