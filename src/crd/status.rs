//! # Conditions
//!
//! Status condition types shared by the node-config and operator resources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a condition (True, False, Unknown)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,
    /// Last time the status changed (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    /// Machine readable reason for the condition, always serialized
    #[serde(default)]
    pub reason: String,
    /// Message describing the condition, always serialized (may be empty)
    #[serde(default)]
    pub message: String,
}

impl Condition {
    /// Condition without a transition time, ready to be merged into a status
    pub fn new(r#type: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            r#type: r#type.into(),
            status,
            last_transition_time: None,
            reason: String::new(),
            message: String::new(),
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_wire_format() {
        let condition = Condition::new("KubeControllerManagerComplete", ConditionStatus::True)
            .with_reason("ProfileUpdated");
        let json = serde_json::to_value(&condition).unwrap();

        assert_eq!(json["type"], "KubeControllerManagerComplete");
        assert_eq!(json["status"], "True");
        assert_eq!(json["reason"], "ProfileUpdated");
        assert!(json.get("lastTransitionTime").is_none());
        assert_eq!(json["message"], "");
    }

    #[test]
    fn test_condition_without_reason_or_message_decodes_empty() {
        let condition: Condition = serde_json::from_value(serde_json::json!({
            "type": "LatencyProfileControllerDegraded",
            "status": "False",
        }))
        .unwrap();

        assert_eq!(condition.reason, "");
        assert_eq!(condition.message, "");
    }

    #[test]
    fn test_condition_status_from_bool() {
        assert_eq!(ConditionStatus::from(true), ConditionStatus::True);
        assert_eq!(ConditionStatus::from(false), ConditionStatus::False);
        assert_eq!(ConditionStatus::default(), ConditionStatus::Unknown);
    }
}
