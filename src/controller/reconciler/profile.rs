//! # Profile Resolution
//!
//! Maps the worker latency profile selected on the cluster to the
//! kube-controller-manager arguments it implies.
//!
//! | Profile                       | `node-monitor-grace-period` |
//! |-------------------------------|-----------------------------|
//! | (empty)                       | no expectation              |
//! | `Default`                     | `40s`                       |
//! | `MediumUpdateAverageReaction` | `2m0s`                      |
//! | `LowUpdateSlowReaction`       | `5m0s`                      |

use crate::constants::NODE_MONITOR_GRACE_PERIOD_ARGUMENT;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("unknown worker latency profile '{0}'")]
    Unknown(String),
}

/// Worker latency profile selected on the cluster node config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileSelector {
    Unset,
    Default,
    Medium,
    Low,
}

impl ProfileSelector {
    /// Wire value as it appears in `spec.workerLatencyProfile`
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileSelector::Unset => "",
            ProfileSelector::Default => "Default",
            ProfileSelector::Medium => "MediumUpdateAverageReaction",
            ProfileSelector::Low => "LowUpdateSlowReaction",
        }
    }

    /// `node-monitor-grace-period` for this profile, `None` when unset
    #[must_use]
    pub fn node_monitor_grace_period(&self) -> Option<&'static str> {
        match self {
            ProfileSelector::Unset => None,
            ProfileSelector::Default => Some("40s"),
            ProfileSelector::Medium => Some("2m0s"),
            ProfileSelector::Low => Some("5m0s"),
        }
    }
}

impl FromStr for ProfileSelector {
    type Err = ProfileError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "" => Ok(ProfileSelector::Unset),
            "Default" => Ok(ProfileSelector::Default),
            "MediumUpdateAverageReaction" => Ok(ProfileSelector::Medium),
            "LowUpdateSlowReaction" => Ok(ProfileSelector::Low),
            other => Err(ProfileError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for ProfileSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSelector::Unset => f.write_str("<unset>"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Argument name to the exact value every replica must carry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedSettings(BTreeMap<String, String>);

impl ExpectedSettings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExpectedSettings {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// What a profile asks of the fleet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No profile is set, there is nothing to converge on
    ProfileEmpty,
    Expected(ExpectedSettings),
}

#[must_use]
pub fn resolve(selector: ProfileSelector) -> Resolution {
    match selector.node_monitor_grace_period() {
        None => Resolution::ProfileEmpty,
        Some(period) => Resolution::Expected(ExpectedSettings::from_iter([(
            NODE_MONITOR_GRACE_PERIOD_ARGUMENT,
            period,
        )])),
    }
}

/// Parse and resolve the raw profile string
///
/// # Errors
///
/// `ProfileError::Unknown` for any value outside the known set.
pub fn resolve_raw(raw: &str) -> Result<Resolution, ProfileError> {
    raw.parse::<ProfileSelector>().map(resolve)
}
