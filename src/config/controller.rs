//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::controller::backoff::ExponentialBackoff;
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Name of the node-config resource whose status is published
    pub target_name: String,
    /// Name of the kube-controller-manager operator resource
    /// Source of node revisions and sink of the operational condition
    pub operator_name: String,
    /// Namespace of the per-revision config maps
    pub target_namespace: String,
    /// Config map base name, revisions are looked up as `<base>-<revision>`
    pub config_map_base_name: String,
    /// Config map key holding the JSON controller-manager config
    pub config_map_key: String,
    /// Periodic resync interval (seconds)
    pub resync_interval_secs: u64,
    /// Status write attempts before a conflict is reported as exhausted
    pub conflict_retry_steps: u32,
    /// First conflict retry delay (milliseconds)
    pub conflict_retry_initial_ms: u64,
    /// Growth factor between conflict retries
    pub conflict_retry_factor: u32,
    /// Cap on a single conflict retry delay (milliseconds)
    pub conflict_retry_max_ms: u64,
    /// Smallest requeue after a failed reconciliation (seconds)
    pub error_requeue_min_secs: u64,
    /// Largest requeue after a failed reconciliation (seconds)
    pub error_requeue_max_secs: u64,
    /// HTTP port for metrics and probes
    pub metrics_port: u16,
    /// How long to wait for the HTTP server to come up (seconds)
    pub server_startup_timeout_secs: u64,
    /// Readiness poll interval while waiting for the HTTP server (milliseconds)
    pub server_poll_interval_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            target_name: DEFAULT_TARGET_NAME.to_string(),
            operator_name: DEFAULT_OPERATOR_NAME.to_string(),
            target_namespace: DEFAULT_TARGET_NAMESPACE.to_string(),
            config_map_base_name: DEFAULT_CONFIG_MAP_BASE_NAME.to_string(),
            config_map_key: DEFAULT_CONFIG_MAP_KEY.to_string(),
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL_SECS,
            conflict_retry_steps: DEFAULT_CONFLICT_RETRY_STEPS,
            conflict_retry_initial_ms: DEFAULT_CONFLICT_RETRY_INITIAL_MS,
            conflict_retry_factor: DEFAULT_CONFLICT_RETRY_FACTOR,
            conflict_retry_max_ms: DEFAULT_CONFLICT_RETRY_MAX_MS,
            error_requeue_min_secs: DEFAULT_ERROR_REQUEUE_MIN_SECS,
            error_requeue_max_secs: DEFAULT_ERROR_REQUEUE_MAX_SECS,
            metrics_port: DEFAULT_METRICS_PORT,
            server_startup_timeout_secs: DEFAULT_SERVER_STARTUP_TIMEOUT_SECS,
            server_poll_interval_ms: DEFAULT_SERVER_POLL_INTERVAL_MS,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            target_name: lookup("TARGET_NAME").unwrap_or(defaults.target_name),
            operator_name: lookup("OPERATOR_NAME").unwrap_or(defaults.operator_name),
            target_namespace: lookup("TARGET_NAMESPACE").unwrap_or(defaults.target_namespace),
            config_map_base_name: lookup("CONFIG_MAP_BASE_NAME")
                .unwrap_or(defaults.config_map_base_name),
            config_map_key: lookup("CONFIG_MAP_KEY").unwrap_or(defaults.config_map_key),
            resync_interval_secs: parsed_or(
                &lookup,
                "RESYNC_INTERVAL_SECS",
                defaults.resync_interval_secs,
            ),
            conflict_retry_steps: parsed_or(
                &lookup,
                "CONFLICT_RETRY_STEPS",
                defaults.conflict_retry_steps,
            ),
            conflict_retry_initial_ms: parsed_or(
                &lookup,
                "CONFLICT_RETRY_INITIAL_MS",
                defaults.conflict_retry_initial_ms,
            ),
            conflict_retry_factor: parsed_or(
                &lookup,
                "CONFLICT_RETRY_FACTOR",
                defaults.conflict_retry_factor,
            ),
            conflict_retry_max_ms: parsed_or(
                &lookup,
                "CONFLICT_RETRY_MAX_MS",
                defaults.conflict_retry_max_ms,
            ),
            error_requeue_min_secs: parsed_or(
                &lookup,
                "ERROR_REQUEUE_MIN_SECS",
                defaults.error_requeue_min_secs,
            ),
            error_requeue_max_secs: parsed_or(
                &lookup,
                "ERROR_REQUEUE_MAX_SECS",
                defaults.error_requeue_max_secs,
            ),
            metrics_port: parsed_or(&lookup, "METRICS_PORT", defaults.metrics_port),
            server_startup_timeout_secs: parsed_or(
                &lookup,
                "SERVER_STARTUP_TIMEOUT_SECS",
                defaults.server_startup_timeout_secs,
            ),
            server_poll_interval_ms: parsed_or(
                &lookup,
                "SERVER_POLL_INTERVAL_MS",
                defaults.server_poll_interval_ms,
            ),
        }
    }

    /// Get periodic resync duration
    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Backoff schedule for optimistic status writes
    #[must_use]
    pub fn conflict_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            self.conflict_retry_steps,
            Duration::from_millis(self.conflict_retry_initial_ms),
            self.conflict_retry_factor,
            Duration::from_millis(self.conflict_retry_max_ms),
        )
    }
}

/// Read and parse a key or return the default value
fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
