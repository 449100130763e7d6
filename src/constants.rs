//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Name of the singleton node-config resource carrying the latency profile
pub const DEFAULT_TARGET_NAME: &str = "cluster";

/// Name of the kube-controller-manager operator resource carrying node revisions
pub const DEFAULT_OPERATOR_NAME: &str = "cluster";

/// Namespace holding the per-revision kube-controller-manager config maps
pub const DEFAULT_TARGET_NAMESPACE: &str = "openshift-kube-controller-manager";

/// Base name of the per-revision config maps (`config-<revision>`)
pub const DEFAULT_CONFIG_MAP_BASE_NAME: &str = "config";

/// Key inside the config map holding the JSON encoded controller-manager config
pub const DEFAULT_CONFIG_MAP_KEY: &str = "config.yaml";

/// Extended argument the latency profile drives
pub const NODE_MONITOR_GRACE_PERIOD_ARGUMENT: &str = "node-monitor-grace-period";

/// Field manager used for status patches
pub const FIELD_MANAGER: &str = "latency-profile-controller";

/// Type of the operational condition reported on the operator resource
pub const CONTROLLER_DEGRADED_CONDITION: &str = "LatencyProfileControllerDegraded";

/// Periodic resync interval (seconds)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;

/// Number of status write attempts before giving up on conflicts
pub const DEFAULT_CONFLICT_RETRY_STEPS: u32 = 4;

/// Delay before the first conflict retry (milliseconds)
pub const DEFAULT_CONFLICT_RETRY_INITIAL_MS: u64 = 10;

/// Multiplier applied to the conflict retry delay after each attempt
pub const DEFAULT_CONFLICT_RETRY_FACTOR: u32 = 5;

/// Upper bound for a single conflict retry delay (milliseconds)
pub const DEFAULT_CONFLICT_RETRY_MAX_MS: u64 = 1_000;

/// Smallest requeue delay after a failed reconciliation (seconds)
pub const DEFAULT_ERROR_REQUEUE_MIN_SECS: u64 = 5;

/// Largest requeue delay after a failed reconciliation (seconds)
pub const DEFAULT_ERROR_REQUEUE_MAX_SECS: u64 = 300;

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;
