//! # Custom Resource Definitions
//!
//! CRD types read and written by the Latency Profile Controller.
//!
//! ## Module Structure
//!
//! - `node.rs` - Cluster node config carrying the worker latency profile
//! - `operator.rs` - kube-controller-manager operator resource (node revisions)
//! - `status.rs` - Condition types shared by both resources

mod node;
mod operator;
mod status;

// Re-export all public types
pub use node::{Node, NodeConfig, NodeConfigSpec, NodeConfigStatus, WorkerLatencyProfileStatus};
pub use operator::{
    KubeControllerManager, KubeControllerManagerSpec, KubeControllerManagerStatus,
    NodeRevisionStatus,
};
pub use status::{Condition, ConditionStatus};
