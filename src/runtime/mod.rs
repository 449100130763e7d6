//! # Runtime
//!
//! Controller startup, the watch loop and the error policy.
//!
//! - `initialization`: rustls, tracing, metrics, HTTP server, client and reconciler setup
//! - `watch_loop`: kube-runtime controller over the node config and its inputs
//! - `error_policy`: per-resource Fibonacci requeue after failed cycles

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

pub use initialization::{initialize, InitializationResult};
pub use watch_loop::run_watch_loop;
