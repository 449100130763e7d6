//! # Controller
//!
//! Core controller modules for the Latency Profile Controller.
//!
//! - `backoff`: conflict retry and error requeue schedules
//! - `reconciler`: profile resolution, convergence evaluation and status commit
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod reconciler;
pub mod server;
