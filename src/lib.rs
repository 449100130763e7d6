//! Latency Profile Controller Library
//!
//! Reports whether the kube-controller-manager fleet has picked up the
//! cluster's worker latency profile.
//!
//! ## Quick Start
//!
//! ```rust
//! use latency_profile_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod runtime;
pub mod store;
