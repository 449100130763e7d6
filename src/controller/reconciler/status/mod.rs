//! # Status Management
//!
//! Merges conditions into status documents and commits them with
//! optimistic concurrency.
//!
//! - `merge`: pure condition merge (transition time moves only on status change)
//! - `commit`: generic read, mutate, compare, conditional-write retry loop
//! - `operator`: the controller's own health condition on the operator resource

mod commit;
mod merge;
mod operator;

pub use commit::{commit_conditions, update_status_with_retry, CommitError};
pub use merge::{find_condition, format_transition_time, set_condition};
pub use operator::{report_degraded, REASON_ERROR};
