//! # Backoff
//!
//! Two backoff schedules are used by the controller:
//!
//! - [`ExponentialBackoff`] bounds the optimistic-concurrency retry loop of
//!   status writes. It is short lived (milliseconds) and has a fixed number of
//!   attempts, after which the conflict is reported as exhausted.
//! - [`FibonacciBackoff`] spaces out requeues of a failing reconciliation.
//!   It grows more slowly than exponential backoff and is reset on success.
//!
//! ## Usage
//!
//! ```rust
//! use latency_profile_controller::controller::backoff::FibonacciBackoff;
//!
//! let mut backoff = FibonacciBackoff::new(5, 60); // 5 seconds min, 60 seconds max
//! assert_eq!(backoff.next_backoff_seconds(), 5);
//! assert_eq!(backoff.next_backoff_seconds(), 5);
//! assert_eq!(backoff.next_backoff_seconds(), 10);
//! assert_eq!(backoff.next_backoff_seconds(), 15);
//! ```

use std::time::Duration;

/// Bounded exponential schedule for conflict retries
///
/// `steps` is the total number of attempts. The delay before retry `n`
/// (zero based) is `initial * factor^n`, capped at `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    steps: u32,
    initial: Duration,
    factor: u32,
    cap: Duration,
}

impl ExponentialBackoff {
    /// Create a schedule with `steps` attempts in total
    ///
    /// A value of zero is treated as a single attempt.
    #[must_use]
    pub fn new(steps: u32, initial: Duration, factor: u32, cap: Duration) -> Self {
        Self {
            steps: steps.max(1),
            initial,
            factor: factor.max(1),
            cap,
        }
    }

    /// Schedule with no delay between attempts, used by tests
    #[must_use]
    pub fn immediate(steps: u32) -> Self {
        Self::new(steps, Duration::ZERO, 1, Duration::ZERO)
    }

    /// Total number of attempts, including the first one
    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Delay to wait before retry number `retry` (zero based)
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let multiplier = self.factor.saturating_pow(retry);
        self.initial
            .checked_mul(multiplier)
            .map_or(self.cap, |delay| delay.min(self.cap))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        use crate::constants::*;
        Self::new(
            DEFAULT_CONFLICT_RETRY_STEPS,
            Duration::from_millis(DEFAULT_CONFLICT_RETRY_INITIAL_MS),
            DEFAULT_CONFLICT_RETRY_FACTOR,
            Duration::from_millis(DEFAULT_CONFLICT_RETRY_MAX_MS),
        )
    }
}

/// Fibonacci backoff calculator
///
/// Generates requeue delays in seconds following the Fibonacci sequence,
/// capped at a maximum. Each value is the sum of the previous two.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Minimum backoff value in seconds (for reset)
    min_secs: u64,
    /// Previous backoff value in seconds
    prev_secs: u64,
    /// Current backoff value in seconds
    current_secs: u64,
    /// Maximum backoff value in seconds
    max_secs: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff with minimum and maximum values in seconds
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            prev_secs: 0,
            current_secs: min_secs,
            max_secs,
        }
    }

    /// Get the next backoff in seconds and advance the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_secs;
        let next = self.prev_secs + self.current_secs;
        self.prev_secs = self.current_secs;
        self.current_secs = std::cmp::min(next, self.max_secs);
        result
    }

    /// Get the next backoff as a `Duration` and advance the sequence
    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.min_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_reference_schedule() {
        let backoff = ExponentialBackoff::default();
        assert_eq!(backoff.steps(), 4);
        assert_eq!(backoff.delay_for_retry(0), Duration::from_millis(10));
        assert_eq!(backoff.delay_for_retry(1), Duration::from_millis(50));
        assert_eq!(backoff.delay_for_retry(2), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let backoff = ExponentialBackoff::new(
            10,
            Duration::from_millis(10),
            5,
            Duration::from_millis(1_000),
        );
        assert_eq!(backoff.delay_for_retry(3), Duration::from_millis(1_000));
        // factor^retry overflows u32 here, the cap still applies
        assert_eq!(backoff.delay_for_retry(40), Duration::from_millis(1_000));
    }

    #[test]
    fn test_exponential_backoff_zero_steps_means_one_attempt() {
        assert_eq!(ExponentialBackoff::immediate(0).steps(), 1);
    }

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(5, 60);
        let sequence: Vec<u64> = (0..8).map(|_| backoff.next_backoff_seconds()).collect();
        assert_eq!(sequence, vec![5, 5, 10, 15, 25, 40, 60, 60]);
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(5, 60);
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();

        backoff.reset();

        assert_eq!(backoff.next_backoff(), Duration::from_secs(5));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(5));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
    }
}
