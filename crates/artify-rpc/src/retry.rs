//! Backoff schedule for retrying a single RPC call.
//!
//! Retries never outlive the caller's budget: [`HttpTransport`] stops
//! retrying once the next pause would run past the deadline of the call,
//! so a transient failure is recovered inside one chunk's timeout or not at
//! all.
//!
//! [`HttpTransport`]: crate::http::HttpTransport

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Pause before the first retry. Doubles for each further retry.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(4),
        }
    }
}

impl RetryConfig {
    /// Pause before retry number `attempt` (1-based), or `None` once the
    /// retries are used up.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        Some(self.initial_backoff.saturating_mul(factor).min(self.max_backoff))
    }

    /// Time spent sleeping if every retry is used.
    pub fn total_backoff(&self) -> Duration {
        (1..=self.max_retries)
            .filter_map(|attempt| self.backoff(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Whether every retry pause fits inside `budget` with time left for
    /// the requests themselves.
    pub fn fits_within(&self, budget: Duration) -> bool {
        self.total_backoff() < budget
    }
}
