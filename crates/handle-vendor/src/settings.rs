//! Retry and polling constants for message resolution.
//!
//! One settings structure carries every budget used between accepting a
//! message and answering the caller. The [`Default`] impl is the canonical
//! contract; deployments override individual values through configuration.

use std::time::Duration;

/// Fixed-delay retry budget for a single logical call.
///
/// `max_retries` counts retries, not attempts: a policy with
/// `max_retries = 2` issues up to three requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that makes exactly one attempt.
    pub const fn once() -> Self {
        Self { max_retries: 0, delay: Duration::ZERO }
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Budgets used by [`crate::resolve::resolve_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionSettings {
    /// Retry policy for the vendor write (message submission).
    pub submit: RetryPolicy,
    /// Maximum number of read iterations before falling back.
    pub poll_budget: u32,
    /// Pause before every read iteration.
    pub poll_delay: Duration,
    /// Retry policy scoped to one read iteration.
    pub poll_retry: RetryPolicy,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            submit: RetryPolicy::new(3, Duration::from_millis(1000)),
            poll_budget: 10,
            poll_delay: Duration::from_millis(1500),
            poll_retry: RetryPolicy::new(2, Duration::from_millis(1000)),
        }
    }
}
