//! Bounded retry with exponential backoff.
//!
//! Every remote call made by the client goes through [`RetryPolicy::call`].
//! Only errors for which [`crate::Error::is_retryable`] holds are attempted again.
//! Each invocation keeps its own attempt counter and clock, so concurrent
//! calls never share a retry budget.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::Result;
use crate::config::RetrySettings;

/// Retry policy applied to every remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. At least 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: u32,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    /// Give up instead of sleeping past this much time since the first attempt.
    pub max_elapsed: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_backoff_ms),
            multiplier: settings.multiplier.max(1),
            max_delay: Duration::from_millis(settings.max_backoff_ms),
            max_elapsed: settings.max_elapsed_seconds.map(Duration::from_secs),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1 for the first retry).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error, or
    /// the policy is exhausted. The last error is returned unchanged.
    pub async fn call<T, F, Fut>(&self, name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(operation = name, attempt, "attempt");

            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= self.max_attempts {
                warn!(operation = name, attempt, error = %err, "retries exhausted");
                return Err(err);
            }

            let delay = self.delay_for(attempt);
            if self
                .max_elapsed
                .is_some_and(|budget| started.elapsed() + delay > budget)
            {
                warn!(operation = name, attempt, error = %err, "retry time budget exhausted");
                return Err(err);
            }

            warn!(
                operation = name,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retryable failure; backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
