/*!
 * Bounded retry with exponential backoff.
 *
 * Each component that issues network calls owns its own `RetryPolicy`
 * value, so the resolver, the subtitle fetcher and the summarizer can be
 * tuned independently.
 */

use log::warn;
use std::future::Future;
use std::time::Duration;

/// Retry budget and backoff base for one call site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled for each further attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn backoff_delay(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is exhausted. The last error is returned.
    ///
    /// `extra_delay` lets the caller stretch the wait for a given error
    /// (a provider's `retry-after`, for instance); the longer delay wins.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        mut operation: F,
        is_retryable: impl Fn(&E) -> bool,
        extra_delay: impl Fn(&E) -> Option<Duration>,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if is_retryable(&error) && attempt < self.max_attempts => {
                    let backoff = self.backoff_delay(attempt);
                    let delay = extra_delay(&error).map_or(backoff, |hint| hint.max(backoff));
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        label, attempt, self.max_attempts, error, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
