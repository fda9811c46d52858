//! Retry with exponential backoff
//!
//! Shared by the sentiment client (transport and response failures) and the
//! document store (SQLite lock contention).
//!
//! **Backoff:** the Nth retry waits `base_delay * 2^(N-1)`, optionally capped
//! at `max_delay`. No delay follows the final attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempt budget and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least one is always made)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for a single delay; `None` means uncapped
    pub max_delay: Option<Duration>,
}

impl RetryPolicy {
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor);
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

/// Final error of a retried operation
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Attempts made before giving up
    pub attempts: u32,
    pub last_error: E,
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the attempt budget is spent.
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    operation_name: &str,
    policy: &RetryPolicy,
    is_retryable: R,
    mut operation: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    R: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(operation = operation_name, attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    tracing::debug!(operation = operation_name, attempt, error = %err, "Non-retryable failure");
                    return Err(RetryFailure {
                        attempts: attempt,
                        last_error: err,
                    });
                }

                if attempt >= max_attempts {
                    tracing::error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %err,
                        "Operation failed: retries exhausted"
                    );
                    return Err(RetryFailure {
                        attempts: attempt,
                        last_error: err,
                    });
                }

                let backoff = policy.delay_before_retry(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Operation failed, will retry after backoff"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
