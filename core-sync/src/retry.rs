//! Per-item retry with exponential backoff
//!
//! An operation is attempted up to `max_attempts` times, strictly one after
//! another. Only errors that report themselves as retryable are retried; any
//! other error ends the run immediately. Between attempts the executor waits
//!
//! ```text
//! min(base_delay * 2^attempt + jitter, max_delay)
//! ```
//!
//! where `attempt` is the zero-based index of the attempt that just failed and
//! `jitter` is drawn uniformly from `[0, max_jitter)`.

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Cancelled, Retryable};

/// How often and how patiently an operation is retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Never below 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn no_retry() -> Self {
        Self::default().with_max_attempts(1)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_max_jitter(mut self, jitter: Duration) -> Self {
        self.max_jitter = jitter;
        self
    }

    /// Wait after the failed attempt `attempt` (zero-based) for a given jitter
    pub fn delay_for(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .saturating_mul(factor)
            .saturating_add(jitter)
            .min(self.max_delay)
    }

    /// Wait after the failed attempt `attempt` with random jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let max_jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if max_jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..max_jitter_ms))
        };
        self.delay_for(attempt, jitter)
    }
}

struct Cancellation<'a, E> {
    token: &'a CancellationToken,
    into_error: fn(Cancelled) -> E,
}

/// Runs async operations under a [`RetryPolicy`]
///
/// ```ignore
/// let executor = RetryExecutor::new(RetryPolicy::default());
/// let record = executor.run(|| uploader.upload(&item)).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails terminally, or attempts run out.
    /// The error of the last attempt is returned.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(operation, None).await
    }

    /// Like [`run`](Self::run), but each attempt and each backoff wait races
    /// `token`. Losing the race ends the run with `Cancelled` and no further
    /// attempts.
    pub async fn run_until_cancelled<T, E, F, Fut>(
        &self,
        token: &CancellationToken,
        operation: F,
    ) -> Result<T, E>
    where
        E: Retryable + Display + From<Cancelled>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cancellation = Cancellation {
            token,
            into_error: <E as From<Cancelled>>::from,
        };
        self.execute(operation, Some(cancellation)).await
    }

    async fn execute<T, E, F, Fut>(
        &self,
        mut operation: F,
        cancellation: Option<Cancellation<'_, E>>,
    ) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt: u32 = 0;

        loop {
            let result = match &cancellation {
                Some(c) => tokio::select! {
                    biased;
                    _ = c.token.cancelled() => return Err((c.into_error)(Cancelled)),
                    result = operation() => result,
                },
                None => operation().await,
            };

            let error = match result {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempts = attempt + 1, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let attempts_made = attempt + 1;
            if !error.is_retryable() {
                debug!(attempt = attempts_made, error = %error, "Operation failed, not retryable");
                return Err(error);
            }
            if attempts_made >= max_attempts {
                warn!(attempts = attempts_made, error = %error, "Operation failed, attempts exhausted");
                return Err(error);
            }

            let delay = self.policy.backoff(attempt);
            warn!(
                attempt = attempts_made,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Operation failed, retrying"
            );

            match &cancellation {
                Some(c) => tokio::select! {
                    biased;
                    _ = c.token.cancelled() => return Err((c.into_error)(Cancelled)),
                    _ = tokio::time::sleep(delay) => {}
                },
                None => tokio::time::sleep(delay).await,
            }

            attempt += 1;
        }
    }
}
