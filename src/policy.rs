//! Retry and timeout policy around whole summary runs.
//!
//! The engine never retries individual rows; a failed run can only be
//! repeated from the start. Each attempt gets its own child [`CancelFlag`],
//! and an attempt that exceeds the timeout has that flag cancelled so its
//! worker stops at the next row.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::warn;

use crate::cancel::CancelFlag;
use crate::error::SummaryError;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("summary run timed out after {0:?}")]
    TimedOut(Duration),
    #[error(transparent)]
    Failed(#[from] SummaryError),
}

impl PolicyError {
    pub fn is_retryable(&self) -> bool {
        match self {
            PolicyError::TimedOut(_) => true,
            PolicyError::Failed(err) => err.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each following one.
    pub base_delay: Duration,
    /// Limit on a single attempt.
    pub timeout: Duration,
    /// Scale each delay by a random factor in `[0.5, 1.5)`.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, fails with a non-retryable error, runs
    /// out of retries, or `cancel` is set.
    pub async fn run<T, F, Fut>(&self, cancel: &CancelFlag, mut op: F) -> Result<T, PolicyError>
    where
        F: FnMut(CancelFlag) -> Fut,
        Fut: Future<Output = Result<T, SummaryError>>,
    {
        let mut attempt = 0;
        loop {
            cancel.check()?;
            let attempt_flag = cancel.child();
            let outcome = match tokio::time::timeout(self.timeout, op(attempt_flag.clone())).await {
                Ok(result) => result.map_err(PolicyError::from),
                Err(_) => {
                    attempt_flag.cancel();
                    Err(PolicyError::TimedOut(self.timeout))
                }
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if attempt >= self.max_retries || !err.is_retryable() || cancel.is_cancelled() {
                return Err(err);
            }

            let delay = self.backoff(attempt);
            attempt += 1;
            warn!(
                attempt,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Summary attempt failed, retrying"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(SummaryError::Cancelled.into()),
            }
        }
    }

    /// Delay before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF);
        if self.jitter {
            exponential.mul_f64(rand::thread_rng().gen_range(0.5..1.5))
        } else {
            exponential
        }
    }
}
