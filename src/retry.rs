//! Bounded retry with linear backoff.
//!
//! The executor knows nothing about the operation it drives; HTTP callers
//! turn non-success statuses into [`UpstreamError::Status`] themselves (see
//! [`crate::provider::send_chat`]).

use crate::error::UpstreamError;
use std::future::Future;
use tokio::time::{Duration, sleep};

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy)]
pub struct RetryExecutor {
    max_retries: u32,
    backoff_step: Duration,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BACKOFF_STEP)
    }
}

impl RetryExecutor {
    pub fn new(max_retries: u32, backoff_step: Duration) -> Self {
        Self {
            max_retries,
            backoff_step,
        }
    }

    /// Delay after the failed attempt with the given zero-based index.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt + 1)
    }

    /// Run `operation` up to `max_retries + 1` times, returning the first
    /// success or the last failure. The closure receives the attempt index.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, UpstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut attempt = 0;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "upstream attempt failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(attempts = attempt + 1, error = %err, "upstream retries exhausted");
                    return Err(err);
                }
            }
        }
    }
}
