//! Retry logic.
//!
//! # Responsibilities
//! - Determine if an invocation failure is retryable
//! - Execute retries with exponential backoff + jitter
//! - Bound the number of attempts
//!
//! # Design Decisions
//! - Only `Transient` failures are retried: a handler that crashed or returned
//!   garbage ran to completion and may have had side effects
//! - Timeouts are never retried here; the deadline wraps the whole loop
//! - Jittered backoff prevents thundering herd

use std::future::Future;

use crate::bridge::InvocationError;
use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Bounded retry policy derived from `[retries]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        if config.enabled {
            Self::new(config.max_attempts, config.base_delay_ms, config.max_delay_ms)
        } else {
            Self::none()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, InvocationError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, InvocationError>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Err(e) if is_retryable(&e) && attempt < self.max_attempts => {
                    let delay = calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying invocation"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Whether `error` may succeed on another attempt.
pub fn is_retryable(error: &InvocationError) -> bool {
    matches!(error, InvocationError::Transient(_))
}
