//! Bounded retry with linear backoff.
//!
//! Attempt `i` (0-indexed) that fails sleeps `backoff_unit * (i + 1)` before
//! the next one. There is no sleep after the last attempt, no jitter and no
//! exponential growth.
use core::fmt;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

pub const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = NonZeroU32::new(3).unwrap();
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: NonZeroU32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: NonZeroU32, backoff_unit: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            backoff_unit,
        }
    }

    /// A single attempt, no backoff.
    pub const fn once() -> Self {
        RetryPolicy::new(NonZeroU32::MIN, Duration::ZERO)
    }

    /// Sleep after failed attempt `attempt` (0-indexed).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .checked_mul(attempt.saturating_add(1))
            .unwrap_or(Duration::MAX)
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_attempts.get() - 1)
            .map(|attempt| self.backoff_after(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF_UNIT)
    }
}

/// Every attempt failed; `last` is the error of the final one.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Runs `op` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// `op` receives the 0-indexed attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let attempts = policy.max_attempts.get();
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(last) if attempt + 1 >= attempts => return Err(Exhausted { attempts, last }),
            Err(e) => {
                let backoff = policy.backoff_after(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    "attempt failed: {e}"
                );
                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
