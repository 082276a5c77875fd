//! Centralized retry policy with exponential backoff.
//!
//! Every remote operation (search pagination, attachment downloads) goes
//! through the same policy instead of ad hoc per-call-site retry loops.
//! Only errors classified as transient are retried.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Classifies an error as transient (worth retrying) or permanent.
pub trait IsTransient {
    /// Returns true if the operation should be retried.
    fn is_transient(&self) -> bool;
}

/// Retry policy parameterized by attempt ceiling and backoff schedule.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// Conservative defaults: 3 attempts, exponential backoff from 1s,
    /// doubling, capped at 30s.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Runs `operation` under the given policy.
///
/// Permanent errors and the final transient error after the attempt
/// ceiling are returned to the caller unchanged.
///
/// # Errors
///
/// Returns the last error once retries are exhausted or the error is not
/// transient.
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsTransient + std::fmt::Display,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    error = %e,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = Duration::from_secs_f64(delay.as_secs_f64() * policy.multiplier)
                    .min(policy.max_delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
