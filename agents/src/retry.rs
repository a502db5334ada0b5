//! Exponential backoff for provider calls

use marketlens_core::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff schedule
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            multiplier: config.multiplier,
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based), capped at `max_delay`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.powi(retry.min(i32::MAX as u32) as i32);
        let secs = self.initial_delay.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the attempts run out; the last error is returned on exhaustion
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    is_retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Call succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if is_retryable(&err) && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt - 1);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    "Retrying in {:?}: {}",
                    delay,
                    err
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
