//! Retry with exponential backoff
//!
//! Used around the compensating counter increment: when the counter store can
//! fail on write, giving up after one attempt would permanently shrink the
//! inventory of an offering until the next reconciliation.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::CompensationConfig;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Maximum delay between retries (cap).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(500),
        }
    }
}

impl From<&CompensationConfig> for RetryConfig {
    fn from(cfg: &CompensationConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            initial_delay: Duration::from_millis(cfg.initial_delay_ms),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(cfg.max_delay_ms),
        }
    }
}

impl RetryConfig {
    fn next_delay(&self, current: Duration) -> Duration {
        Duration::from_secs_f64(
            (current.as_secs_f64() * self.backoff_multiplier).min(self.max_delay.as_secs_f64()),
        )
    }
}

/// Execute an async operation with exponential backoff retry.
///
/// `should_retry` decides whether an error is transient (retry) or permanent
/// (bail immediately with that error).
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt >= config.max_attempts || !should_retry(&err) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %err,
                    "Operation failed permanently"
                );
                return Err(err);
            }
            Err(err) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = config.next_delay(delay);
                attempt += 1;
            }
        }
    }
}
