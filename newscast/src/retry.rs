//! Bounded retry with exponential backoff for per-topic operations.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry schedule: up to `max_attempts` total attempts, waiting
/// `min(max_wait, base * 2^(attempt-1))` clamped to `[min_wait, max_wait]`
/// between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base: Duration,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base: Duration::from_secs(1),
            min_wait: Duration::from_secs(2),
            max_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the next attempt, given the 1-based attempt that just
    /// failed.
    fn wait_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base.saturating_mul(factor).clamp(self.min_wait, self.max_wait)
    }

    /// Run `op` until it succeeds or `max_attempts` attempts have failed.
    /// The last error is returned unchanged; the policy never swallows it.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts => return Err(err),
                Err(err) => {
                    let wait = self.wait_after(attempt);
                    warn!(attempt, %err, ?wait, "attempt failed, retrying");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}
