//! Sliding-window rate limiter shared by the topic workers of one
//! aggregation run.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Grants at most `permits` acquisitions in any rolling `window`.
///
/// One instance belongs to one aggregation run and is shared by its workers
/// behind an `Arc`. The grant log is mutex-guarded and the guard is never
/// held across an await.
pub struct RateLimiter {
    permits: usize,
    window: Duration,
    grants: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(permits: usize, window: Duration) -> Self {
        Self {
            permits: permits.max(1),
            window,
            grants: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until a permit is free in the current window, then take it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut grants = self.grants.lock().await;
                let now = Instant::now();
                while let Some(&oldest) = grants.front() {
                    if now.duration_since(oldest) >= self.window {
                        grants.pop_front();
                    } else {
                        break;
                    }
                }
                if grants.len() < self.permits {
                    grants.push_back(now);
                    None
                } else {
                    // The oldest grant leaving the window frees the next slot.
                    let oldest = *grants.front().expect("grant log is full");
                    Some(self.window.saturating_sub(now.duration_since(oldest)))
                }
            };
            match wait {
                None => return,
                Some(delay) => {
                    debug!(?delay, "rate limit reached, waiting");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
