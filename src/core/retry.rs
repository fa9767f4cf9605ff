//! Resilient Call Executor
//!
//! Runs a single async chain call under a bounded, fixed-delay retry policy.
//! Every failure is treated as transient; no jitter, no exponential growth.
//! Attempts are strictly sequential and the last error is handed back as-is.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::utils::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};

/// Attempt ceiling and inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (0 is treated as 1)
    pub max_attempts: u32,
    /// Wait between two consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run `operation` until it succeeds or the attempt ceiling is reached.
    ///
    /// `label` only shows up in logs.
    pub async fn execute<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("✅ {} succeeded on attempt {}/{}", label, attempt, max_attempts);
                    }
                    return Ok(value);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!("❌ {} failed after {} attempts: {}", label, max_attempts, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "⏳ {} attempt {}/{} failed, retrying in {}ms: {}",
                        label,
                        attempt,
                        max_attempts,
                        self.policy.delay.as_millis(),
                        e
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
