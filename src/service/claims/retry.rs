//! Retry policy for categorization attempts

use std::time::Duration;

use rand::Rng;

use crate::model::RetryConfig;

/// Bounded retry with optional fixed backoff and random jitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
    jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::immediate(4)
    }
}

impl RetryPolicy {
    /// Retry straight away, up to `max_attempts` total attempts (at least one)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after a failed attempt
    pub fn delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.backoff;
        }
        let jitter_ms = self.jitter.as_millis() as u64;
        self.backoff + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::immediate(config.max_attempts)
            .with_backoff(Duration::from_millis(config.backoff_ms))
            .with_jitter(Duration::from_millis(config.jitter_ms))
    }
}
