//! Retry policy for transient fetch failures.

use std::time::Duration;

/// Retry policy configuration.
///
/// `max_retries` counts retries, not attempts: a fetch makes at most
/// `max_retries + 1` requests. With a zero base delay (the default) retries
/// are issued immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::immediate(3)
    }
}

impl RetryPolicy {
    /// Retry up to `max_retries` times without waiting.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Retry with capped exponential backoff.
    pub fn exponential(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Calculate the delay before the next retry attempt.
    ///
    /// Uses exponential backoff: base_delay * 2^(retry_number), capped at max_delay.
    pub fn calculate_delay(&self, retry_number: u32) -> Duration {
        let multiplier = 2u32.pow(retry_number.min(20)); // Prevent overflow
        self.base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Check if another attempt is allowed after `retries_used` retries.
    pub fn should_retry(&self, retries_used: u32) -> bool {
        retries_used < self.max_retries
    }
}
