//! Retry configuration for transient transport failures.

use backon::ConstantBuilder;
use std::time::Duration;

/// Configuration for low-level retry behavior.
///
/// Only transient transport failures (connection errors, HTTP 5xx) are
/// retried, with a fixed delay between attempts. Business rejections are
/// never retried.
///
/// ```rust
/// use sms_rental::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .with_delay(Duration::from_millis(500))
///     .with_max_retries(5);
/// assert_eq!(config.max_retries, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Delay between attempts (default: 1 second).
    pub delay: Duration,
    /// Maximum number of retry attempts after the first (default: 3).
    pub max_retries: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_retries: 3,
        }
    }
}

impl RetryConfig {
    /// A config that sends every request exactly once.
    pub fn disabled() -> Self {
        Self {
            delay: Duration::ZERO,
            max_retries: 0,
        }
    }

    /// Set the delay between retries.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Build a backoff strategy from this configuration.
    pub fn build_strategy(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_retries)
    }
}
