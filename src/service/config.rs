//! Service configuration types.

use crate::errors::ProviderError;
use crate::pricing::RankingPolicy;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
const DEFAULT_DEADLINE: Duration = Duration::from_secs(10 * 60);

/// Options for one run of the poll loop.
///
/// ```rust
/// use sms_rental::PollOptions;
/// use std::time::Duration;
///
/// let options = PollOptions::default()
///     .with_poll_interval(Duration::from_secs(1))
///     .with_deadline_minutes(3);
///
/// assert_eq!(options.deadline, Duration::from_secs(180));
/// assert!(options.cancel_on_timeout);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Sleep before each status query (default: 2000 ms).
    pub poll_interval: Duration,
    /// Wall-clock limit for the whole loop (default: 10 minutes).
    pub deadline: Duration,
    /// Cancel the order once when the deadline fires (default: true).
    pub cancel_on_timeout: bool,
    /// Accept a code seen with a `Received` status (default: false).
    pub complete_on_received: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: DEFAULT_DEADLINE,
            cancel_on_timeout: true,
            complete_on_received: false,
        }
    }
}

impl PollOptions {
    /// Set the interval between status queries.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the deadline in whole minutes.
    pub fn with_deadline_minutes(self, minutes: u64) -> Self {
        self.with_deadline(Duration::from_secs(minutes.saturating_mul(60)))
    }

    /// Choose whether a timed-out order is cancelled.
    pub fn with_cancel_on_timeout(mut self, cancel: bool) -> Self {
        self.cancel_on_timeout = cancel;
        self
    }

    /// Choose whether a code attached to `Received` ends the loop.
    pub fn with_complete_on_received(mut self, complete: bool) -> Self {
        self.complete_on_received = complete;
        self
    }
}

/// Configuration for the SMS order service.
///
/// Controls operator ranking and polling behavior when waiting for codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmsOrderServiceConfig {
    /// Policy used to pick an operator.
    pub policy: RankingPolicy,
    /// Poll loop options used by `wait_for_code`.
    pub poll: PollOptions,
}

impl SmsOrderServiceConfig {
    /// Create a new builder for SmsOrderServiceConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sms_rental::{RankingPolicy, SmsOrderServiceConfig};
    /// use std::time::Duration;
    ///
    /// let config = SmsOrderServiceConfig::builder()
    ///     .policy(RankingPolicy::HighestSuccessRateFirst)
    ///     .deadline(Duration::from_secs(300))
    ///     .poll_interval(Duration::from_secs(5))
    ///     .build();
    ///
    /// assert_eq!(config.poll.deadline, Duration::from_secs(300));
    /// assert_eq!(config.poll.poll_interval, Duration::from_secs(5));
    /// ```
    pub fn builder() -> SmsOrderServiceConfigBuilder {
        SmsOrderServiceConfigBuilder::default()
    }

    /// Short deadline and fast polling.
    pub fn quick() -> Self {
        Self::builder()
            .poll_interval(Duration::from_secs(1))
            .deadline(Duration::from_secs(2 * 60))
            .build()
    }

    /// Long deadline and relaxed polling.
    pub fn patient() -> Self {
        Self::builder()
            .poll_interval(Duration::from_secs(5))
            .deadline(Duration::from_secs(20 * 60))
            .build()
    }

    /// Check that the poll options can produce at least one status query.
    ///
    /// A zero deadline, or a poll interval not shorter than the deadline,
    /// would time out before the first query.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.poll.deadline.is_zero() {
            return Err(ProviderError::configuration("deadline must be positive"));
        }
        if self.poll.poll_interval >= self.poll.deadline {
            return Err(ProviderError::configuration(format!(
                "poll interval {:?} must be shorter than deadline {:?}",
                self.poll.poll_interval, self.poll.deadline
            )));
        }
        Ok(())
    }

    /// Create a new config with a custom ranking policy.
    pub fn with_policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create a new config with custom poll options.
    pub fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }
}

/// Builder for SmsOrderServiceConfig.
#[derive(Debug, Clone, Default)]
pub struct SmsOrderServiceConfigBuilder {
    pub(crate) policy: RankingPolicy,
    pub(crate) poll: PollOptions,
}

impl SmsOrderServiceConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ranking policy.
    ///
    /// Default: cheapest first
    pub fn policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the polling interval when waiting for codes.
    ///
    /// Default: 2 seconds
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll.poll_interval = interval;
        self
    }

    /// Set the deadline for waiting for codes.
    ///
    /// Default: 10 minutes
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.poll.deadline = deadline;
        self
    }

    /// Choose whether timed-out orders are cancelled.
    ///
    /// Default: true
    pub fn cancel_on_timeout(mut self, cancel: bool) -> Self {
        self.poll.cancel_on_timeout = cancel;
        self
    }

    /// Choose whether a code seen with a `Received` status ends polling.
    ///
    /// Default: false
    pub fn complete_on_received(mut self, complete: bool) -> Self {
        self.poll.complete_on_received = complete;
        self
    }

    /// Build the SmsOrderServiceConfig.
    pub fn build(self) -> SmsOrderServiceConfig {
        SmsOrderServiceConfig {
            policy: self.policy,
            poll: self.poll,
        }
    }

    /// Build and validate the SmsOrderServiceConfig.
    pub fn try_build(self) -> Result<SmsOrderServiceConfig, ProviderError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
