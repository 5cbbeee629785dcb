//! Service-level error types.

use crate::errors::{ProviderError, RetryableError, ValidationError};
use crate::types::OrderId;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the order service.
///
/// Polling outcomes (code, timeout, rejection, failed query) are not errors;
/// they are reported as [`crate::PollOutcome`].
#[derive(Debug, Error)]
pub enum SmsOrderServiceError {
    /// Error from the underlying provider.
    #[error("SMS provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Cancellation was requested by the caller.
    #[error(
        "Operation cancelled after {:.1}s (polled {} times); Order id: {order_id}",
        elapsed.as_secs_f64(),
        poll_count
    )]
    Cancelled {
        /// Elapsed time before cancellation.
        elapsed: Duration,
        /// Number of status queries issued.
        poll_count: u32,
        /// The order that was being polled.
        order_id: OrderId,
    },
}

impl SmsOrderServiceError {
    /// Returns true when the provider does not know the country.
    pub fn is_invalid_country(&self) -> bool {
        matches!(
            self,
            Self::Provider(ProviderError::Validation(ValidationError::InvalidCountry { .. }))
        )
    }

    /// Returns true when the provider does not offer the service.
    pub fn is_invalid_service(&self) -> bool {
        matches!(
            self,
            Self::Provider(ProviderError::Validation(ValidationError::InvalidService { .. }))
        )
    }
}

impl RetryableError for SmsOrderServiceError {
    fn is_retryable(&self) -> bool {
        match self {
            SmsOrderServiceError::Provider(e) => e.is_retryable(),
            SmsOrderServiceError::Cancelled { .. } => false,
        }
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            SmsOrderServiceError::Provider(e) => e.should_retry_operation(),
            SmsOrderServiceError::Cancelled { .. } => false,
        }
    }
}

impl From<ValidationError> for SmsOrderServiceError {
    fn from(error: ValidationError) -> Self {
        Self::Provider(error.into())
    }
}
