//! Error types and traits for number ordering.

use crate::transport::TransportError;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Trait for errors that can be classified as retryable or permanent.
///
/// This trait provides two levels of retryability classification:
///
/// 1. **Request-level** (`is_retryable`): whether re-sending the same request
///    may succeed. Only transient transport failures qualify; the transport
///    layer is the only place that acts on it.
///
/// 2. **Operation-level** (`should_retry_operation`): whether a fresh
///    attempt (a new order) might succeed after this one failed.
///
/// # Examples
///
/// ```rust
/// use sms_rental::RetryableError;
///
/// enum MyError {
///     ConnectionReset,  // Re-send the request
///     NoFreePhones,     // Don't re-send, a later order might work
///     BadKey,           // Never works
/// }
///
/// impl RetryableError for MyError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, MyError::ConnectionReset)
///     }
///
///     fn should_retry_operation(&self) -> bool {
///         !matches!(self, MyError::BadKey)
///     }
/// }
/// ```
pub trait RetryableError {
    /// Returns true if this error represents a transient failure
    /// that might succeed when the same request is sent again.
    fn is_retryable(&self) -> bool;

    /// Returns true if a fresh operation (placing a new order) might succeed.
    ///
    /// Default implementation returns the same as `is_retryable()`.
    fn should_retry_operation(&self) -> bool {
        self.is_retryable()
    }
}

/// Input rejected before any remote call was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// A field is present but out of range.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The provider does not know this country.
    #[error("Invalid country: {message}")]
    InvalidCountry { message: String },

    /// The provider does not offer this service (in this country).
    #[error("Invalid service: {message}")]
    InvalidService { message: String },
}

/// Best-effort classification of a declined order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderErrorKind {
    /// The account cannot pay for the number.
    InsufficientBalance,
    /// No numbers for this service in this country (or operator).
    ServiceUnavailableForCountry,
    /// The provider complained about a missing request parameter.
    MissingParameter,
    /// Anything else.
    Unknown,
}

impl Display for OrderErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientBalance => write!(f, "insufficient balance"),
            Self::ServiceUnavailableForCountry => write!(f, "service unavailable for country"),
            Self::MissingParameter => write!(f, "missing parameter"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The provider declined a request. Carries the raw message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct OrderError {
    /// Classification tag.
    pub kind: OrderErrorKind,
    /// Message exactly as the provider sent it.
    pub message: String,
}

impl OrderError {
    /// Create a new order error.
    pub fn new(kind: OrderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Error returned by provider adapters.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Bad credentials, bad base URL or bad option. Never retried.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unknown country/service or missing input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider declined the request.
    #[error("Rejected by provider: {0}")]
    Rejected(#[from] OrderError),

    /// The HTTP exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body matched neither a known error nor the expected shape.
    #[error("Unexpected response from {endpoint}: {body}")]
    UnexpectedResponse {
        /// Endpoint that produced the body.
        endpoint: String,
        /// Raw response body.
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    /// Shortcut for [`ProviderError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn unexpected(endpoint: &str, body: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            endpoint: endpoint.to_string(),
            body: body.into(),
        }
    }

    /// The rejection classification, if this is a remote rejection.
    pub fn order_error_kind(&self) -> Option<OrderErrorKind> {
        match self {
            Self::Rejected(e) => Some(e.kind),
            _ => None,
        }
    }
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(e) => e.is_retryable(),
            ProviderError::Configuration { .. }
            | ProviderError::Validation(_)
            | ProviderError::Rejected(_)
            | ProviderError::UnexpectedResponse { .. } => false,
        }
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            ProviderError::Transport(_) => true,
            ProviderError::Rejected(e) => matches!(
                e.kind,
                OrderErrorKind::ServiceUnavailableForCountry | OrderErrorKind::Unknown
            ),
            ProviderError::Configuration { .. }
            | ProviderError::Validation(_)
            | ProviderError::UnexpectedResponse { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::Empty { field: "country" }.to_string(),
            "country must not be empty"
        );
        assert_eq!(
            ValidationError::InvalidCountry {
                message: "atlantis".into()
            }
            .to_string(),
            "Invalid country: atlantis"
        );
    }

    #[test]
    fn test_rejection_keeps_raw_message() {
        let err = ProviderError::from(OrderError::new(
            OrderErrorKind::InsufficientBalance,
            "not enough user balance",
        ));
        assert_eq!(
            err.order_error_kind(),
            Some(OrderErrorKind::InsufficientBalance)
        );
        assert!(err.to_string().contains("not enough user balance"));
    }

    #[test]
    fn test_business_errors_are_not_retryable() {
        let rejected = ProviderError::from(OrderError::new(OrderErrorKind::Unknown, "x"));
        let invalid = ProviderError::from(ValidationError::Empty { field: "service" });
        let config = ProviderError::configuration("bad key");

        assert!(!rejected.is_retryable());
        assert!(!invalid.is_retryable());
        assert!(!config.is_retryable());
        assert!(!config.should_retry_operation());
    }
}
