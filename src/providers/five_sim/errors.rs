//! Error vocabulary of the 5sim API.
//!
//! 5sim answers failures with bare text bodies (`no free phones`,
//! `not enough user balance`, ...) instead of JSON.

use crate::errors::{OrderError, OrderErrorKind, ProviderError, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Error messages returned by the 5sim API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiveSimErrorCode {
    /// No numbers left for the operator.
    NoFreePhones,
    /// Account balance too low.
    NotEnoughBalance,
    /// Account rating too low.
    NotEnoughRating,
    /// Country unknown or missing.
    BadCountry,
    /// Operator unknown or missing.
    BadOperator,
    /// Product unknown or not offered.
    NoProduct,
    /// Provider side maintenance.
    ServerOffline,
    /// Order id unknown.
    OrderNotFound,
    /// Order already expired.
    OrderExpired,
    /// Order already received an SMS and cannot be canceled.
    OrderHasSms,
    /// Operation not allowed on hosting orders.
    HostingOrder,
    /// Anything else.
    Unknown { raw: String },
}

impl FiveSimErrorCode {
    /// Parse an error message body.
    pub fn from_raw(raw: &str) -> Self {
        let s = raw.trim().trim_matches('"').trim().to_ascii_lowercase();
        match s.as_str() {
            "no free phones" => Self::NoFreePhones,
            "not enough user balance" => Self::NotEnoughBalance,
            "not enough rating" => Self::NotEnoughRating,
            "select country" | "bad country" => Self::BadCountry,
            "select operator" | "bad operator" => Self::BadOperator,
            "no product" | "bad product" | "select product" => Self::NoProduct,
            "server offline" => Self::ServerOffline,
            "order not found" | "record not found" => Self::OrderNotFound,
            "order expired" => Self::OrderExpired,
            "order has sms" => Self::OrderHasSms,
            "hosting order" => Self::HostingOrder,
            _ => Self::Unknown {
                raw: raw.trim().to_string(),
            },
        }
    }

    /// Classification tag for a declined order.
    pub fn kind(&self) -> OrderErrorKind {
        match self {
            Self::NotEnoughBalance => OrderErrorKind::InsufficientBalance,
            Self::NoFreePhones | Self::BadCountry | Self::BadOperator | Self::NoProduct => {
                OrderErrorKind::ServiceUnavailableForCountry
            }
            Self::NotEnoughRating
            | Self::ServerOffline
            | Self::OrderNotFound
            | Self::OrderExpired
            | Self::OrderHasSms
            | Self::HostingOrder
            | Self::Unknown { .. } => OrderErrorKind::Unknown,
        }
    }
}

impl Display for FiveSimErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFreePhones => write!(f, "no free phones"),
            Self::NotEnoughBalance => write!(f, "not enough user balance"),
            Self::NotEnoughRating => write!(f, "not enough rating"),
            Self::BadCountry => write!(f, "bad country"),
            Self::BadOperator => write!(f, "bad operator"),
            Self::NoProduct => write!(f, "no product"),
            Self::ServerOffline => write!(f, "server offline"),
            Self::OrderNotFound => write!(f, "order not found"),
            Self::OrderExpired => write!(f, "order expired"),
            Self::OrderHasSms => write!(f, "order has sms"),
            Self::HostingOrder => write!(f, "hosting order"),
            Self::Unknown { raw } => write!(f, "{raw}"),
        }
    }
}

/// Error body returned by 5sim.
#[derive(Debug, Clone, Error)]
#[error("5sim service error: {code}")]
pub struct FiveSimServiceError {
    /// Parsed code.
    pub code: FiveSimErrorCode,
    /// Body exactly as received.
    pub raw: String,
}

impl From<FiveSimServiceError> for ProviderError {
    fn from(error: FiveSimServiceError) -> Self {
        ProviderError::Rejected(OrderError::new(error.code.kind(), error.raw.trim()))
    }
}

/// Recognize an error body. JSON bodies are never errors.
pub(crate) fn parse_five_sim_error(raw: &str) -> Option<FiveSimServiceError> {
    let s = raw.trim();
    if s.is_empty() || s.starts_with('{') || s.starts_with('[') {
        return None;
    }

    let error = FiveSimServiceError {
        code: FiveSimErrorCode::from_raw(s),
        raw: raw.to_string(),
    };

    #[cfg(feature = "tracing")]
    warn!(code = %error.code, raw = %raw, "5sim service returned error");

    Some(error)
}

/// Classify a text body from the price endpoint.
///
/// Mentions of a country mean the country is invalid, mentions of a product
/// mean the service is invalid. Anything else is a rejection.
pub(crate) fn classify_price_error(error: FiveSimServiceError) -> ProviderError {
    static RE_COUNTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)country").unwrap());
    static RE_PRODUCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)product").unwrap());

    let message = error.raw.trim().to_string();
    if RE_COUNTRY.is_match(&message) {
        return ValidationError::InvalidCountry { message }.into();
    }
    if RE_PRODUCT.is_match(&message) {
        return ValidationError::InvalidService { message }.into();
    }
    error.into()
}
