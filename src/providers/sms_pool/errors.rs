//! Classification of SMSPool failure messages.
//!
//! SMSPool reports failures as `{"success": 0, "message": "..."}` or, on some
//! endpoints, as a bare text body. Neither carries a machine-readable code,
//! so the message text is matched against known phrasings.

use crate::errors::{OrderError, OrderErrorKind};
use once_cell::sync::Lazy;
use regex::Regex;

#[cfg(feature = "tracing")]
use tracing::warn;

static RE_BALANCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)balance").unwrap());
static RE_MISSING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)missing|required|provide").unwrap());
static RE_UNAVAILABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)not available|out of stock|no numbers|country|service").unwrap()
});

/// Classify a failure message. Balance wins over everything else, then
/// missing parameters, then availability.
pub fn classify_message(message: &str) -> OrderErrorKind {
    if RE_BALANCE.is_match(message) {
        OrderErrorKind::InsufficientBalance
    } else if RE_MISSING.is_match(message) {
        OrderErrorKind::MissingParameter
    } else if RE_UNAVAILABLE.is_match(message) {
        OrderErrorKind::ServiceUnavailableForCountry
    } else {
        OrderErrorKind::Unknown
    }
}

/// Build an [`OrderError`] from a raw failure message.
pub(crate) fn rejection(message: &str) -> OrderError {
    let message = message.trim();
    let error = OrderError::new(classify_message(message), message);

    #[cfg(feature = "tracing")]
    warn!(kind = %error.kind, message = %error.message, "SMSPool declined request");

    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_message() {
        let cases = [
            (
                "Your balance is too low to purchase this number",
                OrderErrorKind::InsufficientBalance,
            ),
            ("Missing service", OrderErrorKind::MissingParameter),
            ("Please provide a valid orderid", OrderErrorKind::MissingParameter),
            (
                "This service is not available for the selected country",
                OrderErrorKind::ServiceUnavailableForCountry,
            ),
            ("Out of stock", OrderErrorKind::ServiceUnavailableForCountry),
            ("Something went wrong", OrderErrorKind::Unknown),
        ];

        for (message, expected) in cases {
            assert_eq!(classify_message(message), expected, "{message}");
        }
    }

    #[test]
    fn test_rejection_keeps_message() {
        let error = rejection("  Out of stock \n");
        assert_eq!(error.message, "Out of stock");
        assert_eq!(error.kind, OrderErrorKind::ServiceUnavailableForCountry);
    }
}
