//! Core types for disposable number orders.

use crate::errors::{ProviderError, ValidationError};
use crate::pricing::PriceQuote;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::SystemTime;
use thiserror::Error;

// =============================================================================
// OrderId
// =============================================================================

/// Provider-issued identifier of a placed order.
///
/// Stable for the lifetime of the order and unique per provider. Providers
/// return it either as a JSON number (5sim) or a string (SMSPool); both
/// deserialize into the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new OrderId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }

        match Raw::deserialize(d)? {
            Raw::Text(s) if s.trim().is_empty() => Err(de::Error::custom("order id is empty")),
            Raw::Text(s) => Ok(Self(s)),
            Raw::Int(n) => Ok(Self(n.to_string())),
        }
    }
}

// =============================================================================
// SmsCode (OTP)
// =============================================================================

/// Verification code delivered to a rented number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsCode(pub String);

impl SmsCode {
    /// Create a new SmsCode.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SmsCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SmsCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

// =============================================================================
// Request names: country, service, operator
// =============================================================================

/// Provider-native country name (e.g. `"russia"` on 5sim, `"US"` on SMSPool).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryName(String);

impl CountryName {
    /// Create a country name, rejecting blank input.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        non_empty("country", name.as_ref()).map(Self)
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CountryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CountryName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Provider-native service (product) name, e.g. `"telegram"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceName(String);

impl ServiceName {
    /// Create a service name, rejecting blank input.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        non_empty("service", name.as_ref()).map(Self)
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ServiceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Carrier option offered for a (country, service) pair.
///
/// On SMSPool this is the pool identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperatorName(String);

impl OperatorName {
    /// Create a new operator name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OperatorName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OperatorName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// FullNumber / DialCode / LocalNumber
// =============================================================================

/// Phone number as returned by the provider, usually with the calling code
/// (e.g. `"+79085895281"` or `"16136001234"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullNumber(String);

impl FullNumber {
    /// Create a new FullNumber.
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Get the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FullNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FullNumber {
    fn from(number: &str) -> Self {
        Self(number.to_string())
    }
}

/// Error when parsing a dial code.
#[derive(Debug, Clone, Error)]
pub enum DialCodeError {
    /// Dial code contains non-digit characters.
    #[error("dial code must contain only digits")]
    NonDigit,
    /// Dial code is empty.
    #[error("dial code cannot be empty")]
    Empty,
}

/// Country calling code (e.g. "1" for USA, "7" for Russia).
///
/// Stored without the leading '+' sign.
///
/// ```rust
/// use sms_rental::DialCode;
///
/// let dc = DialCode::new("+7").unwrap();
/// assert_eq!(dc.to_string(), "7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DialCode(String);

impl DialCode {
    /// Create a new DialCode; a leading '+' is stripped.
    pub fn new(s: impl AsRef<str>) -> Result<Self, DialCodeError> {
        let n = s.as_ref().trim().trim_start_matches('+');
        if n.is_empty() {
            return Err(DialCodeError::Empty);
        }
        if !n.chars().all(|c| c.is_ascii_digit()) {
            return Err(DialCodeError::NonDigit);
        }
        Ok(Self(n.to_string()))
    }

    /// Get the dial code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DialCode {
    type Err = DialCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for DialCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for DialCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        DialCode::new(raw).map_err(de::Error::custom)
    }
}

impl Serialize for DialCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

/// Phone number in local format, i.e. without the calling code.
///
/// Derived from a [`FullNumber`]. When no dial code is known, or the number
/// does not start with it, the full number is kept unmodified.
///
/// ```rust
/// use sms_rental::{DialCode, FullNumber, LocalNumber};
///
/// let full = FullNumber::new("+79085895281");
/// let dial_code = DialCode::new("+7").unwrap();
/// assert_eq!(LocalNumber::derive(&full, Some(&dial_code)).as_str(), "9085895281");
/// assert_eq!(LocalNumber::derive(&full, None).as_str(), "+79085895281");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalNumber(String);

impl LocalNumber {
    /// Strip `dial_code` from `full`, falling back to the untruncated number.
    pub fn derive(full: &FullNumber, dial_code: Option<&DialCode>) -> Self {
        let raw = full.as_str().trim();
        let stripped = dial_code.and_then(|code| {
            raw.trim_start_matches('+')
                .strip_prefix(code.as_str())
                .filter(|rest| !rest.is_empty())
        });

        Self(stripped.unwrap_or(raw).to_string())
    }

    /// Get the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LocalNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Order
// =============================================================================

/// What an adapter hands back after a successful purchase call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// Provider-issued order id.
    pub order_id: OrderId,
    /// Number as returned by the provider.
    pub full_number: FullNumber,
    /// Calling code for the order's country, when the adapter knows it.
    pub dial_code: Option<DialCode>,
}

/// A confirmed order for a disposable phone number.
///
/// Immutable once created. The poll loop only reads `order_id` and
/// `phone_number`.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Provider-issued order id.
    pub order_id: OrderId,
    /// Local-format number (calling code stripped when known).
    pub phone_number: LocalNumber,
    /// Number as returned by the provider.
    pub full_number: FullNumber,
    /// Calling code used to derive `phone_number`.
    pub dial_code: Option<DialCode>,
    /// Country the number belongs to.
    pub country: CountryName,
    /// Service the number was bought for.
    pub service: ServiceName,
    /// Operator the order was placed with.
    pub operator: OperatorName,
    /// Price quoted by the selector for `operator`.
    pub price: f64,
    /// Historical success rate of `operator`, if reported.
    pub success_rate: Option<f64>,
    /// Local time the order was confirmed.
    pub created_at: SystemTime,
}

impl Order {
    /// Build an order from a purchase response and the quote it was placed with.
    pub fn from_placement(
        placed: PlacedOrder,
        country: CountryName,
        service: ServiceName,
        quote: PriceQuote,
    ) -> Self {
        let phone_number = LocalNumber::derive(&placed.full_number, placed.dial_code.as_ref());
        Self {
            order_id: placed.order_id,
            phone_number,
            full_number: placed.full_number,
            dial_code: placed.dial_code,
            country,
            service,
            operator: quote.operator,
            price: quote.price,
            success_rate: quote.success_rate,
            created_at: SystemTime::now(),
        }
    }
}

// =============================================================================
// OrderStatus / PollOutcome
// =============================================================================

/// Provider status normalized into one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    /// Waiting for an SMS.
    Pending,
    /// An SMS (or a resend) is in progress; the code may already be visible.
    Received(Option<SmsCode>),
    /// The order completed with a code.
    Finished(SmsCode),
    /// The order was canceled or refunded.
    Canceled,
    /// The number was banned by the target service.
    Banned,
    /// The order ran out of time on the provider side.
    Expired,
    /// A status this crate does not recognize.
    Unknown(String),
}

impl OrderStatus {
    /// No further code can arrive once a terminal status is seen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished(_) | Self::Canceled | Self::Banned | Self::Expired
        )
    }
}

/// Why the provider ended an order without a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The order was canceled.
    Canceled,
    /// The number was banned.
    Banned,
    /// The order expired on the provider side.
    Expired,
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canceled => write!(f, "canceled"),
            Self::Banned => write!(f, "banned"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Terminal result of waiting for a code.
#[derive(Debug)]
pub enum PollOutcome {
    /// The code arrived.
    Success(SmsCode),
    /// The deadline elapsed first.
    TimedOut,
    /// The provider ended the order without a code.
    Rejected(RejectionReason),
    /// A status query failed; polling stopped.
    TransportFailure(ProviderError),
}

impl PollOutcome {
    /// The received code, if any.
    pub fn code(&self) -> Option<&SmsCode> {
        match self {
            Self::Success(code) => Some(code),
            _ => None,
        }
    }

    /// Returns true when the outcome carries a code.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
