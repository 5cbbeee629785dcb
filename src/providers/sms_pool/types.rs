//! Types for SMSPool API responses.
//!
//! SMSPool is loose with JSON types: ids, prices and status codes arrive as
//! numbers on some endpoints and as strings on others.

use crate::types::{OrderId, OrderStatus, SmsCode};
use serde::{Deserialize, Deserializer, de};
use serde_json::{Number, Value};
use std::fmt::{Display, Formatter};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(Number),
    Text(String),
}

fn de_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Loose::deserialize(d)? {
        Loose::Number(n) => n.to_string(),
        Loose::Text(s) => s,
    })
}

fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Loose>::deserialize(d)? {
        Some(Loose::Number(n)) => Some(n.to_string()),
        Some(Loose::Text(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn de_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Loose::deserialize(d)? {
        Loose::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("number out of range")),
        Loose::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

fn de_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match Loose::deserialize(d)? {
        Loose::Number(n) => n
            .as_i64()
            .ok_or_else(|| de::Error::custom("status is not an integer")),
        Loose::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

/// One entry of `country/retrieve_all`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsPoolCountry {
    /// Display name, e.g. `"United States"`.
    pub name: String,
    /// Short name, e.g. `"US"`.
    #[serde(default)]
    pub short_name: Option<String>,
    /// Calling code, when listed.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub cc: Option<String>,
}

/// One entry of `service/retrieve_all`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsPoolService {
    /// Service name as accepted by the purchase endpoint.
    pub name: String,
}

/// One entry of `request/pricing`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsPoolPrice {
    /// Pool identifier; plays the operator role.
    #[serde(deserialize_with = "de_string")]
    pub pool: String,
    /// Price of one number.
    #[serde(deserialize_with = "de_f64")]
    pub price: f64,
    /// Delivery success rate in percent, when SMSPool reports one.
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub success_rate: Option<f64>,
}

fn de_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// How SMSPool picks a pool when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingOption {
    /// Cheapest pool.
    Cheapest,
    /// Pool with the best delivery rate.
    HighestSuccessRate,
}

impl PricingOption {
    /// Value of the `pricing_option` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cheapest => "0",
            Self::HighestSuccessRate => "1",
        }
    }
}

impl Display for PricingOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Successful `purchase/sms` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsPoolPurchase {
    pub order_id: OrderId,
    /// Number including the calling code.
    #[serde(deserialize_with = "de_string")]
    pub number: String,
    /// Calling code of the number.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub cc: Option<String>,
    /// Number without the calling code.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub phonenumber: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub pool: Option<String>,
}

/// Order status as SMSPool encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsPoolStatus {
    Pending,
    Expired,
    Completed,
    Resend,
    Cancelled,
    Refunded,
    Other(i64),
}

impl SmsPoolStatus {
    /// Parse the numeric status code.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Pending,
            2 => Self::Expired,
            3 => Self::Completed,
            4 => Self::Resend,
            5 => Self::Cancelled,
            6 => Self::Refunded,
            other => Self::Other(other),
        }
    }
}

/// `sms/check` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsPoolCheck {
    #[serde(deserialize_with = "de_i64")]
    pub status: i64,
    /// Extracted code, when an SMS arrived.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub sms: Option<String>,
    /// Full message text.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub full_sms: Option<String>,
    #[serde(default)]
    pub time_left: Option<Value>,
}

impl SmsPoolCheck {
    /// Parsed status.
    pub fn status(&self) -> SmsPoolStatus {
        SmsPoolStatus::from_code(self.status)
    }

    fn code(&self) -> Option<SmsCode> {
        self.sms
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty() && *code != "0")
            .map(SmsCode::from)
    }

    /// Map the native status onto [`OrderStatus`].
    pub fn normalized_status(&self) -> OrderStatus {
        match self.status() {
            SmsPoolStatus::Pending => OrderStatus::Pending,
            SmsPoolStatus::Expired => OrderStatus::Expired,
            SmsPoolStatus::Completed => match self.code() {
                Some(code) => OrderStatus::Finished(code),
                None => OrderStatus::Unknown("3".to_string()),
            },
            SmsPoolStatus::Resend => OrderStatus::Received(self.code()),
            SmsPoolStatus::Cancelled | SmsPoolStatus::Refunded => OrderStatus::Canceled,
            SmsPoolStatus::Other(code) => OrderStatus::Unknown(code.to_string()),
        }
    }
}
