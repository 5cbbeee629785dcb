//! Types for 5sim API responses.

use crate::types::{DialCode, OrderId, OrderStatus, SmsCode};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Order category used in the purchase path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    /// One-off activation number.
    #[default]
    Activation,
    /// Hosting number.
    Hosting,
}

impl Category {
    /// Path segment for the purchase endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Hosting => "hosting",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of `guest/countries`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FiveSimCountry {
    /// Calling-code prefixes, e.g. `{"+7": 1}`.
    #[serde(default)]
    pub prefix: Map<String, Value>,
    /// English display name.
    #[serde(default)]
    pub text_en: Option<String>,
}

impl FiveSimCountry {
    /// Calling code taken from the first prefix key.
    pub fn dial_code(&self) -> Option<DialCode> {
        self.prefix.keys().next().and_then(|p| DialCode::new(p).ok())
    }
}

/// Price entry of one operator in `guest/prices`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FiveSimOperatorPrice {
    /// Price of one number.
    pub cost: f64,
    /// Numbers currently available.
    #[serde(default)]
    pub count: u64,
    /// Delivery success rate in percent; absent for new operators.
    #[serde(default)]
    pub rate: Option<f64>,
}

/// Order status as 5sim spells it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiveSimStatus {
    Pending,
    Received,
    Canceled,
    Timeout,
    Finished,
    Banned,
    Other(String),
}

impl FiveSimStatus {
    /// Parse the status string.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "PENDING" => Self::Pending,
            "RECEIVED" => Self::Received,
            "CANCELED" => Self::Canceled,
            "TIMEOUT" => Self::Timeout,
            "FINISHED" => Self::Finished,
            "BANNED" => Self::Banned,
            other => Self::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FiveSimStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(Self::from_raw(&raw))
    }
}

/// SMS attached to an order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FiveSimSms {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub code: String,
}

/// Order object returned by buy, check, cancel, finish and ban.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FiveSimOrder {
    pub id: OrderId,
    pub phone: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub price: f64,
    pub status: FiveSimStatus,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub sms: Option<Vec<FiveSimSms>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub country: String,
}

impl FiveSimOrder {
    /// Code of the first SMS that carries one.
    pub fn first_code(&self) -> Option<SmsCode> {
        self.sms
            .iter()
            .flatten()
            .map(|sms| sms.code.trim())
            .find(|code| !code.is_empty())
            .map(SmsCode::from)
    }

    /// Map the native status onto [`OrderStatus`].
    pub fn normalized_status(&self) -> OrderStatus {
        match &self.status {
            FiveSimStatus::Pending => OrderStatus::Pending,
            FiveSimStatus::Received => OrderStatus::Received(self.first_code()),
            FiveSimStatus::Finished => match self.first_code() {
                Some(code) => OrderStatus::Finished(code),
                None => OrderStatus::Unknown("FINISHED".to_string()),
            },
            FiveSimStatus::Canceled => OrderStatus::Canceled,
            FiveSimStatus::Banned => OrderStatus::Banned,
            FiveSimStatus::Timeout => OrderStatus::Expired,
            FiveSimStatus::Other(raw) => OrderStatus::Unknown(raw.clone()),
        }
    }
}

/// Page of `user/orders`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FiveSimOrderList {
    #[serde(rename = "Data", default)]
    pub data: Vec<FiveSimOrder>,
    #[serde(rename = "Total", default)]
    pub total: u64,
}
