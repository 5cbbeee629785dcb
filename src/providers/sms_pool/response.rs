//! Response parsing for the SMSPool API.

use super::errors::rejection;
use crate::errors::OrderError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A parsed SMSPool body.
#[derive(Debug)]
pub enum SmsPoolResponse<T> {
    Success(T),
    Error(OrderError),
}

impl<T> SmsPoolResponse<T> {
    /// Convert response into a Result for ergonomic error handling.
    pub fn into_result(self) -> Result<T, OrderError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Error(e) => Err(e),
        }
    }
}

impl<T: DeserializeOwned> SmsPoolResponse<T> {
    /// Parse a response body.
    ///
    /// A bare text body or a JSON object with a falsy `success` flag is a
    /// failure; anything else must deserialize into `T`.
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        let trimmed = text.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            return Ok(Self::Error(rejection(trimmed)));
        }

        let value: Value = serde_json::from_str(trimmed)?;
        if let Some(message) = failure_message(&value) {
            return Ok(Self::Error(rejection(&message)));
        }

        let data = serde_json::from_value::<T>(value)?;
        Ok(Self::Success(data))
    }
}

fn failure_message(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    let failed = match object.get("success")? {
        Value::Number(n) => n.as_i64() == Some(0),
        Value::String(s) => s.trim() == "0",
        Value::Bool(b) => !b,
        _ => false,
    };
    if !failed {
        return None;
    }

    let message = match object.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => value.to_string(),
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OrderErrorKind;

    #[test]
    fn test_json_failure() {
        let response = SmsPoolResponse::<Value>::from_text(
            r#"{"success": 0, "message": "You do not have enough balance"}"#,
        )
        .unwrap();

        let error = response.into_result().unwrap_err();
        assert_eq!(error.kind, OrderErrorKind::InsufficientBalance);
        assert_eq!(error.message, "You do not have enough balance");
    }

    #[test]
    fn test_text_failure() {
        let response = SmsPoolResponse::<Value>::from_text("No numbers available").unwrap();
        let error = response.into_result().unwrap_err();
        assert_eq!(error.kind, OrderErrorKind::ServiceUnavailableForCountry);
    }

    #[test]
    fn test_success_passes_through() {
        let response =
            SmsPoolResponse::<Value>::from_text(r#"{"success": 1, "order_id": "X"}"#).unwrap();
        assert_eq!(response.into_result().unwrap()["order_id"], "X");
    }
}
