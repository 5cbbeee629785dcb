//! Response parsing for the 5sim API.

use super::errors::{FiveSimServiceError, parse_five_sim_error};
use serde::de::DeserializeOwned;

/// A 5sim body is either the expected JSON document or a bare error string.
#[derive(Debug)]
pub enum FiveSimResponse<T> {
    Success(T),
    Error(FiveSimServiceError),
}

impl<T> FiveSimResponse<T> {
    /// Convert response into a Result for ergonomic error handling.
    pub fn into_result(self) -> Result<T, FiveSimServiceError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Error(e) => Err(e),
        }
    }
}

impl<T: DeserializeOwned> FiveSimResponse<T> {
    /// Parse a response body.
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        if let Some(error) = parse_five_sim_error(text) {
            return Ok(Self::Error(error));
        }

        let data = serde_json::from_str::<T>(text)?;
        Ok(Self::Success(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::five_sim::errors::FiveSimErrorCode;
    use crate::providers::five_sim::types::FiveSimOrder;

    #[test]
    fn test_text_body_is_error() {
        let response = FiveSimResponse::<FiveSimOrder>::from_text("no free phones").unwrap();
        match response.into_result() {
            Err(error) => assert_eq!(error.code, FiveSimErrorCode::NoFreePhones),
            Ok(_) => panic!("Expected error"),
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(FiveSimResponse::<FiveSimOrder>::from_text(r#"{"id": }"#).is_err());
    }
}
