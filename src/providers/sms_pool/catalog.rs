//! Known countries and services of an SMSPool account.

use super::types::{SmsPoolCountry, SmsPoolService};
use crate::errors::ValidationError;
use crate::types::{CountryName, DialCode, ServiceName};
use std::collections::{HashMap, HashSet};

/// Country and service names accepted by SMSPool.
///
/// A country matches by its display name or its short name.
#[derive(Debug, Clone, Default)]
pub struct SmsPoolCatalog {
    countries: HashSet<String>,
    dial_codes: HashMap<String, DialCode>,
    services: HashSet<String>,
}

impl SmsPoolCatalog {
    /// Build the catalog from the two listing endpoints.
    pub fn new(countries: Vec<SmsPoolCountry>, services: Vec<SmsPoolService>) -> Self {
        let mut catalog = Self::default();

        for country in countries {
            let dial_code = country.cc.as_deref().and_then(|cc| DialCode::new(cc).ok());
            let names = std::iter::once(country.name).chain(country.short_name);
            for name in names {
                if let Some(code) = &dial_code {
                    catalog.dial_codes.insert(name.clone(), code.clone());
                }
                catalog.countries.insert(name);
            }
        }
        catalog.services = services.into_iter().map(|s| s.name).collect();

        catalog
    }

    /// Returns true when `country` is a known name or short name.
    pub fn contains_country(&self, country: &CountryName) -> bool {
        self.countries.contains(country.as_str())
    }

    /// Returns true when `service` is a known service name.
    pub fn contains_service(&self, service: &ServiceName) -> bool {
        self.services.contains(service.as_str())
    }

    /// Calling code listed for `country`.
    pub fn dial_code(&self, country: &CountryName) -> Option<&DialCode> {
        self.dial_codes.get(country.as_str())
    }

    /// Check the country first, then the service.
    pub fn validate(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> Result<(), ValidationError> {
        if !self.contains_country(country) {
            return Err(ValidationError::InvalidCountry {
                message: format!("unknown SMSPool country '{country}'"),
            });
        }
        if !self.contains_service(service) {
            return Err(ValidationError::InvalidService {
                message: format!("unknown SMSPool service '{service}'"),
            });
        }
        Ok(())
    }
}
