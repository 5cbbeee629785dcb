//! SMSPool HTTP client.

use super::response::SmsPoolResponse;
use super::types::{PricingOption, SmsPoolCheck, SmsPoolCountry, SmsPoolPrice, SmsPoolPurchase, SmsPoolService};
use crate::errors::{ProviderError, Result, ValidationError};
use crate::transport::{Auth, HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::types::{CountryName, OrderId, ServiceName};
use crate::utils::retry::RetryConfig;
use reqwest_middleware::ClientWithMiddleware;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default SMSPool API URL.
pub const DEFAULT_API_URL: &str = "https://api.smspool.net";

/// Purchase parameters applied to every `purchase/sms` call unless the call
/// overrides them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmsPoolOrderDefaults {
    /// Pool to buy from when no operator is chosen.
    pub pool: Option<String>,
    /// Highest price accepted.
    pub max_price: Option<f64>,
    /// How SMSPool picks a pool on its own.
    pub pricing_option: Option<PricingOption>,
    /// Requested area code.
    pub area_code: Option<String>,
}

/// SMSPool HTTP client.
///
/// The API key travels as the `key` query parameter on every request.
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::sms_pool::SmsPoolClient;
///
/// let client = SmsPoolClient::with_api_key("your_api_key")?;
/// let check = client.check_sms(&"ABCDEFG".into()).await?;
/// println!("{:?}", check.normalized_status());
/// ```
#[derive(Clone)]
pub struct SmsPoolClient<T = HttpTransport> {
    transport: T,
    api_key: SecretString,
    endpoint: Url,
    defaults: SmsPoolOrderDefaults,
}

impl<T> std::fmt::Debug for SmsPoolClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsPoolClient")
            .field("endpoint", &self.endpoint)
            .field("defaults", &self.defaults)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`SmsPoolClient`].
pub struct SmsPoolClientBuilder {
    api_key: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    retry_config: RetryConfig,
    defaults: SmsPoolOrderDefaults,
}

impl SmsPoolClientBuilder {
    /// Create a new builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: None,
            http_client: None,
            retry_config: RetryConfig::default(),
            defaults: SmsPoolOrderDefaults::default(),
        }
    }

    /// Set a custom API endpoint.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set a custom HTTP client with middleware.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the low-level retry behavior.
    pub fn retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Default pool for purchases.
    pub fn pool(mut self, pool: impl Into<String>) -> Self {
        self.defaults.pool = Some(pool.into());
        self
    }

    /// Highest price accepted for a purchase.
    pub fn max_price(mut self, max_price: f64) -> Self {
        self.defaults.max_price = Some(max_price);
        self
    }

    /// Pool selection strategy used by SMSPool.
    pub fn pricing_option(mut self, option: PricingOption) -> Self {
        self.defaults.pricing_option = Some(option);
        self
    }

    /// Requested area code.
    pub fn area_code(mut self, area_code: impl Into<String>) -> Self {
        self.defaults.area_code = Some(area_code.into());
        self
    }

    /// Build the [`SmsPoolClient`] over a pooled HTTP transport.
    pub fn build(self) -> Result<SmsPoolClient> {
        let transport = match self.http_client.clone() {
            Some(client) => HttpTransport::with_client(client),
            None => HttpTransport::new()?,
        }
        .with_retry_config(self.retry_config.clone());

        self.build_with_transport(transport)
    }

    /// Build the [`SmsPoolClient`] over any [`Transport`].
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<SmsPoolClient<T>> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::configuration("SMSPool API key not provided"));
        }

        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None => Url::parse(DEFAULT_API_URL).expect("Invalid default URL"),
        };
        if endpoint.cannot_be_a_base() {
            return Err(ProviderError::configuration(format!(
                "invalid SMSPool endpoint: {endpoint}"
            )));
        }

        Ok(SmsPoolClient {
            transport,
            api_key: SecretString::from(api_key.to_string()),
            endpoint,
            defaults: self.defaults,
        })
    }
}

impl SmsPoolClient {
    /// Create a new client with the default API URL.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> SmsPoolClientBuilder {
        SmsPoolClientBuilder::new(api_key)
    }
}

fn require(field: &'static str, value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

fn require_positive(field: &'static str, value: u32) -> std::result::Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::Invalid {
            field,
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

impl<T: Transport> SmsPoolClient<T> {
    /// Purchase defaults configured on the builder.
    pub fn defaults(&self) -> &SmsPoolOrderDefaults {
        &self.defaults
    }

    fn request(&self, path: &str) -> HttpRequest {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path.split('/'));
        }
        HttpRequest::get(url).auth(Auth::Query {
            name: "key",
            value: self.api_key.clone(),
        })
    }

    /// Send a request and parse the body as `D`, mapping failures.
    async fn call<D: DeserializeOwned>(&self, request: HttpRequest, endpoint: &str) -> Result<D> {
        let HttpResponse { status, body } = self.transport.send(request).await?;

        #[cfg(feature = "tracing")]
        debug!(endpoint = %endpoint, status = status, "SMSPool response");

        if matches!(status, 401 | 403) {
            return Err(ProviderError::configuration(format!(
                "SMSPool rejected the API key ({endpoint}, HTTP {status})"
            )));
        }

        let response = SmsPoolResponse::<D>::from_text(&body)
            .map_err(|_| ProviderError::unexpected(endpoint, body.as_str()))?;
        Ok(response.into_result()?)
    }

    /// All countries SMSPool sells numbers for.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SmsPoolClient::get_countries", skip_all)
    )]
    pub async fn get_countries(&self) -> Result<Vec<SmsPoolCountry>> {
        self.call(self.request("country/retrieve_all"), "country/retrieve_all")
            .await
    }

    /// All services SMSPool sells numbers for.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SmsPoolClient::get_services", skip_all)
    )]
    pub async fn get_services(&self) -> Result<Vec<SmsPoolService>> {
        self.call(self.request("service/retrieve_all"), "service/retrieve_all")
            .await
    }

    /// Pool prices for one (country, service) pair.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsPoolClient::get_pricing",
            skip_all,
            fields(country = %country, service = %service)
        )
    )]
    pub async fn get_pricing(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> Result<Vec<SmsPoolPrice>> {
        let request = self
            .request("request/pricing")
            .param("country", country)
            .param("service", service);
        let prices: Vec<SmsPoolPrice> = self.call(request, "request/pricing").await?;

        #[cfg(feature = "tracing")]
        Span::current().set_status(Status::Ok);

        Ok(prices)
    }

    /// Buy a number. `pool` overrides the default pool.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsPoolClient::purchase_sms",
            skip_all,
            fields(
                country = %country,
                service = %service,
                pool = tracing::field::Empty,
                order_id = tracing::field::Empty
            )
        )
    )]
    pub async fn purchase_sms(
        &self,
        country: &CountryName,
        service: &ServiceName,
        pool: Option<&str>,
    ) -> Result<SmsPoolPurchase> {
        let pool = pool.or(self.defaults.pool.as_deref());
        let request = self
            .request("purchase/sms")
            .param("country", country)
            .param("service", service)
            .optional_param("pool", pool)
            .optional_param("max_price", self.defaults.max_price)
            .optional_param("pricing_option", self.defaults.pricing_option)
            .optional_param("area_code", self.defaults.area_code.as_deref());

        let purchase: SmsPoolPurchase = self.call(request, "purchase/sms").await?;

        #[cfg(feature = "tracing")]
        {
            let span = Span::current();
            if let Some(pool) = pool {
                span.record("pool", pool);
            }
            span.record("order_id", purchase.order_id.as_str())
                .set_status(Status::Ok);
        }

        Ok(purchase)
    }

    /// Current status of an order.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SmsPoolClient::check_sms", skip_all, fields(order_id = %order_id))
    )]
    pub async fn check_sms(&self, order_id: &OrderId) -> Result<SmsPoolCheck> {
        let request = self.request("sms/check").param("orderid", order_id);
        self.call(request, "sms/check").await
    }

    /// Cancel an order.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SmsPoolClient::cancel_sms", skip_all, fields(order_id = %order_id))
    )]
    pub async fn cancel_sms(&self, order_id: &OrderId) -> Result<Value> {
        let request = self.request("sms/cancel").param("orderid", order_id);
        self.call(request, "sms/cancel").await
    }

    /// Ask for another SMS on the same number.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SmsPoolClient::resend_sms", skip_all, fields(order_id = %order_id))
    )]
    pub async fn resend_sms(&self, order_id: &OrderId) -> Result<Value> {
        let request = self.request("sms/resend").param("orderid", order_id);
        self.call(request, "sms/resend").await
    }

    /// Orders that are still open on the account.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SmsPoolClient::get_active_orders", skip_all)
    )]
    pub async fn get_active_orders(&self) -> Result<Value> {
        self.call(self.request("request/active"), "request/active")
            .await
    }

    /// Archive every order that is no longer active.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SmsPoolClient::archive_inactive_orders", skip_all)
    )]
    pub async fn archive_inactive_orders(&self) -> Result<Value> {
        self.call(self.request("request/archive"), "request/archive")
            .await
    }

    /// Rentals available for `rental_type`.
    pub async fn get_rentals(&self, rental_type: &str) -> Result<Value> {
        require("type", rental_type)?;
        let request = self.request("rental/retrieve_all").param("type", rental_type);
        self.call(request, "rental/retrieve_all").await
    }

    /// Rent number `id` for `days` days.
    pub async fn order_rental(&self, id: &str, days: u32, service_id: &str) -> Result<Value> {
        require("id", id)?;
        require_positive("days", days)?;
        require("service_id", service_id)?;
        let request = self
            .request("purchase/rental")
            .param("id", id)
            .param("days", days)
            .param("service_id", service_id);
        self.call(request, "purchase/rental").await
    }

    /// Messages received by a rental.
    pub async fn get_rental_messages(&self, rental_code: &str) -> Result<Value> {
        require("rental_code", rental_code)?;
        let request = self
            .request("rental/retrieve_messages")
            .param("rental_code", rental_code);
        self.call(request, "rental/retrieve_messages").await
    }

    /// Status of a rental.
    pub async fn get_rental_status(&self, rental_code: &str) -> Result<Value> {
        require("rental_code", rental_code)?;
        let request = self
            .request("rental/retrieve_status.php")
            .param("rental_code", rental_code);
        self.call(request, "rental/retrieve_status.php").await
    }

    /// Extend a rental by `days` days.
    pub async fn extend_rental(&self, rental_code: &str, days: u32) -> Result<Value> {
        require("rental_code", rental_code)?;
        require_positive("days", days)?;
        let request = self
            .request("rental/extend.php")
            .param("rental_code", rental_code)
            .param("days", days);
        self.call(request, "rental/extend.php").await
    }
}
