//! 5sim HTTP client.

use super::errors::classify_price_error;
use super::response::FiveSimResponse;
use super::types::{
    Category, FiveSimCountry, FiveSimOperatorPrice, FiveSimOrder, FiveSimOrderList,
};
use crate::errors::{ProviderError, Result, ValidationError};
use crate::transport::{Auth, HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::types::{CountryName, OperatorName, OrderId, ServiceName};
use crate::utils::retry::RetryConfig;
use reqwest_middleware::ClientWithMiddleware;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default 5sim API URL.
pub const DEFAULT_API_URL: &str = "https://5sim.net/v1";

/// 5sim HTTP client.
///
/// Authenticates with a bearer token. Every method maps one endpoint; the
/// provider layer turns the results into the shared vocabulary.
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::five_sim::FiveSimClient;
///
/// let client = FiveSimClient::with_api_key("your_api_key")?;
/// let order = client.check(&"53533933".into()).await?;
/// println!("{} is {:?}", order.phone, order.status);
/// ```
#[derive(Clone)]
pub struct FiveSimClient<T = HttpTransport> {
    transport: T,
    api_key: SecretString,
    endpoint: Url,
    category: Category,
}

impl<T> std::fmt::Debug for FiveSimClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiveSimClient")
            .field("endpoint", &self.endpoint)
            .field("category", &self.category)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`FiveSimClient`].
pub struct FiveSimClientBuilder {
    api_key: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    retry_config: RetryConfig,
    category: Category,
}

impl FiveSimClientBuilder {
    /// Create a new builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: None,
            http_client: None,
            retry_config: RetryConfig::default(),
            category: Category::default(),
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

    /// Set the default order category (activation or hosting).
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Build the [`FiveSimClient`] over a pooled HTTP transport.
    pub fn build(self) -> Result<FiveSimClient> {
        let transport = match self.http_client.clone() {
            Some(client) => HttpTransport::with_client(client),
            None => HttpTransport::new()?,
        }
        .with_retry_config(self.retry_config.clone());

        self.build_with_transport(transport)
    }

    /// Build the [`FiveSimClient`] over any [`Transport`].
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<FiveSimClient<T>> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::configuration("5sim API key not provided"));
        }

        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None => Url::parse(DEFAULT_API_URL).expect("Invalid default URL"),
        };
        if endpoint.cannot_be_a_base() {
            return Err(ProviderError::configuration(format!(
                "invalid 5sim endpoint: {endpoint}"
            )));
        }

        Ok(FiveSimClient {
            transport,
            api_key: SecretString::from(api_key.to_string()),
            endpoint,
            category: self.category,
        })
    }
}

impl FiveSimClient {
    /// Create a new 5sim client.
    ///
    /// # Arguments
    /// * `endpoint` - Base URL for the 5sim API
    /// * `api_key` - API key for authentication
    pub fn new(endpoint: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let url = Url::parse(endpoint.as_ref())
            .map_err(|e| ProviderError::configuration(format!("invalid 5sim endpoint: {e}")))?;

        Self::builder(api_key).endpoint(url).build()
    }

    /// Create a new client with the default API URL.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> FiveSimClientBuilder {
        FiveSimClientBuilder::new(api_key)
    }
}

impl<T: Transport> FiveSimClient<T> {
    /// Default order category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Build the URL for `segments` below the endpoint.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, segments: &[&str]) -> HttpRequest {
        HttpRequest::get(self.url(segments))
            .header("Accept", "application/json")
            .auth(Auth::Bearer(self.api_key.clone()))
    }

    /// Send a request and return the body, mapping auth failures.
    async fn send_request(&self, request: HttpRequest, endpoint: &str) -> Result<String> {
        let HttpResponse { status, body } = self.transport.send(request).await?;

        #[cfg(feature = "tracing")]
        debug!(endpoint = %endpoint, status = status, "5sim response");

        if matches!(status, 401 | 403) {
            return Err(ProviderError::configuration(format!(
                "5sim rejected the API key ({endpoint}, HTTP {status})"
            )));
        }
        if body.trim().is_empty() {
            return Err(ProviderError::unexpected(endpoint, format!("HTTP {status}")));
        }
        Ok(body)
    }

    /// Parse an endpoint body that is either `D` or an error string.
    fn parse<D: DeserializeOwned>(endpoint: &str, text: &str) -> Result<D> {
        let response = FiveSimResponse::<D>::from_text(text)
            .map_err(|_| ProviderError::unexpected(endpoint, text))?;
        Ok(response.into_result()?)
    }

    /// Country metadata keyed by 5sim country name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "FiveSimClient::get_countries", skip_all)
    )]
    pub async fn get_countries(&self) -> Result<HashMap<String, FiveSimCountry>> {
        let text = self
            .send_request(self.request(&["guest", "countries"]), "guest/countries")
            .await?;
        Self::parse("guest/countries", &text)
    }

    /// Operator prices for one (country, product) pair, in source order.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FiveSimClient::get_prices",
            skip_all,
            fields(country = %country, product = %product)
        )
    )]
    pub async fn get_prices(
        &self,
        country: &CountryName,
        product: &ServiceName,
    ) -> Result<Vec<(OperatorName, FiveSimOperatorPrice)>> {
        let request = self
            .request(&["guest", "prices"])
            .param("product", product)
            .param("country", country);
        let text = self.send_request(request, "guest/prices").await?;

        let info: Value = FiveSimResponse::<Value>::from_text(&text)
            .map_err(|_| ProviderError::unexpected("guest/prices", text.as_str()))?
            .into_result()
            .map_err(classify_price_error)?;

        let Some(by_product) = info.get(country.as_str()) else {
            return Err(ValidationError::InvalidCountry { message: text }.into());
        };
        let Some(operators) = by_product.get(product.as_str()).and_then(Value::as_object) else {
            return Err(ValidationError::InvalidService { message: text }.into());
        };

        let mut prices = Vec::with_capacity(operators.len());
        for (operator, entry) in operators {
            match serde_json::from_value::<FiveSimOperatorPrice>(entry.clone()) {
                Ok(price) => prices.push((OperatorName::new(operator.as_str()), price)),
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    debug!(operator = %operator, error = %_e, "Skipping unparsable price entry");
                }
            }
        }

        #[cfg(feature = "tracing")]
        Span::current().set_status(Status::Ok);

        Ok(prices)
    }

    /// Buy a number.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FiveSimClient::buy",
            skip_all,
            fields(
                category = %category,
                country = %country,
                operator = %operator,
                product = %product,
                order_id = tracing::field::Empty
            )
        )
    )]
    pub async fn buy(
        &self,
        category: Category,
        country: &CountryName,
        operator: &OperatorName,
        product: &ServiceName,
    ) -> Result<FiveSimOrder> {
        let request = self.request(&[
            "user",
            "buy",
            category.as_str(),
            country.as_str(),
            operator.as_str(),
            product.as_str(),
        ]);
        let text = self.send_request(request, "user/buy").await?;
        let order: FiveSimOrder = Self::parse("user/buy", &text)?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("order_id", order.id.as_str())
                .set_status(Status::Ok);
        }

        Ok(order)
    }

    /// Fetch an order with its current status and SMS list.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "FiveSimClient::check", skip_all, fields(order_id = %id))
    )]
    pub async fn check(&self, id: &OrderId) -> Result<FiveSimOrder> {
        self.order_action("check", id).await
    }

    /// Cancel an order.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "FiveSimClient::cancel", skip_all, fields(order_id = %id))
    )]
    pub async fn cancel(&self, id: &OrderId) -> Result<FiveSimOrder> {
        self.order_action("cancel", id).await
    }

    /// Mark an order as finished.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "FiveSimClient::finish", skip_all, fields(order_id = %id))
    )]
    pub async fn finish(&self, id: &OrderId) -> Result<FiveSimOrder> {
        self.order_action("finish", id).await
    }

    /// Report the number as banned by the target service.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "FiveSimClient::ban", skip_all, fields(order_id = %id))
    )]
    pub async fn ban(&self, id: &OrderId) -> Result<FiveSimOrder> {
        self.order_action("ban", id).await
    }

    /// Orders of one category, most recent first as 5sim lists them.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FiveSimClient::get_orders",
            skip_all,
            fields(category = %category)
        )
    )]
    pub async fn get_orders(&self, category: Category) -> Result<FiveSimOrderList> {
        let request = self
            .request(&["user", "orders"])
            .param("category", category.as_str());
        let text = self.send_request(request, "user/orders").await?;
        Self::parse("user/orders", &text)
    }

    async fn order_action(&self, action: &str, id: &OrderId) -> Result<FiveSimOrder> {
        let endpoint = format!("user/{action}");
        let text = self
            .send_request(self.request(&["user", action, id.as_str()]), &endpoint)
            .await?;
        Self::parse(&endpoint, &text)
    }
}
