//! SMSPool provider implementation.

use super::catalog::SmsPoolCatalog;
use super::client::SmsPoolClient;
use crate::errors::{ProviderError, Result};
use crate::pricing::{OperatorPrice, PriceTable};
use crate::providers::traits::Provider;
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    CountryName, DialCode, FullNumber, OperatorName, OrderId, OrderStatus, PlacedOrder,
    ServiceName,
};
use tokio::sync::OnceCell;

#[cfg(feature = "tracing")]
use tracing::debug;

/// SMSPool provider implementation.
///
/// Wraps a [`SmsPoolClient`] and implements the generic [`Provider`] trait.
/// Pools play the operator role. The country and service catalog is fetched
/// once, on first use, and every price or purchase call is validated against
/// it before anything is sent.
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::sms_pool::{SmsPoolClient, SmsPoolProvider};
/// use sms_rental::SmsOrderService;
///
/// let client = SmsPoolClient::with_api_key("your_api_key")?;
/// let service = SmsOrderService::with_provider(SmsPoolProvider::new(client));
/// ```
#[derive(Debug)]
pub struct SmsPoolProvider<T = HttpTransport> {
    client: SmsPoolClient<T>,
    catalog: OnceCell<SmsPoolCatalog>,
}

impl<T: Transport> SmsPoolProvider<T> {
    /// Create a new SMSPool provider.
    pub fn new(client: SmsPoolClient<T>) -> Self {
        Self {
            client,
            catalog: OnceCell::new(),
        }
    }

    /// Get reference to the inner client.
    pub fn client(&self) -> &SmsPoolClient<T> {
        &self.client
    }

    /// The country and service catalog, fetched on first call.
    ///
    /// A failed fetch is returned to the caller and retried on the next call.
    pub async fn catalog(&self) -> Result<&SmsPoolCatalog> {
        self.catalog
            .get_or_try_init(|| async {
                let (countries, services) =
                    tokio::try_join!(self.client.get_countries(), self.client.get_services())?;

                #[cfg(feature = "tracing")]
                debug!(
                    countries = countries.len(),
                    services = services.len(),
                    "SMSPool catalog loaded"
                );

                Ok::<_, ProviderError>(SmsPoolCatalog::new(countries, services))
            })
            .await
    }

    /// Ask SMSPool for another SMS on the order's number.
    pub async fn resend(&self, order_id: &OrderId) -> Result<()> {
        self.client.resend_sms(order_id).await?;
        Ok(())
    }
}

impl<T: Transport> Provider for SmsPoolProvider<T> {
    fn name(&self) -> &'static str {
        "smspool"
    }

    async fn validate_request(&self, country: &CountryName, service: &ServiceName) -> Result<()> {
        self.catalog().await?.validate(country, service)?;
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsPoolProvider::fetch_price_table",
            skip_all,
            fields(country = %country, service = %service)
        )
    )]
    async fn fetch_price_table(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> Result<PriceTable> {
        self.validate_request(country, service).await?;
        let prices = self.client.get_pricing(country, service).await?;

        Ok(prices
            .into_iter()
            .map(|entry| {
                (
                    OperatorName::new(entry.pool),
                    OperatorPrice {
                        cost: entry.price,
                        success_rate: entry.success_rate,
                    },
                )
            })
            .collect())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsPoolProvider::submit_order",
            skip_all,
            fields(country = %country, service = %service, pool = %operator)
        )
    )]
    async fn submit_order(
        &self,
        country: &CountryName,
        service: &ServiceName,
        operator: &OperatorName,
    ) -> Result<PlacedOrder> {
        self.validate_request(country, service).await?;
        let purchase = self
            .client
            .purchase_sms(country, service, Some(operator.as_str()))
            .await?;

        let dial_code = match purchase.cc.as_deref().and_then(|cc| DialCode::new(cc).ok()) {
            Some(code) => Some(code),
            None => self.catalog().await?.dial_code(country).cloned(),
        };

        #[cfg(feature = "tracing")]
        debug!(order_id = %purchase.order_id, number = %purchase.number, "SMSPool order placed");

        Ok(PlacedOrder {
            order_id: purchase.order_id,
            full_number: FullNumber::new(purchase.number),
            dial_code,
        })
    }

    async fn query_status(&self, order_id: &OrderId) -> Result<OrderStatus> {
        let check = self.client.check_sms(order_id).await?;
        Ok(check.normalized_status())
    }

    async fn cancel(&self, order_id: &OrderId) -> Result<()> {
        self.client.cancel_sms(order_id).await?;

        #[cfg(feature = "tracing")]
        debug!(order_id = %order_id, "SMSPool order canceled");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use crate::utils::retry::RetryConfig;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_catalog(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/country/retrieve_all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"ID": 1, "name": "United States", "short_name": "US", "cc": "1"},
                {"ID": 2, "name": "United Kingdom", "short_name": "GB"}
            ])))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/service/retrieve_all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"ID": 1, "name": "Telegram"},
                {"ID": 2, "name": "Discord"}
            ])))
            .expect(1)
            .mount(server)
            .await;
    }

    fn provider(server: &MockServer) -> SmsPoolProvider {
        let client = SmsPoolClient::builder("pool_key")
            .endpoint(Url::parse(&server.uri()).unwrap())
            .retry_config(RetryConfig::disabled())
            .build()
            .unwrap();
        SmsPoolProvider::new(client)
    }

    #[tokio::test]
    async fn test_concurrent_validation_shares_one_catalog_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/country/retrieve_all"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([
                        {"ID": 1, "name": "United States", "short_name": "US", "cc": "1"}
                    ]))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/service/retrieve_all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"ID": 1, "name": "Telegram"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let us = CountryName::new("US").unwrap();
        let atlantis = CountryName::new("Atlantis").unwrap();
        let telegram = ServiceName::new("Telegram").unwrap();

        let (known, unknown) = tokio::join!(
            provider.validate_request(&us, &telegram),
            provider.validate_request(&atlantis, &telegram),
        );

        assert!(known.is_ok());
        assert!(matches!(
            unknown,
            Err(ProviderError::Validation(ValidationError::InvalidCountry { .. }))
        ));
    }

    #[tokio::test]
    async fn test_invalid_country_before_remote_call() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        Mock::given(method("GET"))
            .and(path("/request/pricing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let result = provider
            .fetch_price_table(
                &CountryName::new("Atlantis").unwrap(),
                &ServiceName::new("Telegram").unwrap(),
            )
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::Validation(ValidationError::InvalidCountry { .. }))
        ));

        let result = provider
            .fetch_price_table(
                &CountryName::new("US").unwrap(),
                &ServiceName::new("Myspace").unwrap(),
            )
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::Validation(ValidationError::InvalidService { .. }))
        ));
    }

    #[tokio::test]
    async fn test_price_table_from_pools() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        Mock::given(method("GET"))
            .and(path("/request/pricing"))
            .and(query_param("country", "US"))
            .and(query_param("service", "Telegram"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"pool": 1, "price": "0.45", "success_rate": "72.1"},
                {"pool": 7, "price": "0.30", "success_rate": "91"}
            ])))
            .mount(&server)
            .await;

        let table = provider(&server)
            .fetch_price_table(
                &CountryName::new("US").unwrap(),
                &ServiceName::new("Telegram").unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&OperatorName::from("7")).unwrap().cost, 0.30);
    }

    #[tokio::test]
    async fn test_dial_code_from_catalog_when_response_lacks_cc() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        Mock::given(method("GET"))
            .and(path("/purchase/sms"))
            .and(query_param("pool", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": 1,
                "number": "16136001234",
                "order_id": "ABCDEFG"
            })))
            .mount(&server)
            .await;

        let placed = provider(&server)
            .submit_order(
                &CountryName::new("US").unwrap(),
                &ServiceName::new("Telegram").unwrap(),
                &OperatorName::from("7"),
            )
            .await
            .unwrap();

        assert_eq!(placed.order_id.as_str(), "ABCDEFG");
        assert_eq!(placed.dial_code, Some(DialCode::new("1").unwrap()));
    }

    #[tokio::test]
    async fn test_no_dial_code_keeps_full_number() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        Mock::given(method("GET"))
            .and(path("/purchase/sms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": 1,
                "number": "447700900123",
                "order_id": "HIJKLMN"
            })))
            .mount(&server)
            .await;

        let placed = provider(&server)
            .submit_order(
                &CountryName::new("GB").unwrap(),
                &ServiceName::new("Discord").unwrap(),
                &OperatorName::from("2"),
            )
            .await
            .unwrap();

        assert_eq!(placed.dial_code, None);
        assert_eq!(placed.full_number.as_str(), "447700900123");
    }
}
