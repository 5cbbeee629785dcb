//! 5sim provider implementation.

use super::client::FiveSimClient;
use super::types::{Category, FiveSimStatus};
use crate::errors::{ProviderError, Result};
use crate::pricing::{OperatorPrice, PriceTable};
use crate::providers::traits::Provider;
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    CountryName, DialCode, FullNumber, OperatorName, OrderId, OrderStatus, PlacedOrder,
    ServiceName,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

const CANCEL_ALL_PAUSE: Duration = Duration::from_secs(1);

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// 5sim provider implementation.
///
/// Wraps a [`FiveSimClient`] and implements the generic [`Provider`] trait.
/// Calling-code prefixes from `guest/countries` are fetched once, on the
/// first purchase, and shared by every later order. If that fetch fails the
/// order keeps its full number and the next purchase tries again.
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::five_sim::{FiveSimClient, FiveSimProvider};
/// use sms_rental::SmsOrderService;
///
/// let client = FiveSimClient::with_api_key("your_api_key")?;
/// let service = SmsOrderService::with_provider(FiveSimProvider::new(client));
/// ```
#[derive(Debug)]
pub struct FiveSimProvider<T = HttpTransport> {
    client: FiveSimClient<T>,
    category: Category,
    prefixes: OnceCell<HashMap<String, DialCode>>,
    cancel_pause: Duration,
}

impl<T: Transport> FiveSimProvider<T> {
    /// Create a new provider buying numbers of the client's category.
    pub fn new(client: FiveSimClient<T>) -> Self {
        let category = client.category();
        Self::with_category(client, category)
    }

    /// Create a new provider buying numbers of another category.
    pub fn with_category(client: FiveSimClient<T>, category: Category) -> Self {
        Self {
            client,
            category,
            prefixes: OnceCell::new(),
            cancel_pause: CANCEL_ALL_PAUSE,
        }
    }

    /// Set the pause between cancels in [`cancel_all_received`](Self::cancel_all_received).
    ///
    /// Default: 1 second
    pub fn with_cancel_pause(mut self, pause: Duration) -> Self {
        self.cancel_pause = pause;
        self
    }

    /// Get reference to the inner client.
    pub fn client(&self) -> &FiveSimClient<T> {
        &self.client
    }

    /// The category used for purchases.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Report an order's number as banned by the target service.
    pub async fn ban(&self, order_id: &OrderId) -> Result<()> {
        self.client.ban(order_id).await?;
        Ok(())
    }

    /// Cancel every order of the provider's category that is in `RECEIVED`
    /// state, pausing between cancels.
    ///
    /// A failed cancel is logged and skipped. Returns how many orders were
    /// cancelled.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FiveSimProvider::cancel_all_received",
            skip_all,
            fields(category = %self.category)
        )
    )]
    pub async fn cancel_all_received(&self) -> Result<usize> {
        let orders = self.client.get_orders(self.category).await?;
        let received = orders
            .data
            .iter()
            .filter(|order| order.status == FiveSimStatus::Received);

        let mut cancelled = 0;
        for (i, order) in received.enumerate() {
            if i > 0 {
                tokio::time::sleep(self.cancel_pause).await;
            }
            match self.client.cancel(&order.id).await {
                Ok(_) => cancelled += 1,
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    warn!(order_id = %order.id, error = %_e, "Failed to cancel received order");
                }
            }
        }

        #[cfg(feature = "tracing")]
        debug!(cancelled, total = orders.total, "Cancelled received orders");

        Ok(cancelled)
    }

    /// Calling code for a 5sim country name, when the prefix table is
    /// available.
    async fn dial_code(&self, country: &CountryName) -> Option<DialCode> {
        let prefixes = self
            .prefixes
            .get_or_try_init(|| async {
                let countries = self.client.get_countries().await?;
                Ok::<_, ProviderError>(
                    countries
                        .into_iter()
                        .filter_map(|(name, info)| info.dial_code().map(|code| (name, code)))
                        .collect(),
                )
            })
            .await;

        match prefixes {
            Ok(prefixes) => prefixes.get(country.as_str()).cloned(),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, "Failed to load 5sim country prefixes");
                None
            }
        }
    }
}

impl<T: Transport> Provider for FiveSimProvider<T> {
    fn name(&self) -> &'static str {
        "5sim"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FiveSimProvider::fetch_price_table",
            skip_all,
            fields(country = %country, service = %service)
        )
    )]
    async fn fetch_price_table(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> Result<PriceTable> {
        let prices = self.client.get_prices(country, service).await?;

        Ok(prices
            .into_iter()
            .map(|(operator, price)| {
                (
                    operator,
                    OperatorPrice {
                        cost: price.cost,
                        success_rate: price.rate,
                    },
                )
            })
            .collect())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FiveSimProvider::submit_order",
            skip_all,
            fields(country = %country, service = %service, operator = %operator)
        )
    )]
    async fn submit_order(
        &self,
        country: &CountryName,
        service: &ServiceName,
        operator: &OperatorName,
    ) -> Result<PlacedOrder> {
        let order = self
            .client
            .buy(self.category, country, operator, service)
            .await?;
        let dial_code = self.dial_code(country).await;

        #[cfg(feature = "tracing")]
        debug!(order_id = %order.id, phone = %order.phone, "5sim order placed");

        Ok(PlacedOrder {
            order_id: order.id,
            full_number: FullNumber::new(order.phone),
            dial_code,
        })
    }

    async fn query_status(&self, order_id: &OrderId) -> Result<OrderStatus> {
        let order = self.client.check(order_id).await?;
        Ok(order.normalized_status())
    }

    async fn cancel(&self, order_id: &OrderId) -> Result<()> {
        self.client.cancel(order_id).await?;

        #[cfg(feature = "tracing")]
        debug!(order_id = %order_id, "5sim order canceled");

        Ok(())
    }

    async fn finish(&self, order_id: &OrderId) -> Result<()> {
        self.client.finish(order_id).await?;
        Ok(())
    }
}
