//! Provider trait definition.

use crate::errors::Result;
use crate::pricing::PriceTable;
use crate::types::{CountryName, OperatorName, OrderId, OrderStatus, PlacedOrder, ServiceName};
use std::future::Future;

/// Capability set every SMS rental provider adapter implements.
///
/// Adapters translate these generic operations into their service's request
/// shapes and normalize whatever comes back:
/// - prices into a [`PriceTable`]
/// - purchases into a [`PlacedOrder`]
/// - native status codes into [`OrderStatus`]
/// - declines into [`crate::ProviderError::Rejected`] with a best-effort
///   [`crate::OrderErrorKind`]
///
/// Adapters never retry business rejections; transient HTTP failures are
/// retried below them by the [`crate::transport::Transport`].
///
/// # Note on async methods
///
/// All async methods in this trait return `Send` futures, making them
/// compatible with multi-threaded executors.
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::{Provider, PriceTable, PlacedOrder, OrderStatus, OrderId};
///
/// struct MyProvider { /* ... */ }
///
/// impl Provider for MyProvider {
///     fn name(&self) -> &'static str { "my-provider" }
///
///     async fn fetch_price_table(&self, country: &CountryName, service: &ServiceName) -> Result<PriceTable> {
///         // Fetch operator prices for the pair
///     }
///
///     async fn submit_order(&self, country: &CountryName, service: &ServiceName, operator: &OperatorName) -> Result<PlacedOrder> {
///         // Buy a number
///     }
///
///     async fn query_status(&self, order_id: &OrderId) -> Result<OrderStatus> {
///         // Map native status onto OrderStatus
///     }
///
///     async fn cancel(&self, order_id: &OrderId) -> Result<()> {
///         // Cancel the order
///     }
/// }
/// ```
pub trait Provider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Check `country` and `service` before any remote price or purchase
    /// call.
    ///
    /// Adapters holding a catalog validate against it and return
    /// [`crate::ValidationError::InvalidCountry`] or
    /// [`crate::ValidationError::InvalidService`]. The default accepts
    /// everything and leaves classification to the remote price endpoint.
    fn validate_request(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> impl Future<Output = Result<()>> + Send {
        let _ = (country, service);
        async { Ok(()) }
    }

    /// Fetch a fresh operator price table for the pair.
    fn fetch_price_table(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> impl Future<Output = Result<PriceTable>> + Send;

    /// Issue exactly one purchase call for `operator`.
    fn submit_order(
        &self,
        country: &CountryName,
        service: &ServiceName,
        operator: &OperatorName,
    ) -> impl Future<Output = Result<PlacedOrder>> + Send;

    /// Query the current status of an order.
    fn query_status(&self, order_id: &OrderId) -> impl Future<Output = Result<OrderStatus>> + Send;

    /// Cancel an order.
    fn cancel(&self, order_id: &OrderId) -> impl Future<Output = Result<()>> + Send;

    /// Mark an order as done after its code was used.
    ///
    /// Default implementation does nothing, for providers that close orders
    /// on their own.
    fn finish(&self, order_id: &OrderId) -> impl Future<Output = Result<()>> + Send {
        let _ = order_id;
        async { Ok(()) }
    }
}
