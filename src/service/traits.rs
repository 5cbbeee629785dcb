//! Service trait definition.

use crate::errors::RetryableError;
use crate::pricing::PriceQuote;
use crate::types::{CountryName, Order, OrderId, PollOutcome, ServiceName};
use std::error::Error as StdError;
use std::future::Future;

/// Trait for order service implementations.
///
/// This trait abstracts the service interface, allowing different
/// service implementations to be used interchangeably.
pub trait SmsOrderServiceTrait: Send + Sync {
    /// The error type for this service.
    type Error: StdError + RetryableError;

    /// Pick the best operator for a (country, service) pair.
    ///
    /// # Arguments
    ///
    /// * `country` - Provider-native country name
    /// * `service` - Provider-native service name
    fn get_price(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> impl Future<Output = Result<PriceQuote, Self::Error>> + Send;

    /// Price the pair and place one order with the winning operator.
    ///
    /// # Returns
    ///
    /// The confirmed order, carrying the phone number and order id.
    fn order_number(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> impl Future<Output = Result<Order, Self::Error>> + Send;

    /// Poll the order until a code arrives, the provider ends it or the
    /// deadline elapses.
    fn wait_for_code(&self, order: &Order) -> impl Future<Output = PollOutcome> + Send;

    /// Cancel an order.
    fn cancel_order(&self, order_id: &OrderId)
    -> impl Future<Output = Result<(), Self::Error>> + Send;
}
