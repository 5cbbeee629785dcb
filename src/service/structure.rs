//! Main service implementation.

use super::config::{PollOptions, SmsOrderServiceConfig, SmsOrderServiceConfigBuilder};
use super::error::SmsOrderServiceError;
use super::poll::{self, PollExit};
use super::submit;
use super::traits::SmsOrderServiceTrait;
use crate::pricing::{PriceQuote, RankingPolicy};
use crate::providers::traits::Provider;
use crate::types::{CountryName, Order, OrderId, PollOutcome, ServiceName};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Generic order service that works with any Provider implementation.
///
/// This service handles the whole fulfillment flow:
/// - Ranking operator prices for a (country, service) pair
/// - Placing the order with the winning operator
/// - Polling for the code under a deadline, cancelling on timeout
///
/// The provider-specific logic is abstracted behind the `Provider` trait.
/// Each call is independent; the service can be shared between concurrent
/// orders.
///
/// # Type Parameters
///
/// - `P`: The provider implementation (e.g., `FiveSimProvider`)
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::{CountryName, ServiceName, SmsOrderService, SmsOrderServiceTrait};
/// use sms_rental::five_sim::{FiveSimClient, FiveSimProvider};
///
/// let client = FiveSimClient::with_api_key("api_key")?;
/// let service = SmsOrderService::with_provider(FiveSimProvider::new(client));
///
/// let country = CountryName::new("england")?;
/// let product = ServiceName::new("telegram")?;
/// let order = service.order_number(&country, &product).await?;
/// println!("Got number: {} (order: {})", order.phone_number, order.order_id);
///
/// let outcome = service.wait_for_code(&order).await;
/// println!("Outcome: {outcome:?}");
/// ```
#[derive(Debug, Clone)]
pub struct SmsOrderService<P: Provider> {
    provider: P,
    config: SmsOrderServiceConfig,
}

impl<P: Provider> SmsOrderService<P> {
    /// Create a new order service with a custom provider and configuration.
    pub fn new(provider: P, config: SmsOrderServiceConfig) -> Self {
        Self { provider, config }
    }

    /// Create a new order service with default configuration.
    pub fn with_provider(provider: P) -> Self {
        Self::new(provider, SmsOrderServiceConfig::default())
    }

    /// Create a new builder for SmsOrderService.
    pub fn builder(provider: P) -> SmsOrderServiceBuilder<P> {
        SmsOrderServiceBuilder::new(provider)
    }

    /// Get reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get reference to the service configuration.
    pub fn config(&self) -> &SmsOrderServiceConfig {
        &self.config
    }

    /// Get mutable reference to the service configuration.
    pub fn config_mut(&mut self) -> &mut SmsOrderServiceConfig {
        &mut self.config
    }

    /// Pick the best operator under an explicit policy.
    pub async fn get_price_with(
        &self,
        country: &CountryName,
        service: &ServiceName,
        policy: RankingPolicy,
    ) -> Result<PriceQuote, SmsOrderServiceError> {
        Ok(submit::quote(&self.provider, country, service, policy).await?)
    }

    /// Price the pair under an explicit policy and order from the winner.
    pub async fn order_number_with(
        &self,
        country: &CountryName,
        service: &ServiceName,
        policy: RankingPolicy,
    ) -> Result<Order, SmsOrderServiceError> {
        #[cfg(feature = "tracing")]
        debug!(policy = %policy, "Requesting phone number");

        let quote = self.get_price_with(country, service, policy).await?;
        self.submit_order(country, service, quote).await
    }

    /// Place one order with an already chosen quote.
    ///
    /// Issues exactly one purchase call; a rejection is returned as is.
    pub async fn submit_order(
        &self,
        country: &CountryName,
        service: &ServiceName,
        quote: PriceQuote,
    ) -> Result<Order, SmsOrderServiceError> {
        Ok(submit::submit(&self.provider, country, service, quote).await?)
    }

    /// Poll with explicit options instead of the configured ones.
    pub async fn wait_for_code_with(&self, order: &Order, options: &PollOptions) -> PollOutcome {
        poll::poll_until_resolved(&self.provider, order, options).await
    }

    /// Poll with the configured options until the order resolves or `token`
    /// is cancelled.
    ///
    /// Cancellation through `token` interrupts the sleep or the in-flight
    /// status query and returns [`SmsOrderServiceError::Cancelled`]. No remote
    /// cancel is issued in that case; the caller still owns the order.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_order.wait_for_code_cancellable",
            skip_all,
            fields(order_id = %order.order_id)
        )
    )]
    pub async fn wait_for_code_cancellable(
        &self,
        order: &Order,
        token: CancellationToken,
    ) -> Result<PollOutcome, SmsOrderServiceError> {
        let run = poll::run(&self.provider, &order.order_id, &self.config.poll, &token).await;

        match run.exit {
            PollExit::Resolved(outcome) => Ok(outcome),
            PollExit::Cancelled => {
                #[cfg(feature = "tracing")]
                info!(
                    poll_count = run.poll_count,
                    elapsed_secs = %run.elapsed.as_secs_f64(),
                    "Polling cancelled by caller"
                );

                Err(SmsOrderServiceError::Cancelled {
                    elapsed: run.elapsed,
                    poll_count: run.poll_count,
                    order_id: order.order_id.clone(),
                })
            }
        }
    }

    /// Mark an order as done after its code was used.
    pub async fn finish_order(&self, order_id: &OrderId) -> Result<(), SmsOrderServiceError> {
        self.provider.finish(order_id).await?;

        #[cfg(feature = "tracing")]
        debug!(order_id = %order_id, "Order finished");

        Ok(())
    }
}

impl<P: Provider> SmsOrderServiceTrait for SmsOrderService<P> {
    type Error = SmsOrderServiceError;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_order.get_price",
            skip_all,
            fields(provider = self.provider.name(), country = %country, service = %service)
        )
    )]
    async fn get_price(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> Result<PriceQuote, Self::Error> {
        self.get_price_with(country, service, self.config.policy)
            .await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_order.order_number",
            skip_all,
            fields(provider = self.provider.name(), country = %country, service = %service)
        )
    )]
    async fn order_number(
        &self,
        country: &CountryName,
        service: &ServiceName,
    ) -> Result<Order, Self::Error> {
        self.order_number_with(country, service, self.config.policy)
            .await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_order.wait_for_code",
            skip_all,
            fields(order_id = %order.order_id)
        )
    )]
    async fn wait_for_code(&self, order: &Order) -> PollOutcome {
        self.wait_for_code_with(order, &self.config.poll).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_order.cancel_order",
            skip_all,
            fields(order_id = %order_id)
        )
    )]
    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), Self::Error> {
        self.provider.cancel(order_id).await?;
        Ok(())
    }
}

/// Builder for SmsOrderService.
///
/// Provides a fluent API for constructing an order service with a provider
/// and custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::{RankingPolicy, SmsOrderService};
/// use std::time::Duration;
///
/// let service = SmsOrderService::builder(provider)
///     .policy(RankingPolicy::HighestSuccessRateFirst)
///     .deadline(Duration::from_secs(300))
///     .poll_interval(Duration::from_secs(5))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct SmsOrderServiceBuilder<P: Provider> {
    provider: P,
    config_builder: SmsOrderServiceConfigBuilder,
}

impl<P: Provider> SmsOrderServiceBuilder<P> {
    /// Create a new builder with the given provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config_builder: SmsOrderServiceConfigBuilder::default(),
        }
    }

    /// Set the ranking policy.
    ///
    /// Default: cheapest first
    pub fn policy(mut self, policy: RankingPolicy) -> Self {
        self.config_builder = self.config_builder.policy(policy);
        self
    }

    /// Set the deadline for waiting for codes.
    ///
    /// Default: 10 minutes
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config_builder = self.config_builder.deadline(deadline);
        self
    }

    /// Set the polling interval when waiting for codes.
    ///
    /// Default: 2 seconds
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config_builder = self.config_builder.poll_interval(interval);
        self
    }

    /// Choose whether timed-out orders are cancelled.
    ///
    /// Default: true
    pub fn cancel_on_timeout(mut self, cancel: bool) -> Self {
        self.config_builder = self.config_builder.cancel_on_timeout(cancel);
        self
    }

    /// Choose whether a code seen with a `Received` status ends polling.
    ///
    /// Default: false
    pub fn complete_on_received(mut self, complete: bool) -> Self {
        self.config_builder = self.config_builder.complete_on_received(complete);
        self
    }

    /// Set the full configuration.
    pub fn config(mut self, config: SmsOrderServiceConfig) -> Self {
        self.config_builder = SmsOrderServiceConfigBuilder {
            policy: config.policy,
            poll: config.poll,
        };
        self
    }

    /// Build the SmsOrderService.
    pub fn build(self) -> SmsOrderService<P> {
        SmsOrderService::new(self.provider, self.config_builder.build())
    }
}
