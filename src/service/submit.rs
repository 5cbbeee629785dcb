//! Price lookup and order placement.

use crate::errors::{ProviderError, Result, ValidationError};
use crate::pricing::{PriceQuote, RankingPolicy, select_best_operator};
use crate::providers::traits::Provider;
use crate::types::{CountryName, Order, ServiceName};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Validate the pair, fetch a fresh price table and pick one operator.
///
/// An empty table, or one where no operator beats the policy's starting
/// point, means nothing can be ordered for this service here.
pub(crate) async fn quote<P: Provider>(
    provider: &P,
    country: &CountryName,
    service: &ServiceName,
    policy: RankingPolicy,
) -> Result<PriceQuote> {
    provider.validate_request(country, service).await?;
    let table = provider.fetch_price_table(country, service).await?;

    #[cfg(feature = "tracing")]
    debug!(operators = table.len(), policy = %policy, "Price table fetched");

    select_best_operator(&table, policy).ok_or_else(|| {
        ProviderError::from(ValidationError::InvalidService {
            message: format!("no operator offers {service} in {country} under {policy}"),
        })
    })
}

/// Place exactly one order with the quoted operator.
pub(crate) async fn submit<P: Provider>(
    provider: &P,
    country: &CountryName,
    service: &ServiceName,
    quote: PriceQuote,
) -> Result<Order> {
    let placed = provider
        .submit_order(country, service, &quote.operator)
        .await?;
    let order = Order::from_placement(placed, country.clone(), service.clone(), quote);

    #[cfg(feature = "tracing")]
    info!(
        order_id = %order.order_id,
        phone_number = %order.phone_number,
        operator = %order.operator,
        price = order.price,
        "Order placed"
    );

    Ok(order)
}
