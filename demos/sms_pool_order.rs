//! Order an SMSPool number from the pool with the best success rate.
//!
//! # Running
//!
//! ```bash
//! SMSPOOL_API_KEY=your_api_key cargo run --example sms_pool_order
//! ```

use sms_rental::sms_pool::{SmsPoolClient, SmsPoolProvider};
use sms_rental::{
    CountryName, PollOutcome, RankingPolicy, ServiceName, SmsOrderService, SmsOrderServiceTrait,
};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key =
        env::var("SMSPOOL_API_KEY").expect("SMSPOOL_API_KEY environment variable must be set");

    let client = SmsPoolClient::with_api_key(api_key)?;
    let provider = SmsPoolProvider::new(client);

    // Country and service names are checked against the account catalog
    // before any pricing request is sent.
    let catalog = provider.catalog().await?;
    let country = CountryName::new("US")?;
    let product = ServiceName::new("Telegram")?;
    catalog.validate(&country, &product)?;

    let service = SmsOrderService::builder(provider)
        .policy(RankingPolicy::HighestSuccessRateFirst)
        .poll_interval(Duration::from_secs(3))
        .deadline(Duration::from_secs(5 * 60))
        .build();

    let order = service.order_number(&country, &product).await?;
    println!("Got phone number {} from pool {}", order.phone_number, order.operator);
    println!("Order ID: {}", order.order_id);

    println!("\nWaiting for SMS code...");
    match service.wait_for_code(&order).await {
        PollOutcome::Success(code) => println!("Received SMS code: {code}"),
        other => println!("No code: {other:?}"),
    }

    Ok(())
}
