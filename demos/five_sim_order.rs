//! Order a 5sim number and wait for the verification code.
//!
//! # Running
//!
//! ```bash
//! FIVESIM_API_KEY=your_api_key cargo run --example five_sim_order
//! ```

use sms_rental::five_sim::{FiveSimClient, FiveSimProvider};
use sms_rental::{
    CountryName, PollOutcome, RankingPolicy, ServiceName, SmsOrderService, SmsOrderServiceConfig,
    SmsOrderServiceTrait,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key =
        env::var("FIVESIM_API_KEY").expect("FIVESIM_API_KEY environment variable must be set");

    let client = FiveSimClient::with_api_key(api_key)?;
    let provider = FiveSimProvider::new(client);

    // Quick preset: 1s polling, 2 minute deadline
    let config = SmsOrderServiceConfig::quick().with_policy(RankingPolicy::HighestSuccessRateFirst);
    config.validate()?;

    let service = SmsOrderService::new(provider, config);

    let country = CountryName::new("england")?;
    let product = ServiceName::new("telegram")?;

    let quote = service.get_price(&country, &product).await?;
    match quote.success_rate {
        Some(rate) => println!(
            "Best operator: {} (cost {}, success rate {rate}%)",
            quote.operator, quote.price
        ),
        None => println!("Best operator: {} (cost {})", quote.operator, quote.price),
    }

    let order = service.submit_order(&country, &product, quote).await?;
    println!("Got phone number:");
    println!("  Order ID: {}", order.order_id);
    println!("  Full number: {}", order.full_number);
    println!("  Local number: {}", order.phone_number);

    println!("\nWaiting for SMS code...");
    match service.wait_for_code(&order).await {
        PollOutcome::Success(code) => {
            println!("Received SMS code: {code}");
            service.finish_order(&order.order_id).await?;
        }
        PollOutcome::TimedOut => println!("No code before the deadline; order was cancelled"),
        PollOutcome::Rejected(reason) => println!("Order ended without a code: {reason}"),
        PollOutcome::TransportFailure(e) => println!("Status query failed: {e}"),
    }

    Ok(())
}
