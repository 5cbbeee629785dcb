//! Example demonstrating cancellation functionality.
//!
//! `wait_for_code_cancellable` stops polling when the token fires. The order
//! itself stays open; it is cancelled explicitly afterwards.
//!
//! # Running
//!
//! ```bash
//! FIVESIM_API_KEY=your_api_key cargo run --example with_cancellation
//! ```

use sms_rental::five_sim::{FiveSimClient, FiveSimProvider};
use sms_rental::{
    CancellationToken, CountryName, PollOutcome, ServiceName, SmsOrderService,
    SmsOrderServiceConfig, SmsOrderServiceError, SmsOrderServiceTrait,
};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key =
        env::var("FIVESIM_API_KEY").expect("FIVESIM_API_KEY environment variable must be set");

    let client = FiveSimClient::with_api_key(api_key)?;
    let service = SmsOrderService::new(
        FiveSimProvider::new(client),
        SmsOrderServiceConfig::patient(),
    );

    let order = service
        .order_number(&CountryName::new("england")?, &ServiceName::new("telegram")?)
        .await?;
    println!("Got phone number: {}", order.full_number);

    let cancel_token = CancellationToken::new();
    let token_clone = cancel_token.clone();

    // Give up after 30 seconds if no SMS was received
    let cancel_handle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        println!("Cancelling operation...");
        token_clone.cancel();
    });

    println!("\nWaiting for SMS code (cancellable)...");
    match service
        .wait_for_code_cancellable(&order, cancel_token)
        .await
    {
        Ok(PollOutcome::Success(code)) => {
            cancel_handle.abort();
            println!("Received SMS code: {code}");
        }
        Ok(other) => {
            cancel_handle.abort();
            println!("No code: {other:?}");
        }
        Err(SmsOrderServiceError::Cancelled {
            elapsed,
            poll_count,
            ..
        }) => {
            println!(
                "Operation was cancelled after {:.1}s ({} polls)",
                elapsed.as_secs_f64(),
                poll_count
            );
            service.cancel_order(&order.order_id).await?;
        }
        Err(e) => println!("Error: {e}"),
    }

    Ok(())
}
