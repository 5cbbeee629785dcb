//! Integration tests against the real provider APIs.
//!
//! These tests make real API calls and require valid API keys.
//! They are ignored by default and should be run manually.
//!
//! # Setup
//!
//! 1. Copy the example env file:
//!    ```bash
//!    cp tests/.env.example tests/.env
//!    ```
//!
//! 2. Edit `tests/.env` and add your API keys
//!
//! 3. Run the tests:
//!    ```bash
//!    cargo test --test live_api -- --ignored
//!    ```
//!
//! Alternatively, pass the keys directly:
//! ```bash
//! FIVESIM_API_KEY=your_key SMSPOOL_API_KEY=your_key cargo test --test live_api -- --ignored
//! ```
//!
//! **WARNING**: The ordering tests will consume API credits!

use sms_rental::{CountryName, RankingPolicy, ServiceName, SmsOrderService, SmsOrderServiceTrait};
use std::env;

/// Get an API key from environment or .env file.
fn get_api_key(name: &str) -> String {
    // Try to load from tests/.env file
    dotenvy::from_filename("tests/.env").ok();
    dotenvy::dotenv().ok();

    env::var(name).unwrap_or_else(|_| {
        panic!(
            "{name} environment variable must be set.\n\
             Either:\n\
             1. Copy tests/.env.example to tests/.env and add your API key\n\
             2. Run with: {name}=your_key cargo test --test live_api -- --ignored"
        )
    })
}

#[cfg(feature = "five-sim")]
mod five_sim {
    use super::*;
    use sms_rental::five_sim::{FiveSimClient, FiveSimProvider};

    fn service() -> SmsOrderService<FiveSimProvider> {
        let client = FiveSimClient::with_api_key(get_api_key("FIVESIM_API_KEY"))
            .expect("Failed to create client");
        SmsOrderService::with_provider(FiveSimProvider::new(client))
    }

    #[tokio::test]
    #[ignore = "requires FIVESIM_API_KEY"]
    async fn test_get_price() {
        let service = service();
        let quote = service
            .get_price(
                &CountryName::new("england").unwrap(),
                &ServiceName::new("telegram").unwrap(),
            )
            .await
            .expect("Failed to get price");

        println!("Cheapest operator: {quote:?}");
        assert!(quote.price > 0.0);
    }

    #[tokio::test]
    #[ignore = "requires FIVESIM_API_KEY and consumes credits"]
    async fn test_order_and_cancel() {
        let service = service();
        let order = service
            .order_number(
                &CountryName::new("england").unwrap(),
                &ServiceName::new("telegram").unwrap(),
            )
            .await
            .expect("Failed to order number");

        println!("Ordered {} ({})", order.phone_number, order.order_id);
        service
            .cancel_order(&order.order_id)
            .await
            .expect("Failed to cancel order");
    }
}

#[cfg(feature = "sms-pool")]
mod sms_pool {
    use super::*;
    use sms_rental::sms_pool::{SmsPoolClient, SmsPoolProvider};

    fn service() -> SmsOrderService<SmsPoolProvider> {
        let client = SmsPoolClient::with_api_key(get_api_key("SMSPOOL_API_KEY"))
            .expect("Failed to create client");
        SmsOrderService::builder(SmsPoolProvider::new(client))
            .policy(RankingPolicy::HighestSuccessRateFirst)
            .build()
    }

    #[tokio::test]
    #[ignore = "requires SMSPOOL_API_KEY"]
    async fn test_get_price() {
        let service = service();
        let quote = service
            .get_price(
                &CountryName::new("US").unwrap(),
                &ServiceName::new("Telegram").unwrap(),
            )
            .await
            .expect("Failed to get price");

        println!("Best pool: {quote:?}");
    }

    #[tokio::test]
    #[ignore = "requires SMSPOOL_API_KEY"]
    async fn test_unknown_country_is_rejected_locally() {
        let service = service();
        let error = service
            .get_price(
                &CountryName::new("Atlantis").unwrap(),
                &ServiceName::new("Telegram").unwrap(),
            )
            .await
            .unwrap_err();

        assert!(error.is_invalid_country());
    }
}
