//! # SMS Rental
//!
//! Disposable phone numbers from SMS rental providers: pick the best operator
//! for a (country, service) pair, place the order and poll until the
//! verification code arrives.
//!
//! The flow is the same for every provider:
//!
//! 1. **Price selection**: a fresh operator price table is ranked under a
//!    [`RankingPolicy`] and one operator wins.
//! 2. **Order placement**: exactly one purchase call is made with that
//!    operator. Declines come back as [`OrderError`] with the provider's raw
//!    message and a best-effort [`OrderErrorKind`].
//! 3. **Polling**: the order status is queried every `poll_interval` until a
//!    code arrives, the provider ends the order, a query fails or the deadline
//!    elapses. A timed-out order is cancelled once, best effort.
//!
//! ## Supported Providers
//!
//! | Provider | Feature | Website |
//! |----------|---------|---------|
//! | 5sim | `five-sim` (default) | <https://5sim.net> |
//! | SMSPool | `sms-pool` (default) | <https://smspool.net> |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sms_rental::five_sim::{FiveSimClient, FiveSimProvider};
//! use sms_rental::{
//!     CountryName, PollOutcome, ServiceName, SmsOrderService, SmsOrderServiceConfig,
//!     SmsOrderServiceTrait,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FiveSimClient::with_api_key("your_api_key")?;
//!     let service = SmsOrderService::new(
//!         FiveSimProvider::new(client),
//!         SmsOrderServiceConfig::default(),
//!     );
//!
//!     let order = service
//!         .order_number(&CountryName::new("england")?, &ServiceName::new("telegram")?)
//!         .await?;
//!     println!("Got number: {}", order.phone_number);
//!
//!     match service.wait_for_code(&order).await {
//!         PollOutcome::Success(code) => println!("Got code: {code}"),
//!         other => println!("No code: {other:?}"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SmsOrderService<P>
//!         │
//!         ▼
//!     Provider          (trait: FiveSimProvider, SmsPoolProvider)
//!         │
//!         ▼
//!     Transport         (trait: HttpTransport, retries transient failures)
//! ```
//!
//! ## Features
//!
//! - `five-sim` - 5sim provider support (enabled by default)
//! - `sms-pool` - SMSPool provider support (enabled by default)
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)

pub mod errors;
pub mod pricing;
pub mod providers;
pub mod service;
pub mod transport;
pub mod types;
pub mod utils;

#[cfg(feature = "five-sim")]
pub use providers::five_sim;
#[cfg(feature = "sms-pool")]
pub use providers::sms_pool;

// Re-export commonly used types at the crate root
pub use errors::{OrderError, OrderErrorKind, ProviderError, RetryableError, ValidationError};
pub use pricing::{OperatorPrice, PriceQuote, PriceTable, RankingPolicy, select_best_operator};
pub use providers::Provider;
pub use service::{
    PollOptions, SmsOrderService, SmsOrderServiceBuilder, SmsOrderServiceConfig,
    SmsOrderServiceConfigBuilder, SmsOrderServiceError, SmsOrderServiceTrait, poll_until_resolved,
};
pub use tokio_util::sync::CancellationToken;
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::{
    CountryName, DialCode, FullNumber, LocalNumber, OperatorName, Order, OrderId, OrderStatus,
    PlacedOrder, PollOutcome, RejectionReason, ServiceName, SmsCode,
};
pub use utils::retry::RetryConfig;
