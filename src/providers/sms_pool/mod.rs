//! SMSPool provider.
//!
//! Query-key API at `https://api.smspool.net`. Pools act as operators;
//! country and service names are checked against the account catalog before
//! any price or purchase call. Rental endpoints are exposed on the client as
//! untyped JSON.

mod catalog;
mod client;
mod errors;
mod provider;
mod response;
mod types;

pub use catalog::SmsPoolCatalog;
pub use client::{DEFAULT_API_URL, SmsPoolClient, SmsPoolClientBuilder, SmsPoolOrderDefaults};
pub use errors::classify_message;
pub use provider::SmsPoolProvider;
pub use response::SmsPoolResponse;
pub use types::{
    PricingOption, SmsPoolCheck, SmsPoolCountry, SmsPoolPrice, SmsPoolPurchase, SmsPoolService,
    SmsPoolStatus,
};
