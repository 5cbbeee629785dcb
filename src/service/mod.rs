//! Order fulfillment: price selection, order placement and code polling.

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod poll;
pub(crate) mod structure;
pub(crate) mod submit;
pub(crate) mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{PollOptions, SmsOrderServiceConfig, SmsOrderServiceConfigBuilder};
pub use error::SmsOrderServiceError;
pub use poll::poll_until_resolved;
pub use structure::{SmsOrderService, SmsOrderServiceBuilder};
pub use traits::SmsOrderServiceTrait;
