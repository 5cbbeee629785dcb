//! SMS rental provider implementations.

pub(crate) mod traits;

#[cfg(feature = "five-sim")]
pub mod five_sim;

#[cfg(feature = "sms-pool")]
pub mod sms_pool;

pub use traits::Provider;
