//! 5sim provider.
//!
//! Bearer-token API at `https://5sim.net/v1`. Prices come from
//! `guest/prices`, purchases from `user/buy/{category}/{country}/{operator}/{product}`
//! and status from `user/check/{id}`.

mod client;
mod errors;
mod provider;
mod response;
mod types;

pub use client::{DEFAULT_API_URL, FiveSimClient, FiveSimClientBuilder};
pub use errors::{FiveSimErrorCode, FiveSimServiceError};
pub use provider::FiveSimProvider;
pub use response::FiveSimResponse;
pub use types::{
    Category, FiveSimCountry, FiveSimOperatorPrice, FiveSimOrder, FiveSimOrderList, FiveSimSms,
    FiveSimStatus,
};
