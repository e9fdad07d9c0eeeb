//! Price feed provider abstraction and implementations.
//!
//! Providers only know how to talk to one upstream API. Fallback, timeouts
//! and circuit breaking live in [`crate::service::PriceSeriesService`].

mod traits;

pub mod coingecko;

pub use traits::PriceFeedProvider;
