//! Coinfolio Market Data Crate
//!
//! Historical price series for digital-asset symbols, with a deterministic
//! synthetic fallback when the live feed cannot be reached.
//!
//! # Architecture
//!
//! ```text
//! +--------------------+     +------------------+
//! | PriceSeriesService | --> |  CircuitBreaker  |  (skip a failing feed)
//! +--------------------+     +------------------+
//!           |
//!           v
//! +--------------------+     +------------------+
//! | PriceFeedProvider  | --> |     Resolver     |  (ticker -> coin id)
//! +--------------------+     +------------------+
//!           |
//!           | on failure
//!           v
//! +--------------------+
//! | SyntheticSeries    |  (bounded seeded random walk, always flagged)
//! +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Timeframe`] - Named chart window mapped to (days, granularity)
//! - [`PriceSeries`] - Chronological, non-empty price points for one symbol
//! - [`PriceSeriesProvider`] - Never-failing series source used by the portfolio engine

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod synthetic;

pub use errors::MarketDataError;
pub use models::{Granularity, MarketChartRequest, PricePoint, PriceSeries, Timeframe};
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::PriceFeedProvider;
pub use registry::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use resolver::resolve_coin_id;
pub use service::{PriceSeriesProvider, PriceSeriesService, PriceSeriesServiceConfig};
pub use synthetic::{SyntheticSeriesConfig, SyntheticSeriesGenerator, SYNTHETIC_SOURCE};
