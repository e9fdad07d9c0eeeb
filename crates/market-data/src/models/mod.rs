//! Market data models
//!
//! - `timeframe` - Named chart windows and their (days, granularity) mapping
//! - `price` - Price points, price series and feed request parameters

mod price;
mod timeframe;

pub use price::{MarketChartRequest, PricePoint, PriceSeries};
pub use timeframe::{Granularity, Timeframe};
