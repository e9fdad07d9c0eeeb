//! Price feed provider trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{MarketChartRequest, PricePoint};

/// Trait for live price feeds.
///
/// Implementations fetch raw `(timestamp, price)` pairs. They do not need to
/// sort or validate them; [`crate::models::PriceSeries::live`] does that.
#[async_trait]
pub trait PriceFeedProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "COINGECKO".
    ///
    /// Used as the series `source`, in logs and for circuit breaker tracking.
    fn id(&self) -> &'static str;

    /// Fetch the price history described by `request`.
    async fn get_market_chart(
        &self,
        request: &MarketChartRequest,
    ) -> Result<Vec<PricePoint>, MarketDataError>;
}
