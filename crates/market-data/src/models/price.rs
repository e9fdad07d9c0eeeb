use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::timeframe::{Granularity, Timeframe};
use crate::errors::MarketDataError;

/// A single `(timestamp, price)` observation in the quote currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// Historical prices for one symbol and timeframe.
///
/// Points are chronological and never empty. `is_synthetic` marks series that
/// came from the local fallback generator instead of the live feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub points: Vec<PricePoint>,
    pub is_synthetic: bool,
    /// Provider id for live series, `SYNTHETIC` otherwise.
    pub source: String,
    /// Why the live feed was not used, when synthetic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl PriceSeries {
    /// Builds a live series from provider points.
    ///
    /// Points are sorted by timestamp and duplicates are collapsed, keeping
    /// the last price seen for a timestamp. Fails when nothing usable is left.
    pub fn live(
        symbol: &str,
        timeframe: Timeframe,
        mut points: Vec<PricePoint>,
        source: &str,
    ) -> Result<Self, MarketDataError> {
        if points.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }
        if let Some(bad) = points.iter().find(|p| p.price <= Decimal::ZERO) {
            return Err(MarketDataError::ValidationFailed {
                message: format!(
                    "non-positive price {} at {} for {}",
                    bad.price, bad.timestamp, symbol
                ),
            });
        }

        points.sort_by_key(|p| p.timestamp);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }

        Ok(Self {
            symbol: symbol.to_string(),
            timeframe,
            points: deduped,
            is_synthetic: false,
            source: source.to_string(),
            fallback_reason: None,
        })
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn earliest(&self) -> Option<&PricePoint> {
        self.points.first()
    }
}

/// Parameters of a market chart request, derived from a timeframe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketChartRequest {
    pub symbol: String,
    pub days: u32,
    pub interval: Granularity,
}

impl MarketChartRequest {
    pub fn for_timeframe(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.to_string(),
            days: timeframe.window_days(),
            interval: timeframe.granularity(),
        }
    }
}
