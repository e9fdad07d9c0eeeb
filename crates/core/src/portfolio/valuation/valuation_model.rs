use chrono::{DateTime, Utc};
use coinfolio_market_data::{PricePoint, PriceSeries};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::positions::Position;

/// A position marked to market.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValuedPosition {
    #[serde(flatten)]
    pub position: Position,
    /// Zero when no price has ever been known for the symbol.
    pub current_price: Decimal,
    /// Time of the price observation used.
    pub price_as_of: Option<DateTime<Utc>>,
    /// True when `current_price` is not from a fresh live series.
    pub is_price_stale: bool,
    pub market_value: Decimal,
    pub unrealized_pnl: Decimal,
    /// Ratio, e.g. `0.1429` for +14.29%. Zero when `pnl_undefined`.
    pub unrealized_pnl_pct: Decimal,
    /// Cost basis is zero, so the percentage has no meaning.
    pub pnl_undefined: bool,
    /// Value change over the last 24h of the live series, if there is one.
    pub day_change: Option<Decimal>,
}

impl ValuedPosition {
    pub fn symbol(&self) -> &str {
        &self.position.symbol
    }
}

/// The price information available for one valuation.
#[derive(Debug, Clone, Copy)]
pub enum PriceInput<'a> {
    /// A fresh series from the live feed.
    Live(&'a PriceSeries),
    /// No fresh series; the most recent price seen earlier, if any.
    LastKnown(Option<&'a PricePoint>),
}

impl<'a> PriceInput<'a> {
    /// Uses the series when it is live and non-empty. Synthetic series are
    /// never used as a price.
    pub fn select(series: &'a PriceSeries, last_known: Option<&'a PricePoint>) -> Self {
        if !series.is_synthetic && !series.points.is_empty() {
            PriceInput::Live(series)
        } else {
            PriceInput::LastKnown(last_known)
        }
    }
}
