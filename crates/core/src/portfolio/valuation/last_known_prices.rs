use std::collections::HashMap;
use std::sync::RwLock;

use coinfolio_market_data::{PricePoint, PriceSeries};

/// Most recent live price seen per symbol.
///
/// Fed from live series only. A point never replaces a newer one, so
/// concurrent pipeline runs cannot move a price backwards.
#[derive(Debug, Default)]
pub struct LastKnownPrices {
    prices: RwLock<HashMap<String, PricePoint>>,
}

impl LastKnownPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<PricePoint> {
        self.prices
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(symbol)
            .cloned()
    }

    /// Stores `point` unless a newer one is already known. Returns whether it
    /// was stored.
    pub fn record(&self, symbol: &str, point: PricePoint) -> bool {
        let mut prices = self
            .prices
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match prices.get(symbol) {
            Some(existing) if existing.timestamp > point.timestamp => false,
            _ => {
                prices.insert(symbol.to_string(), point);
                true
            }
        }
    }

    /// Records the latest point of a live series. Synthetic series are ignored.
    pub fn record_series(&self, series: &PriceSeries) {
        if series.is_synthetic {
            return;
        }
        if let Some(latest) = series.latest() {
            self.record(&series.symbol, latest.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.prices
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
