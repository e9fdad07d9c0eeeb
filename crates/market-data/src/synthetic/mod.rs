//! Synthetic price series used when the live feed is unavailable.
//!
//! The series is a bounded random walk anchored at a configured base price:
//! - every step moves by at most `cap_fraction x base`
//! - every point stays within `[floor_fraction x base, base x (1 + cap_fraction)]`
//! - the RNG is seeded from `symbol|timeframe`, so a request always gets the
//!   same shape and timestamps are aligned to the granularity boundary.
//!
//! Generation cannot fail. The result is always flagged `is_synthetic`.

use std::collections::HashMap;

use chrono::{DateTime, DurationRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::models::{PricePoint, PriceSeries, Timeframe};

/// Value of `PriceSeries::source` for generated series.
pub const SYNTHETIC_SOURCE: &str = "SYNTHETIC";

/// Resolution of the random step, in parts of `cap_fraction x base`.
const STEP_RESOLUTION: i64 = 10_000;

#[derive(Clone, Debug)]
pub struct SyntheticSeriesConfig {
    /// Anchor for symbols without an entry in `base_prices`.
    pub default_base_price: Decimal,
    /// Per-symbol anchors, keyed by upper-cased ledger symbol.
    pub base_prices: HashMap<String, Decimal>,
    /// Largest step (and ceiling above base) as a fraction of the base price.
    pub cap_fraction: Decimal,
    /// Lowest allowed price as a fraction of the base price.
    pub floor_fraction: Decimal,
}

impl Default for SyntheticSeriesConfig {
    fn default() -> Self {
        Self {
            default_base_price: Decimal::new(45_000, 0),
            base_prices: HashMap::new(),
            cap_fraction: Decimal::new(2, 2),
            floor_fraction: Decimal::new(95, 2),
        }
    }
}

pub struct SyntheticSeriesGenerator {
    config: SyntheticSeriesConfig,
}

impl SyntheticSeriesGenerator {
    pub fn new(config: SyntheticSeriesConfig) -> Self {
        let base_prices = config
            .base_prices
            .into_iter()
            .map(|(symbol, price)| (symbol.trim().to_ascii_uppercase(), price))
            .collect();
        Self {
            config: SyntheticSeriesConfig {
                base_prices,
                ..config
            },
        }
    }

    pub fn config(&self) -> &SyntheticSeriesConfig {
        &self.config
    }

    /// Anchor price for a symbol. Non-positive configured values are ignored.
    pub fn base_price_for(&self, symbol: &str) -> Decimal {
        let configured = self
            .config
            .base_prices
            .get(&symbol.trim().to_ascii_uppercase())
            .copied()
            .filter(|price| *price > Decimal::ZERO);

        match configured {
            Some(price) => price,
            None if self.config.default_base_price > Decimal::ZERO => {
                self.config.default_base_price
            }
            None => SyntheticSeriesConfig::default().default_base_price,
        }
    }

    /// Inclusive price bounds for a given base price.
    pub fn bounds(&self, base: Decimal) -> (Decimal, Decimal) {
        let cap = self.cap_fraction();
        let floor = base * self.config.floor_fraction.min(Decimal::ONE);
        let ceiling = base * (Decimal::ONE + cap);
        (floor, ceiling)
    }

    fn cap_fraction(&self) -> Decimal {
        self.config.cap_fraction.max(Decimal::ZERO)
    }

    /// Generate a series ending at `now` truncated to the timeframe granularity.
    pub fn generate(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> PriceSeries {
        let base = self.base_price_for(symbol);
        let (floor, ceiling) = self.bounds(base);
        let max_step = base * self.cap_fraction();

        let step = timeframe.granularity().step();
        let end = now.duration_trunc(step).unwrap_or(now);
        let count = timeframe.point_count().max(1);

        let mut rng = StdRng::seed_from_u64(seed_for(symbol, timeframe));
        let mut price = base;
        let mut points = Vec::with_capacity(count);

        for i in 0..count {
            if i > 0 {
                let ticks = rng.gen_range(-STEP_RESOLUTION..=STEP_RESOLUTION);
                let delta = max_step * Decimal::new(ticks, 0) / Decimal::new(STEP_RESOLUTION, 0);
                price = (price + delta).clamp(floor, ceiling).round_dp(8);
            }
            let offset = step * (count - 1 - i) as i32;
            points.push(PricePoint::new(end - offset, price));
        }

        PriceSeries {
            symbol: symbol.to_string(),
            timeframe,
            points,
            is_synthetic: true,
            source: SYNTHETIC_SOURCE.to_string(),
            fallback_reason: Some(reason.into()),
        }
    }
}

/// Stable seed: first eight bytes of SHA-256(`SYMBOL|timeframe`).
fn seed_for(symbol: &str, timeframe: Timeframe) -> u64 {
    let digest = Sha256::digest(format!(
        "{}|{}",
        symbol.trim().to_ascii_uppercase(),
        timeframe
    ));
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
