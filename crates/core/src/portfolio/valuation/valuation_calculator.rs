use chrono::TimeDelta;
use coinfolio_market_data::{PricePoint, PriceSeries};
use log::{debug, warn};
use rust_decimal::Decimal;

use super::valuation_model::{PriceInput, ValuedPosition};
use crate::constants::{DAY_CHANGE_WINDOW_HOURS, DECIMAL_PRECISION};
use crate::portfolio::positions::Position;

/// Marks a position to market.
///
/// Cannot fail: a position without any known price is valued at zero and
/// flagged stale.
pub fn valuate(position: &Position, price: PriceInput<'_>) -> ValuedPosition {
    let (current_price, price_as_of, is_price_stale, day_change) = match price {
        PriceInput::Live(series) => match series.latest() {
            Some(latest) if !series.is_synthetic => (
                latest.price,
                Some(latest.timestamp),
                false,
                day_change(position, series, latest),
            ),
            _ => {
                warn!(
                    "Series for {} is not usable as a live price; valuing at zero",
                    position.symbol
                );
                (Decimal::ZERO, None, true, None)
            }
        },
        PriceInput::LastKnown(Some(point)) => {
            debug!(
                "Using last known price {} from {} for {}",
                point.price, point.timestamp, position.symbol
            );
            (point.price, Some(point.timestamp), true, None)
        }
        PriceInput::LastKnown(None) => {
            debug!("No price known yet for {}", position.symbol);
            (Decimal::ZERO, None, true, None)
        }
    };

    let Some(market_value) = position.quantity.checked_mul(current_price) else {
        warn!(
            "Market value of {} {} at {} is out of range; reporting zero",
            position.quantity, position.symbol, current_price
        );
        return ValuedPosition {
            position: position.clone(),
            current_price,
            price_as_of,
            is_price_stale,
            market_value: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            unrealized_pnl_pct: Decimal::ZERO,
            pnl_undefined: true,
            day_change: None,
        };
    };
    let unrealized_pnl = market_value - position.cost_basis;
    let pnl_ratio = if position.cost_basis > Decimal::ZERO {
        unrealized_pnl.checked_div(position.cost_basis)
    } else {
        None
    };
    let (unrealized_pnl_pct, pnl_undefined) = match pnl_ratio {
        Some(ratio) => (ratio.round_dp(DECIMAL_PRECISION), false),
        None => (Decimal::ZERO, true),
    };

    ValuedPosition {
        position: position.clone(),
        current_price,
        price_as_of,
        is_price_stale,
        market_value,
        unrealized_pnl,
        unrealized_pnl_pct,
        pnl_undefined,
        day_change,
    }
}

/// `quantity x (latest - reference)`, where the reference is the last point at
/// least 24h older than `latest`, or the first point of a shorter series.
/// `None` when the product is out of range.
fn day_change(position: &Position, series: &PriceSeries, latest: &PricePoint) -> Option<Decimal> {
    let cutoff = latest.timestamp - TimeDelta::hours(DAY_CHANGE_WINDOW_HOURS);
    let reference = series
        .points
        .iter()
        .rev()
        .find(|p| p.timestamp <= cutoff)
        .or_else(|| series.earliest())
        .map(|p| p.price)
        .unwrap_or(latest.price);
    position.quantity.checked_mul(latest.price - reference)
}
