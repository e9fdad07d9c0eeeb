use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::snapshot_model::PortfolioSnapshot;
use crate::constants::DECIMAL_PRECISION;
use crate::portfolio::valuation::ValuedPosition;

/// Market value descending, then symbol ascending.
pub fn compare_holdings(a: &ValuedPosition, b: &ValuedPosition) -> Ordering {
    b.market_value
        .cmp(&a.market_value)
        .then_with(|| a.symbol().cmp(b.symbol()))
}

/// Rolls valued positions up into a snapshot. Inactive positions are dropped.
pub fn aggregate(
    account_id: &str,
    valued_positions: Vec<ValuedPosition>,
    as_of: DateTime<Utc>,
) -> PortfolioSnapshot {
    let mut active: Vec<ValuedPosition> = valued_positions
        .into_iter()
        .filter(|v| v.position.is_active())
        .collect();
    active.sort_by(compare_holdings);

    let total_value = saturating_total(active.iter().map(|v| v.market_value));
    let total_cost_basis = saturating_total(active.iter().map(|v| v.position.cost_basis));
    let total_unrealized_pnl = saturating_total(active.iter().map(|v| v.unrealized_pnl));
    let total_day_change = saturating_total(active.iter().filter_map(|v| v.day_change));

    let previous_value = total_value.checked_sub(total_day_change);
    let total_day_change_pct = match previous_value {
        Some(previous) if previous > Decimal::ZERO => total_day_change
            .checked_div(previous)
            .map(|pct| pct.round_dp(DECIMAL_PRECISION))
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };

    PortfolioSnapshot {
        account_id: account_id.to_string(),
        total_value,
        total_cost_basis,
        total_unrealized_pnl,
        total_day_change,
        total_day_change_pct,
        has_stale_prices: active.iter().any(|v| v.is_price_stale),
        has_data_inconsistency: active.iter().any(|v| v.position.data_inconsistency),
        valued_positions: active,
        rejected_records: 0,
        as_of,
    }
}

/// Sum that saturates at the `Decimal` bounds instead of panicking.
fn saturating_total(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |total, value| total.saturating_add(value))
}

/// Symbol to chart: the active holding with the largest market value.
pub fn select_chart_symbol(valued_positions: &[ValuedPosition]) -> Option<&str> {
    valued_positions
        .iter()
        .filter(|v| v.position.is_active())
        .min_by(|a, b| compare_holdings(a, b))
        .map(ValuedPosition::symbol)
}
