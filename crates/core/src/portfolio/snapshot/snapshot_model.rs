use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::valuation::ValuedPosition;

/// Account-level view of all active holdings.
///
/// `valued_positions` is ordered by market value descending, ties by symbol
/// ascending. The first entry is the largest holding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub account_id: String,
    pub total_value: Decimal,
    pub total_cost_basis: Decimal,
    pub total_unrealized_pnl: Decimal,
    /// Sum of the live-priced positions' 24h change.
    pub total_day_change: Decimal,
    /// `total_day_change` relative to the value 24h earlier. Zero when that
    /// value is not positive.
    pub total_day_change_pct: Decimal,
    pub valued_positions: Vec<ValuedPosition>,
    pub has_stale_prices: bool,
    pub has_data_inconsistency: bool,
    /// Ledger records dropped during normalization.
    pub rejected_records: usize,
    /// Latest trade or price time the snapshot reflects.
    pub as_of: DateTime<Utc>,
}

impl PortfolioSnapshot {
    pub fn is_empty(&self) -> bool {
        self.valued_positions.is_empty()
    }
}
