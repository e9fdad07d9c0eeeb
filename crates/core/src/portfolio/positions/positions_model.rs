use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::QUANTITY_THRESHOLD;

/// Quantities below the dust threshold count as zero.
pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    let threshold =
        Decimal::from_str_radix(QUANTITY_THRESHOLD, 10).unwrap_or_else(|_| Decimal::new(1, 8));
    quantity.abs() >= threshold
}

/// Net holding of one symbol, derived from filled trades.
///
/// Invariants: `quantity >= 0`, `cost_basis >= 0`, and when `quantity` is zero
/// both `cost_basis` and `average_cost` are zero.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    /// Weighted average price paid per unit for the units still held.
    pub average_cost: Decimal,
    pub cost_basis: Decimal,
    pub filled_event_count: usize,
    /// Set when a sell exceeded the held quantity. Sticky for the position's lifetime.
    pub data_inconsistency: bool,
    pub last_trade_at: Option<DateTime<Utc>>,
}

/// What a sell did to the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellOutcome {
    Reduced,
    Closed,
    /// The sell exceeded the holding; the position was clamped to zero.
    Oversold { held: Decimal },
}

impl Position {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            quantity: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
            filled_event_count: 0,
            data_inconsistency: false,
            last_trade_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// Adds a lot at `price`. A lot that would overflow the running totals
    /// clamps the position to zero and flags it, like an oversell.
    pub fn apply_buy(&mut self, quantity: Decimal, price: Decimal) {
        let totals = quantity.checked_mul(price).and_then(|cost| {
            let cost_basis = self.cost_basis.checked_add(cost)?;
            let held = self.quantity.checked_add(quantity)?;
            Some((cost_basis, held, cost_basis.checked_div(held)?))
        });

        match totals {
            Some((cost_basis, held, average_cost)) => {
                self.cost_basis = cost_basis;
                self.quantity = held;
                self.average_cost = average_cost;
            }
            None => {
                warn!(
                    "Buy of {} {} at {} overflows the position; clamping to zero",
                    quantity, self.symbol, price
                );
                self.reset();
                self.data_inconsistency = true;
            }
        }
    }

    /// Reduces the holding at the current average cost. The average itself is
    /// unchanged unless the position closes.
    pub fn apply_sell(&mut self, quantity: Decimal) -> SellOutcome {
        if quantity > self.quantity {
            let held = self.quantity;
            warn!(
                "Sell of {} {} exceeds held quantity {}; clamping to zero",
                quantity, self.symbol, held
            );
            self.reset();
            self.data_inconsistency = true;
            return SellOutcome::Oversold { held };
        }

        let released = self
            .average_cost
            .checked_mul(quantity)
            .unwrap_or(self.cost_basis);
        self.cost_basis -= released.min(self.cost_basis);
        self.quantity -= quantity;

        if is_quantity_significant(&self.quantity) {
            SellOutcome::Reduced
        } else {
            self.reset();
            SellOutcome::Closed
        }
    }

    pub(crate) fn record_trade_time(&mut self, at: DateTime<Utc>) {
        self.filled_event_count += 1;
        if self.last_trade_at.map_or(true, |last| at > last) {
            self.last_trade_at = Some(at);
        }
    }

    fn reset(&mut self) {
        self.quantity = Decimal::ZERO;
        self.cost_basis = Decimal::ZERO;
        self.average_cost = Decimal::ZERO;
    }
}

/// Every symbol seen in filled trades, keyed by symbol.
///
/// Closed positions are kept so their history flags stay visible; use
/// [`PositionBook::active`] for what is currently held.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct PositionBook {
    positions: BTreeMap<String, Position>,
}

impl PositionBook {
    pub fn new(positions: BTreeMap<String, Position>) -> Self {
        Self { positions }
    }

    pub fn get(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Positions with a non-zero quantity, in symbol order.
    pub fn active(&self) -> impl Iterator<Item = &Position> {
        self.positions.values().filter(|p| p.is_active())
    }

    pub fn all(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn has_data_inconsistency(&self) -> bool {
        self.positions.values().any(|p| p.data_inconsistency)
    }

    /// Timestamp of the most recent filled trade across all symbols.
    pub fn last_trade_at(&self) -> Option<DateTime<Utc>> {
        self.positions.values().filter_map(|p| p.last_trade_at).max()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
