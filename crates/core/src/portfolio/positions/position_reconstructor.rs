//! Replays filled trades into positions.
//!
//! Events are applied in `(timestamp, id)` order, so the result does not
//! depend on the order the ledger returned them in.

use std::collections::BTreeMap;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::positions_model::{Position, PositionBook, SellOutcome};
use crate::trades::{
    normalize_batch, RejectedRecord, TradeEvent, TradeLedgerSource, TradeSide,
};
use crate::Result;

/// Builds a position per symbol from trade events. Pending and failed events
/// are ignored.
pub fn reconstruct(events: &[TradeEvent]) -> PositionBook {
    let mut filled: Vec<&TradeEvent> = events.iter().filter(|e| e.is_filled()).collect();
    filled.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let mut positions: BTreeMap<String, Position> = BTreeMap::new();
    for event in filled {
        if event.quantity <= Decimal::ZERO || event.price <= Decimal::ZERO {
            warn!(
                "Ignoring trade {} with non-positive quantity or price",
                event.id
            );
            continue;
        }

        let position = positions
            .entry(event.symbol.clone())
            .or_insert_with(|| Position::new(&event.symbol));

        match event.side {
            TradeSide::Buy => position.apply_buy(event.quantity, event.price),
            TradeSide::Sell => {
                if let SellOutcome::Oversold { held } = position.apply_sell(event.quantity) {
                    debug!(
                        "Trade {} sold {} {} with only {} held",
                        event.id, event.quantity, event.symbol, held
                    );
                }
            }
        }
        position.record_trade_time(event.timestamp);
    }

    PositionBook::new(positions)
}

/// Positions for an account, plus the ledger records that could not be used.
#[derive(Debug, Clone, Default)]
pub struct LedgerReplay {
    pub book: PositionBook,
    pub rejected: Vec<RejectedRecord>,
}

/// Fetches the account's ledger, normalizes it and reconstructs positions.
///
/// A ledger that cannot be read is an error; individual bad records are not.
pub async fn replay_ledger(
    ledger: &dyn TradeLedgerSource,
    account_id: &str,
) -> Result<LedgerReplay> {
    let records = ledger.fetch_trades(account_id).await?;
    let batch = normalize_batch(&records);
    Ok(LedgerReplay {
        book: reconstruct(&batch.events),
        rejected: batch.rejected,
    })
}
