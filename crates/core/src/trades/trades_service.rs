use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::trades_errors::SubmissionError;
use super::trades_model::{TradeAcknowledgement, TradeOrder, TradeSide};
use super::trades_traits::{TradeLedgerSource, TradeServiceTrait, TradeSubmitter};
use crate::errors::{require_account_id, ValidationError};
use crate::portfolio::positions::replay_ledger;
use crate::Result;

/// Validates orders locally and forwards them to the trade server.
///
/// Sells are checked against the position reconstructed from the ledger at
/// submission time. Orders are sent once; a failure is returned as-is.
pub struct TradeService {
    ledger: Arc<dyn TradeLedgerSource>,
    submitter: Arc<dyn TradeSubmitter>,
    tradable_symbols: HashSet<String>,
}

impl TradeService {
    /// `tradable_symbols` restricts which symbols can be ordered. An empty
    /// list allows any symbol.
    pub fn new(
        ledger: Arc<dyn TradeLedgerSource>,
        submitter: Arc<dyn TradeSubmitter>,
        tradable_symbols: Vec<String>,
    ) -> Self {
        Self {
            ledger,
            submitter,
            tradable_symbols: tradable_symbols
                .into_iter()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    fn validate_symbol(&self, symbol: &str) -> std::result::Result<(), SubmissionError> {
        if !self.tradable_symbols.is_empty() && !self.tradable_symbols.contains(symbol) {
            return Err(SubmissionError::UnknownSymbol(symbol.to_string()));
        }
        Ok(())
    }

    async fn available_quantity(&self, account_id: &str, symbol: &str) -> Result<Decimal> {
        let replay = replay_ledger(self.ledger.as_ref(), account_id).await?;
        Ok(replay
            .book
            .get(symbol)
            .map(|position| position.quantity)
            .unwrap_or(Decimal::ZERO))
    }
}

#[async_trait]
impl TradeServiceTrait for TradeService {
    async fn submit_trade(
        &self,
        account_id: &str,
        order: TradeOrder,
    ) -> Result<TradeAcknowledgement> {
        require_account_id(account_id)?;
        let order = TradeOrder {
            symbol: order.symbol.trim().to_uppercase(),
            ..order
        };
        if order.symbol.is_empty() {
            return Err(ValidationError::MissingField("symbol").into());
        }

        if order.quantity <= Decimal::ZERO {
            return Err(SubmissionError::NonPositiveQuantity(order.quantity).into());
        }
        self.validate_symbol(&order.symbol)?;

        if order.side == TradeSide::Sell {
            let available = self.available_quantity(account_id, &order.symbol).await?;
            if order.quantity > available {
                debug!(
                    "Refusing sell of {} {} for account {}: only {} held",
                    order.quantity, order.symbol, account_id, available
                );
                return Err(SubmissionError::InsufficientBalance {
                    symbol: order.symbol,
                    requested: order.quantity,
                    available,
                }
                .into());
            }
        }

        let idempotency_key = Uuid::new_v4().to_string();
        info!(
            "Submitting {} {} {} for account {} (key {})",
            order.side.as_str(),
            order.quantity,
            order.symbol,
            account_id,
            idempotency_key
        );

        let ack = self
            .submitter
            .submit_order(account_id, &order, &idempotency_key)
            .await
            .map_err(|e| {
                warn!("Trade submission {} failed: {}", idempotency_key, e);
                e
            })?;
        Ok(ack)
    }
}
