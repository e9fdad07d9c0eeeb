use async_trait::async_trait;

use super::trades_errors::{LedgerError, SubmissionError};
use super::trades_model::{RawTradeRecord, TradeAcknowledgement, TradeOrder};
use crate::Result;

/// Read side of the external trade ledger.
#[async_trait]
pub trait TradeLedgerSource: Send + Sync {
    /// All recorded trades for the account, in ledger order.
    async fn fetch_trades(
        &self,
        account_id: &str,
    ) -> std::result::Result<Vec<RawTradeRecord>, LedgerError>;
}

/// Write side of the external trade server.
#[async_trait]
pub trait TradeSubmitter: Send + Sync {
    /// Sends one order. `idempotency_key` identifies the submission so a
    /// retried request is not executed twice.
    async fn submit_order(
        &self,
        account_id: &str,
        order: &TradeOrder,
        idempotency_key: &str,
    ) -> std::result::Result<TradeAcknowledgement, SubmissionError>;
}

#[async_trait]
pub trait TradeServiceTrait: Send + Sync {
    /// Validates and forwards an order. Never retried automatically.
    async fn submit_trade(&self, account_id: &str, order: TradeOrder)
        -> Result<TradeAcknowledgement>;
}
