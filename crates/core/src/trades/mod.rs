//! Trades module - ledger normalization and order submission.

mod trades_client;
mod trades_constants;
mod trades_errors;
mod trades_model;
mod trades_normalizer;
mod trades_service;
mod trades_traits;

#[cfg(test)]
mod trades_normalizer_tests;


pub use trades_client::LedgerApiClient;
pub use trades_constants::*;
pub use trades_errors::{LedgerError, SubmissionError, TradeError};
pub use trades_model::{
    RawTradeRecord, TradeAcknowledgement, TradeEvent, TradeOrder, TradeSide, TradeStatus,
};
pub use trades_normalizer::{
    normalize_batch, normalize_record, parse_decimal, parse_side, parse_status, parse_timestamp,
    NormalizedBatch, RejectedRecord,
};
pub use trades_service::TradeService;
pub use trades_traits::{TradeLedgerSource, TradeServiceTrait, TradeSubmitter};
