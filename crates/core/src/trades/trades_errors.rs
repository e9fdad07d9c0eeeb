use rust_decimal::Decimal;
use thiserror::Error;

/// A ledger record that cannot become a [`TradeEvent`](super::TradeEvent).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradeError {
    #[error("Malformed trade record '{}': {reason}", .record_id.as_deref().unwrap_or("unknown"))]
    MalformedRecord {
        record_id: Option<String>,
        reason: String,
    },
}

/// Failure to read the trade ledger. Never degraded into an empty portfolio.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Request to trade ledger failed: {0}")]
    Request(String),

    #[error("Trade ledger returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Trade ledger response could not be parsed: {0}")]
    Parse(String),
}

/// Why a trade submission did not go through.
///
/// The first three variants are raised locally, before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("Symbol '{0}' is not tradable")]
    UnknownSymbol(String),

    #[error("Insufficient {symbol} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        symbol: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Order rejected by trade server (HTTP {status}): {message}")]
    ServerRejected { status: u16, message: String },

    #[error("Order could not be delivered: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_malformed_record_message_names_the_record() {
        let err = TradeError::MalformedRecord {
            record_id: Some("t-9".to_string()),
            reason: "missing price".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed trade record 't-9': missing price");

        let anonymous = TradeError::MalformedRecord {
            record_id: None,
            reason: "missing price".to_string(),
        };
        assert!(anonymous.to_string().contains("'unknown'"));
    }

    #[test]
    fn test_insufficient_balance_message() {
        let err = SubmissionError::InsufficientBalance {
            symbol: "BTCUSDT".to_string(),
            requested: dec!(2),
            available: dec!(0.75),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient BTCUSDT balance: requested 2, available 0.75"
        );
    }
}
