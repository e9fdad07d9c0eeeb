//! Trade domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    #[serde(alias = "buy", alias = "Buy")]
    Buy,
    #[serde(alias = "sell", alias = "Sell")]
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// Execution status. Only `Filled` trades affect positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Filled,
    Pending,
    Failed,
}

/// A normalized ledger entry.
///
/// `quantity` and `price` are strictly positive and `symbol` is upper-case;
/// the normalizer rejects records that cannot satisfy this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    pub id: String,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
    pub status: TradeStatus,
    pub timestamp: DateTime<Utc>,
}

impl TradeEvent {
    pub fn is_filled(&self) -> bool {
        self.status == TradeStatus::Filled
    }

    /// Quantity times execution price, or `None` when that does not fit a
    /// `Decimal`.
    pub fn notional(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.price)
    }
}

/// A ledger record as received, before normalization.
///
/// Ledger sources disagree on field names and value types, so the record is
/// kept as an untyped JSON object and read through alias tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTradeRecord(Map<String, Value>);

impl RawTradeRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps any JSON value. Non-objects become an empty record, which the
    /// normalizer will reject.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    /// First non-null value whose key matches one of `aliases`.
    pub fn field(&self, aliases: &[&str]) -> Option<&Value> {
        aliases.iter().find_map(|alias| {
            let wanted = canonical_key(alias);
            self.0
                .iter()
                .find(|(key, value)| !value.is_null() && canonical_key(key) == wanted)
                .map(|(_, value)| value)
        })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawTradeRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Lower-cases and strips `_`, `-` and whitespace.
pub(crate) fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A trade submission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrder {
    pub symbol: String,
    pub quantity: Decimal,
    pub side: TradeSide,
}

/// What the trade server said about a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeAcknowledgement {
    /// Server-assigned order id, when the server returns one.
    pub order_id: Option<String>,
    /// Idempotency key sent with the submission.
    pub client_order_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
