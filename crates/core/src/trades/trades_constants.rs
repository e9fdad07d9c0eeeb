/// Field aliases recognised in raw ledger records.
///
/// Keys are compared after lower-casing and removing `_`, `-` and spaces, so
/// `trade_id`, `tradeId` and `TRADE-ID` all match `tradeId`. The first alias
/// present in a record wins.
pub const ID_FIELDS: &[&str] = &["id", "tradeId", "orderId", "transactionId"];

pub const SYMBOL_FIELDS: &[&str] = &["symbol", "pair", "ticker", "asset", "instrument"];

pub const SIDE_FIELDS: &[&str] = &["side", "type", "tradeType", "orderSide", "direction"];

pub const QUANTITY_FIELDS: &[&str] = &["quantity", "qty", "amount", "size", "filledQty"];

pub const PRICE_FIELDS: &[&str] = &["price", "executionPrice", "avgPrice", "fillPrice", "rate"];

pub const STATUS_FIELDS: &[&str] = &["status", "state", "executionStatus", "orderStatus"];

pub const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "executedAt", "createdAt", "time", "date"];

/// Side values accepted as a buy, in canonical form.
pub const BUY_SIDE_VALUES: &[&str] = &["buy", "b", "bid", "long"];

/// Side values accepted as a sell, in canonical form.
pub const SELL_SIDE_VALUES: &[&str] = &["sell", "s", "ask", "short"];

/// Status values meaning the trade executed and moved funds.
pub const FILLED_STATUS_VALUES: &[&str] = &[
    "filled",
    "fill",
    "done",
    "completed",
    "complete",
    "executed",
    "success",
    "settled",
    "closed",
];

/// Status values meaning the trade will never execute.
pub const FAILED_STATUS_VALUES: &[&str] = &[
    "failed", "rejected", "cancelled", "canceled", "expired", "error", "void",
];

/// Status values meaning the trade has not executed yet.
///
/// Unrecognised statuses are treated the same way.
pub const PENDING_STATUS_VALUES: &[&str] = &[
    "pending",
    "new",
    "open",
    "accepted",
    "submitted",
    "processing",
    "queued",
    "partiallyfilled",
];

/// Epoch values at or above this are read as milliseconds.
pub const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Naive datetime layouts tried after RFC 3339. Interpreted as UTC.
pub const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Header carrying the per-submission idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
