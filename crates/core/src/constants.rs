/// Quantity below which a position is treated as fully closed
pub const QUANTITY_THRESHOLD: &str = "0.00000001";

/// Decimal precision for derived valuation figures
pub const DECIMAL_PRECISION: u32 = 8;

/// Symbol charted when the account holds nothing
pub const DEFAULT_CHART_SYMBOL: &str = "BTCUSDT";

/// Look-back used for the 24h change figures, in hours
pub const DAY_CHANGE_WINDOW_HOURS: i64 = 24;
