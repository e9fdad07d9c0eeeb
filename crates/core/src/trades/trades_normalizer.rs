//! Converts raw ledger records into [`TradeEvent`]s.
//!
//! Each record is handled on its own: a malformed record is rejected with a
//! reason and never aborts the rest of the batch.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::trades_constants::*;
use super::trades_errors::TradeError;
use super::trades_model::{canonical_key, RawTradeRecord, TradeEvent, TradeSide, TradeStatus};

/// A record that did not survive normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRecord {
    /// Position of the record in the ledger response.
    pub index: usize,
    pub record_id: Option<String>,
    pub reason: String,
}

/// Result of normalizing a whole ledger response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub events: Vec<TradeEvent>,
    pub rejected: Vec<RejectedRecord>,
}

pub fn normalize_batch(records: &[RawTradeRecord]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, record) in records.iter().enumerate() {
        match normalize_record(record) {
            Ok(event) => batch.events.push(event),
            Err(TradeError::MalformedRecord { record_id, reason }) => {
                warn!("Skipping ledger record #{} ({:?}): {}", index, record_id, reason);
                batch.rejected.push(RejectedRecord {
                    index,
                    record_id,
                    reason,
                });
            }
        }
    }
    debug!(
        "Normalized {} ledger records: {} events, {} rejected",
        records.len(),
        batch.events.len(),
        batch.rejected.len()
    );
    batch
}

pub fn normalize_record(raw: &RawTradeRecord) -> Result<TradeEvent, TradeError> {
    let record_id = text_field(raw, ID_FIELDS);
    let malformed = |reason: String| TradeError::MalformedRecord {
        record_id: record_id.clone(),
        reason,
    };

    let id = record_id
        .clone()
        .ok_or_else(|| malformed("missing id".to_string()))?;

    let symbol = text_field(raw, SYMBOL_FIELDS)
        .map(|s| s.to_uppercase())
        .ok_or_else(|| malformed("missing symbol".to_string()))?;

    let side_text =
        text_field(raw, SIDE_FIELDS).ok_or_else(|| malformed("missing side".to_string()))?;
    let side = parse_side(&side_text)
        .ok_or_else(|| malformed(format!("unrecognised side '{}'", side_text)))?;

    let quantity = positive_decimal_field(raw, QUANTITY_FIELDS, "quantity").map_err(malformed)?;
    let price = positive_decimal_field(raw, PRICE_FIELDS, "price").map_err(malformed)?;

    let status = parse_status(text_field(raw, STATUS_FIELDS).as_deref());

    let timestamp_value = raw
        .field(TIMESTAMP_FIELDS)
        .ok_or_else(|| malformed("missing timestamp".to_string()))?;
    let timestamp = parse_timestamp(timestamp_value)
        .ok_or_else(|| malformed(format!("unparseable timestamp {}", timestamp_value)))?;

    let event = TradeEvent {
        id,
        symbol,
        side,
        quantity,
        price,
        status,
        timestamp,
    };
    if event.notional().is_none() {
        return Err(malformed(format!(
            "notional of {} x {} is out of range",
            event.quantity, event.price
        )));
    }
    Ok(event)
}

pub fn parse_side(value: &str) -> Option<TradeSide> {
    let key = canonical_key(value);
    if BUY_SIDE_VALUES.contains(&key.as_str()) {
        Some(TradeSide::Buy)
    } else if SELL_SIDE_VALUES.contains(&key.as_str()) {
        Some(TradeSide::Sell)
    } else {
        None
    }
}

/// Maps a ledger status onto the three-state model. Missing or unknown
/// statuses are `Pending`, so they never move funds.
pub fn parse_status(value: Option<&str>) -> TradeStatus {
    let Some(value) = value else {
        return TradeStatus::Pending;
    };
    let key = canonical_key(value);
    if FILLED_STATUS_VALUES.contains(&key.as_str()) {
        TradeStatus::Filled
    } else if FAILED_STATUS_VALUES.contains(&key.as_str()) {
        TradeStatus::Failed
    } else {
        if !PENDING_STATUS_VALUES.contains(&key.as_str()) {
            debug!("Unrecognised trade status '{}', treating as pending", value);
        }
        TradeStatus::Pending
    }
}

/// Parses a decimal from a JSON number or numeric string, including
/// scientific notation.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Accepts RFC 3339, naive datetimes and dates (as UTC), and epoch seconds or
/// milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(from_epoch),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    s.parse::<i64>().ok().and_then(from_epoch)
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.abs() >= EPOCH_MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

/// Trimmed, non-empty text for string or numeric values.
fn text_field(raw: &RawTradeRecord, aliases: &[&str]) -> Option<String> {
    match raw.field(aliases)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn positive_decimal_field(
    raw: &RawTradeRecord,
    aliases: &[&str],
    name: &str,
) -> Result<Decimal, String> {
    let value = raw
        .field(aliases)
        .ok_or_else(|| format!("missing {}", name))?;
    let parsed = parse_decimal(value).ok_or_else(|| format!("{} {} is not a number", name, value))?;
    if parsed <= Decimal::ZERO {
        return Err(format!("{} must be positive, got {}", name, parsed));
    }
    Ok(parsed)
}
