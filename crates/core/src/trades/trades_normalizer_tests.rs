use super::*;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn record(value: Value) -> RawTradeRecord {
    RawTradeRecord::from_value(value)
}

fn reason_of(result: Result<TradeEvent, TradeError>) -> String {
    match result {
        Err(TradeError::MalformedRecord { reason, .. }) => reason,
        Ok(event) => panic!("expected rejection, got {:?}", event),
    }
}

#[test]
fn test_canonical_record() {
    let event = normalize_record(&record(json!({
        "id": "t-1",
        "symbol": "btcusdt",
        "side": "BUY",
        "quantity": "0.5",
        "price": "42000",
        "status": "FILLED",
        "timestamp": "2024-01-01T00:00:00Z"
    })))
    .unwrap();

    assert_eq!(event.id, "t-1");
    assert_eq!(event.symbol, "BTCUSDT");
    assert_eq!(event.side, TradeSide::Buy);
    assert_eq!(event.quantity, dec!(0.5));
    assert_eq!(event.price, dec!(42000));
    assert_eq!(event.status, TradeStatus::Filled);
    assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_aliased_fields_and_numeric_values() {
    let event = normalize_record(&record(json!({
        "trade_id": 77,
        "pair": " ethusdt ",
        "orderSide": "ask",
        "filled_qty": 1.25,
        "avg_price": 2500.5,
        "state": "completed",
        "executed_at": 1704067200000i64
    })))
    .unwrap();

    assert_eq!(event.id, "77");
    assert_eq!(event.symbol, "ETHUSDT");
    assert_eq!(event.side, TradeSide::Sell);
    assert_eq!(event.quantity, dec!(1.25));
    assert_eq!(event.price, dec!(2500.5));
    assert_eq!(event.status, TradeStatus::Filled);
    assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_timestamp_formats() {
    let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for value in [
        json!("2024-01-01T00:00:00Z"),
        json!("2024-01-01T02:00:00+02:00"),
        json!("2024-01-01T00:00:00"),
        json!("2024-01-01 00:00:00.000"),
        json!("2024-01-01"),
        json!(1704067200),
        json!("1704067200000"),
    ] {
        assert_eq!(parse_timestamp(&value), Some(expected), "{}", value);
    }
    assert_eq!(parse_timestamp(&json!("yesterday")), None);
    assert_eq!(parse_timestamp(&json!(true)), None);
}

#[test]
fn test_scientific_notation_quantity() {
    assert_eq!(parse_decimal(&json!("1e-7")), Some(dec!(0.0000001)));
    assert_eq!(parse_decimal(&json!("2.5E3")), Some(dec!(2500)));
    assert_eq!(parse_decimal(&json!("abc")), None);
}

#[test]
fn test_status_vocabulary() {
    assert_eq!(parse_status(Some("Executed")), TradeStatus::Filled);
    assert_eq!(parse_status(Some("CANCELED")), TradeStatus::Failed);
    assert_eq!(parse_status(Some("rejected")), TradeStatus::Failed);
    assert_eq!(parse_status(Some("PARTIALLY_FILLED")), TradeStatus::Pending);
    assert_eq!(parse_status(Some("on-hold")), TradeStatus::Pending);
    assert_eq!(parse_status(None), TradeStatus::Pending);
}

#[test]
fn test_missing_status_is_pending() {
    let event = normalize_record(&record(json!({
        "id": "t-2",
        "symbol": "BTCUSDT",
        "side": "sell",
        "quantity": "1",
        "price": "40000",
        "timestamp": "2024-01-02T00:00:00Z"
    })))
    .unwrap();
    assert_eq!(event.status, TradeStatus::Pending);
}

#[test]
fn test_rejections_carry_reasons() {
    let base = json!({
        "id": "t-3",
        "symbol": "BTCUSDT",
        "side": "buy",
        "quantity": "1",
        "price": "40000",
        "status": "filled",
        "timestamp": "2024-01-02T00:00:00Z"
    });
    let with = |key: &str, value: Value| {
        let mut v = base.clone();
        v[key] = value;
        record(v)
    };
    let without = |key: &str| {
        let mut v = base.clone();
        v.as_object_mut().unwrap().remove(key);
        record(v)
    };

    assert_eq!(reason_of(normalize_record(&without("price"))), "missing price");
    assert_eq!(reason_of(normalize_record(&without("id"))), "missing id");
    assert!(reason_of(normalize_record(&with("quantity", json!("-1")))).contains("must be positive"));
    assert!(reason_of(normalize_record(&with("price", json!(0)))).contains("must be positive"));
    assert!(reason_of(normalize_record(&with("quantity", json!("lots")))).contains("not a number"));
    assert!(reason_of(normalize_record(&with("side", json!("hold")))).contains("unrecognised side"));
    assert!(reason_of(normalize_record(&with("timestamp", json!("soon")))).contains("timestamp"));
}

#[test]
fn test_batch_isolates_bad_records() {
    let batch = normalize_batch(&[
        record(json!({
            "id": "a", "symbol": "BTCUSDT", "side": "buy", "quantity": "1",
            "price": "40000", "status": "filled", "timestamp": "2024-01-01T00:00:00Z"
        })),
        record(json!({ "id": "b", "symbol": "BTCUSDT", "side": "buy" })),
        record(json!("garbage")),
        record(json!({
            "id": "c", "symbol": "BTCUSDT", "side": "sell", "quantity": "0.5",
            "price": "41000", "status": "filled", "timestamp": "2024-01-02T00:00:00Z"
        })),
    ]);

    assert_eq!(batch.events.len(), 2);
    assert_eq!(batch.rejected.len(), 2);
    assert_eq!(batch.rejected[0].index, 1);
    assert_eq!(batch.rejected[0].record_id.as_deref(), Some("b"));
    assert_eq!(batch.rejected[1].index, 2);
    assert_eq!(batch.rejected[1].record_id, None);
}

#[test]
fn test_out_of_range_notional_is_rejected() {
    let batch = normalize_batch(&[
        record(json!({
            "id": "huge",
            "symbol": "BTCUSDT",
            "side": "BUY",
            "quantity": "100000000000000000",
            "price": "10000000000000",
            "status": "FILLED",
            "timestamp": "2024-01-01T00:00:00Z"
        })),
        record(json!({
            "id": "ok",
            "symbol": "BTCUSDT",
            "side": "BUY",
            "quantity": "1",
            "price": "42000",
            "status": "FILLED",
            "timestamp": "2024-01-01T00:00:00Z"
        })),
    ]);

    assert_eq!(batch.events.len(), 1);
    assert_eq!(batch.events[0].id, "ok");
    assert_eq!(batch.events[0].notional(), Some(dec!(42000)));
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].record_id.as_deref(), Some("huge"));
    assert!(batch.rejected[0].reason.contains("out of range"));
}
