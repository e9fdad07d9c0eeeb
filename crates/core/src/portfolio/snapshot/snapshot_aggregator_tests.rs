use super::*;
use crate::portfolio::positions::Position;
use crate::portfolio::valuation::ValuedPosition;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn valued(symbol: &str, quantity: Decimal, market_value: Decimal, cost_basis: Decimal) -> ValuedPosition {
    let mut position = Position::new(symbol);
    position.quantity = quantity;
    position.cost_basis = cost_basis;
    ValuedPosition {
        position,
        current_price: Decimal::ZERO,
        price_as_of: None,
        is_price_stale: false,
        market_value,
        unrealized_pnl: market_value - cost_basis,
        unrealized_pnl_pct: Decimal::ZERO,
        pnl_undefined: false,
        day_change: None,
    }
}

#[test]
fn test_totals_and_ordering() {
    let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let snapshot = aggregate(
        "acc-1",
        vec![
            valued("ETHUSDT", dec!(10), dec!(25000), dec!(20000)),
            valued("SOLUSDT", dec!(100), dec!(25000), dec!(30000)),
            valued("BTCUSDT", dec!(1), dec!(48000), dec!(42000)),
        ],
        as_of,
    );

    let symbols: Vec<_> = snapshot.valued_positions.iter().map(|v| v.symbol()).collect();
    assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
    assert_eq!(snapshot.total_value, dec!(98000));
    assert_eq!(snapshot.total_cost_basis, dec!(92000));
    assert_eq!(snapshot.total_unrealized_pnl, dec!(6000));
    assert_eq!(select_chart_symbol(&snapshot.valued_positions).unwrap(), "BTCUSDT");
    assert_eq!(snapshot.as_of, as_of);
}

#[test]
fn test_inactive_positions_are_excluded() {
    let snapshot = aggregate(
        "acc-1",
        vec![
            valued("BTCUSDT", dec!(1), dec!(48000), dec!(42000)),
            valued("DOGEUSDT", Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        ],
        Utc::now(),
    );

    assert_eq!(snapshot.valued_positions.len(), 1);
    assert_eq!(snapshot.total_value, dec!(48000));
}

#[test]
fn test_empty_portfolio() {
    let snapshot = aggregate("acc-1", Vec::new(), Utc::now());

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.total_value, Decimal::ZERO);
    assert_eq!(snapshot.total_day_change_pct, Decimal::ZERO);
    assert!(!snapshot.has_stale_prices);
}

#[test]
fn test_flags_roll_up() {
    let mut stale = valued("BTCUSDT", dec!(1), dec!(100), dec!(100));
    stale.is_price_stale = true;
    let mut inconsistent = valued("ETHUSDT", dec!(1), dec!(50), dec!(50));
    inconsistent.position.data_inconsistency = true;

    let snapshot = aggregate("acc-1", vec![stale, inconsistent], Utc::now());
    assert!(snapshot.has_stale_prices);
    assert!(snapshot.has_data_inconsistency);
}

#[test]
fn test_day_change_percentage() {
    let mut btc = valued("BTCUSDT", dec!(1), dec!(110), dec!(100));
    btc.day_change = Some(dec!(10));
    let eth = valued("ETHUSDT", dec!(1), dec!(50), dec!(50));

    let snapshot = aggregate("acc-1", vec![btc, eth], Utc::now());
    assert_eq!(snapshot.total_day_change, dec!(10));
    // 10 / (160 - 10)
    assert_eq!(snapshot.total_day_change_pct, dec!(0.06666667));
}

#[test]
fn test_chart_symbol_is_largest_holding() {
    let positions = vec![
        valued("SOLUSDT", dec!(1), dec!(500), dec!(1)),
        valued("ADAUSDT", dec!(1), dec!(500), dec!(1)),
        valued("DOTUSDT", Decimal::ZERO, dec!(900), dec!(1)),
    ];
    assert_eq!(select_chart_symbol(&positions), Some("ADAUSDT"));
    assert_eq!(select_chart_symbol(&[]), None);
}

#[test]
fn test_totals_saturate_instead_of_overflowing() {
    let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let snapshot = aggregate(
        "acc-1",
        vec![
            valued("BTCUSDT", dec!(1), Decimal::MAX, Decimal::ZERO),
            valued("ETHUSDT", dec!(1), Decimal::MAX, Decimal::ZERO),
        ],
        as_of,
    );

    assert_eq!(snapshot.total_value, Decimal::MAX);
    assert_eq!(snapshot.total_unrealized_pnl, Decimal::MAX);
    assert_eq!(snapshot.total_day_change_pct, Decimal::ZERO);
}
