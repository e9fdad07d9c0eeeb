use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use coinfolio_core::constants::DEFAULT_CHART_SYMBOL;
use coinfolio_market_data::SyntheticSeriesConfig;
use rust_decimal::Decimal;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LEDGER_URL: &str = "http://localhost:8081/api";
const DEFAULT_PRICE_FEED_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_BASE_PRICES: &str = "BTCUSDT=45000,ETHUSDT=2500";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub ledger_url: String,
    pub price_feed_url: String,
    pub price_feed_api_key: Option<String>,
    pub vs_currency: String,
    pub feed_timeout: Duration,
    /// Timeout for ledger and order requests.
    pub request_timeout: Duration,
    pub synthetic_base_price: Decimal,
    pub synthetic_cap_fraction: Decimal,
    pub base_prices: HashMap<String, Decimal>,
    /// Empty means every symbol may be traded.
    pub tradable_symbols: Vec<String>,
    pub default_chart_symbol: String,
}

impl Config {
    /// Reads `COINFOLIO_*` variables, loading `.env` first when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr = var("COINFOLIO_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("Invalid COINFOLIO_LISTEN_ADDR")?;

        let millis = |key: &str, default: u64| -> anyhow::Result<Duration> {
            match var(key) {
                Some(v) => v
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .with_context(|| format!("Invalid {}", key)),
                None => Ok(Duration::from_millis(default)),
            }
        };

        let decimal = |key: &str, default: Decimal| -> anyhow::Result<Decimal> {
            match var(key) {
                Some(v) => Decimal::from_str(&v).with_context(|| format!("Invalid {}", key)),
                None => Ok(default),
            }
        };

        Ok(Self {
            listen_addr,
            ledger_url: var("COINFOLIO_LEDGER_URL").unwrap_or_else(|| DEFAULT_LEDGER_URL.to_string()),
            price_feed_url: var("COINFOLIO_PRICE_FEED_URL")
                .unwrap_or_else(|| DEFAULT_PRICE_FEED_URL.to_string()),
            price_feed_api_key: var("COINFOLIO_PRICE_FEED_API_KEY"),
            vs_currency: var("COINFOLIO_VS_CURRENCY").unwrap_or_else(|| "usd".to_string()),
            feed_timeout: millis("COINFOLIO_FEED_TIMEOUT_MS", 10_000)?,
            request_timeout: millis("COINFOLIO_REQUEST_TIMEOUT_MS", 30_000)?,
            synthetic_base_price: decimal("COINFOLIO_SYNTHETIC_BASE_PRICE", Decimal::new(45_000, 0))?,
            synthetic_cap_fraction: decimal("COINFOLIO_SYNTHETIC_CAP_FRACTION", Decimal::new(2, 2))?,
            base_prices: parse_base_prices(
                &var("COINFOLIO_BASE_PRICES").unwrap_or_else(|| DEFAULT_BASE_PRICES.to_string()),
            )?,
            tradable_symbols: var("COINFOLIO_TRADABLE_SYMBOLS")
                .map(|list| parse_symbol_list(&list))
                .unwrap_or_default(),
            default_chart_symbol: var("COINFOLIO_DEFAULT_CHART_SYMBOL")
                .map(|s| s.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CHART_SYMBOL.to_string()),
        })
    }

    pub fn synthetic_config(&self) -> SyntheticSeriesConfig {
        SyntheticSeriesConfig {
            default_base_price: self.synthetic_base_price,
            base_prices: self.base_prices.clone(),
            cap_fraction: self.synthetic_cap_fraction,
            ..SyntheticSeriesConfig::default()
        }
    }
}

/// `SYMBOL=price` pairs separated by commas.
fn parse_base_prices(raw: &str) -> anyhow::Result<HashMap<String, Decimal>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> anyhow::Result<(String, Decimal)> {
            let (symbol, price) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid COINFOLIO_BASE_PRICES entry '{}'", entry))?;
            let price = Decimal::from_str(price.trim())
                .with_context(|| format!("Invalid base price for {}", symbol.trim()))?;
            Ok((symbol.trim().to_uppercase(), price))
        })
        .collect()
}

fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.vs_currency, "usd");
        assert_eq!(config.feed_timeout, Duration::from_secs(10));
        assert_eq!(config.synthetic_base_price, dec!(45000));
        assert_eq!(config.base_prices.get("ETHUSDT"), Some(&dec!(2500)));
        assert!(config.tradable_symbols.is_empty());
        assert_eq!(config.default_chart_symbol, "BTCUSDT");
        assert_eq!(config.price_feed_api_key, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("COINFOLIO_LISTEN_ADDR", "127.0.0.1:9000"),
            ("COINFOLIO_FEED_TIMEOUT_MS", "2500"),
            ("COINFOLIO_BASE_PRICES", "solusdt=150, btcusdt = 60000"),
            ("COINFOLIO_TRADABLE_SYMBOLS", "btcusdt, ,ethusdt"),
            ("COINFOLIO_PRICE_FEED_API_KEY", "  "),
        ])
        .unwrap();

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.feed_timeout, Duration::from_millis(2500));
        assert_eq!(config.base_prices.get("SOLUSDT"), Some(&dec!(150)));
        assert_eq!(config.base_prices.get("BTCUSDT"), Some(&dec!(60000)));
        assert_eq!(config.tradable_symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(config.price_feed_api_key, None);
        assert_eq!(config.synthetic_config().default_base_price, dec!(45000));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("COINFOLIO_FEED_TIMEOUT_MS", "soon")]).is_err());
        assert!(config_from(&[("COINFOLIO_BASE_PRICES", "BTCUSDT")]).is_err());
        assert!(config_from(&[("COINFOLIO_LISTEN_ADDR", "nowhere")]).is_err());
    }
}
