//! Exchange ticker to CoinGecko coin id resolution.
//!
//! Ledger symbols are exchange pairs such as `BTCUSDT`, `eth-usd` or
//! `SOL/EUR`. The quote currency is stripped and the base asset is mapped to
//! a coin id. Unknown bases fall back to their lower-cased ticker.

/// Quote currencies recognised as pair suffixes, longest first.
const QUOTE_SUFFIXES: &[&str] = &["USDT", "USDC", "BUSD", "USD", "EUR"];

const COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("BNB", "binancecoin"),
    ("XRP", "ripple"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("DOT", "polkadot"),
    ("MATIC", "matic-network"),
    ("LTC", "litecoin"),
    ("AVAX", "avalanche-2"),
    ("LINK", "chainlink"),
    ("TRX", "tron"),
    ("XLM", "stellar"),
    ("ATOM", "cosmos"),
];

/// Base asset of an exchange pair, upper-cased.
pub fn base_asset(symbol: &str) -> String {
    let upper = symbol.trim().to_ascii_uppercase();

    for separator in ['-', '/', '_'] {
        if let Some((base, _quote)) = upper.split_once(separator) {
            if !base.is_empty() {
                return base.to_string();
            }
        }
    }

    for suffix in QUOTE_SUFFIXES {
        if let Some(base) = upper.strip_suffix(suffix) {
            if !base.is_empty() {
                return base.to_string();
            }
        }
    }

    upper
}

/// Resolve a ledger symbol to the coin id used in market chart URLs.
pub fn resolve_coin_id(symbol: &str) -> String {
    let base = base_asset(symbol);
    COIN_IDS
        .iter()
        .find(|(ticker, _)| *ticker == base)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| base.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_concatenated_pairs() {
        assert_eq!(resolve_coin_id("BTCUSDT"), "bitcoin");
        assert_eq!(resolve_coin_id("ethusdc"), "ethereum");
        assert_eq!(resolve_coin_id("SOLEUR"), "solana");
    }

    #[test]
    fn test_resolves_separated_pairs() {
        assert_eq!(resolve_coin_id("ETH-USD"), "ethereum");
        assert_eq!(resolve_coin_id("ada/usdt"), "cardano");
    }

    #[test]
    fn test_bare_ticker_and_unknown_base() {
        assert_eq!(resolve_coin_id("DOGE"), "dogecoin");
        assert_eq!(resolve_coin_id("PEPEUSDT"), "pepe");
    }

    #[test]
    fn test_quote_only_symbol_is_kept() {
        assert_eq!(base_asset("USDT"), "USDT");
    }
}
