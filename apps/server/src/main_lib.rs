use std::sync::Arc;

use chrono::{DateTime, Utc};
use coinfolio_core::portfolio::{PortfolioService, PortfolioServiceConfig, PortfolioServiceTrait};
use coinfolio_core::trades::{LedgerApiClient, TradeService, TradeServiceTrait};
use coinfolio_market_data::{
    CoinGeckoProvider, PriceSeriesService, PriceSeriesServiceConfig, Timeframe,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub trade_service: Arc<dyn TradeServiceTrait>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        portfolio_service: Arc<dyn PortfolioServiceTrait>,
        trade_service: Arc<dyn TradeServiceTrait>,
    ) -> Self {
        Self {
            portfolio_service,
            trade_service,
            started_at: Utc::now(),
        }
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("COINFOLIO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let ledger = Arc::new(LedgerApiClient::new(&config.ledger_url, config.request_timeout));
    tracing::info!("Trade ledger at {}", config.ledger_url);

    let feed = CoinGeckoProvider::new(&config.price_feed_url, &config.vs_currency, config.feed_timeout)
        .with_api_key(config.price_feed_api_key.clone());
    let prices = Arc::new(PriceSeriesService::new(
        Arc::new(feed),
        PriceSeriesServiceConfig {
            fetch_timeout: config.feed_timeout,
            synthetic: config.synthetic_config(),
            ..PriceSeriesServiceConfig::default()
        },
    ));
    tracing::info!(
        "Price feed at {} quoting in {}",
        config.price_feed_url,
        config.vs_currency
    );

    let portfolio_service = Arc::new(PortfolioService::new(
        ledger.clone(),
        prices,
        PortfolioServiceConfig {
            valuation_timeframe: Timeframe::OneDay,
            default_chart_symbol: config.default_chart_symbol.clone(),
        },
    ));

    if config.tradable_symbols.is_empty() {
        tracing::warn!("COINFOLIO_TRADABLE_SYMBOLS is empty; any symbol may be ordered");
    }
    let trade_service = Arc::new(TradeService::new(
        ledger.clone(),
        ledger,
        config.tradable_symbols.clone(),
    ));

    Ok(Arc::new(AppState::new(portfolio_service, trade_service)))
}
