use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coinfolio_market_data::{PriceSeries, PriceSeriesProvider, Timeframe};
use futures::future::join_all;
use log::{debug, info};

use super::chart_requests::ChartRequestTracker;
use super::portfolio_traits::PortfolioServiceTrait;
use super::positions::{replay_ledger, Position};
use super::snapshot::{aggregate, select_chart_symbol, PortfolioSnapshot};
use super::valuation::{valuate, LastKnownPrices, PriceInput, ValuedPosition};
use crate::constants::DEFAULT_CHART_SYMBOL;
use crate::errors::require_account_id;
use crate::trades::TradeLedgerSource;
use crate::Result;

#[derive(Clone, Debug)]
pub struct PortfolioServiceConfig {
    /// Timeframe fetched to obtain spot prices and the 24h change.
    pub valuation_timeframe: Timeframe,
    /// Charted when the account holds nothing.
    pub default_chart_symbol: String,
}

impl Default for PortfolioServiceConfig {
    fn default() -> Self {
        Self {
            valuation_timeframe: Timeframe::OneDay,
            default_chart_symbol: DEFAULT_CHART_SYMBOL.to_string(),
        }
    }
}

/// Runs the ledger -> positions -> valuation -> snapshot pipeline.
pub struct PortfolioService {
    ledger: Arc<dyn TradeLedgerSource>,
    prices: Arc<dyn PriceSeriesProvider>,
    last_known_prices: Arc<LastKnownPrices>,
    chart_requests: ChartRequestTracker,
    config: PortfolioServiceConfig,
}

impl PortfolioService {
    pub fn new(
        ledger: Arc<dyn TradeLedgerSource>,
        prices: Arc<dyn PriceSeriesProvider>,
        config: PortfolioServiceConfig,
    ) -> Self {
        Self {
            ledger,
            prices,
            last_known_prices: Arc::new(LastKnownPrices::new()),
            chart_requests: ChartRequestTracker::new(),
            config,
        }
    }

    /// Shares a last-known price cache with other services.
    pub fn with_last_known_prices(mut self, last_known_prices: Arc<LastKnownPrices>) -> Self {
        self.last_known_prices = last_known_prices;
        self
    }

    pub fn last_known_prices(&self) -> &Arc<LastKnownPrices> {
        &self.last_known_prices
    }

    /// Fetches one series per position concurrently and values each position.
    async fn value_positions(&self, positions: &[&Position]) -> Vec<ValuedPosition> {
        let timeframe = self.config.valuation_timeframe;
        let series_list = join_all(
            positions
                .iter()
                .map(|position| self.prices.get_series(&position.symbol, timeframe)),
        )
        .await;

        positions
            .iter()
            .zip(series_list.iter())
            .map(|(position, series)| {
                self.last_known_prices.record_series(series);
                let last_known = self.last_known_prices.get(&position.symbol);
                valuate(position, PriceInput::select(series, last_known.as_ref()))
            })
            .collect()
    }
}

/// Later of the newest filled trade and the newest price used, so the
/// snapshot depends only on its inputs. The epoch when there is neither.
fn snapshot_as_of(
    last_trade_at: Option<DateTime<Utc>>,
    valued_positions: &[ValuedPosition],
) -> DateTime<Utc> {
    valued_positions
        .iter()
        .filter_map(|v| v.price_as_of)
        .chain(last_trade_at)
        .max()
        .unwrap_or_default()
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn get_portfolio_snapshot(&self, account_id: &str) -> Result<PortfolioSnapshot> {
        require_account_id(account_id)?;
        let replay = replay_ledger(self.ledger.as_ref(), account_id).await?;
        let active: Vec<&Position> = replay.book.active().collect();

        let valued_positions = self.value_positions(&active).await;
        let as_of = snapshot_as_of(replay.book.last_trade_at(), &valued_positions);

        let mut snapshot = aggregate(account_id, valued_positions, as_of);
        snapshot.rejected_records = replay.rejected.len();
        snapshot.has_data_inconsistency |= replay.book.has_data_inconsistency();

        info!(
            "Snapshot for account {}: {} positions, total value {}, {} rejected records",
            account_id,
            snapshot.valued_positions.len(),
            snapshot.total_value,
            snapshot.rejected_records
        );
        Ok(snapshot)
    }

    async fn get_chart_series(
        &self,
        account_id: &str,
        timeframe: Timeframe,
    ) -> Result<Option<PriceSeries>> {
        require_account_id(account_id)?;
        let ticket = self.chart_requests.begin(account_id);

        let snapshot = self.get_portfolio_snapshot(account_id).await?;
        let symbol = select_chart_symbol(&snapshot.valued_positions)
            .unwrap_or(self.config.default_chart_symbol.as_str())
            .to_string();

        let series = self.prices.get_series(&symbol, timeframe).await;
        self.last_known_prices.record_series(&series);

        if !self.chart_requests.is_current(account_id, ticket) {
            debug!(
                "Discarding {} chart for account {}: superseded by a newer request",
                timeframe, account_id
            );
            return Ok(None);
        }
        Ok(Some(series))
    }
}
