use async_trait::async_trait;
use coinfolio_market_data::{PriceSeries, Timeframe};

use super::snapshot::PortfolioSnapshot;
use crate::Result;

#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Rebuilds the account's snapshot from the ledger and current prices.
    /// Safe to call repeatedly; unchanged inputs give an identical snapshot.
    async fn get_portfolio_snapshot(&self, account_id: &str) -> Result<PortfolioSnapshot>;

    /// Price series for the account's largest holding.
    ///
    /// Returns `Ok(None)` when a newer chart request for the same account
    /// started before this one finished.
    async fn get_chart_series(
        &self,
        account_id: &str,
        timeframe: Timeframe,
    ) -> Result<Option<PriceSeries>>;
}
