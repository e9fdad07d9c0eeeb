//! Portfolio module - positions, valuation and account snapshots.

pub mod positions;
pub mod snapshot;
pub mod valuation;

mod chart_requests;
mod portfolio_service;
mod portfolio_traits;


pub use chart_requests::ChartRequestTracker;
pub use portfolio_service::{PortfolioService, PortfolioServiceConfig};
pub use portfolio_traits::PortfolioServiceTrait;
pub use positions::{reconstruct, replay_ledger, LedgerReplay, Position, PositionBook};
pub use snapshot::{aggregate, select_chart_symbol, PortfolioSnapshot};
pub use valuation::{valuate, LastKnownPrices, PriceInput, ValuedPosition};
