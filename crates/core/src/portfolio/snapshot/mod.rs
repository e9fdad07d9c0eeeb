mod snapshot_aggregator;
mod snapshot_model;

#[cfg(test)]
mod snapshot_aggregator_tests;

pub use snapshot_aggregator::{aggregate, compare_holdings, select_chart_symbol};
pub use snapshot_model::PortfolioSnapshot;
