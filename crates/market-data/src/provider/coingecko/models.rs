use serde::Deserialize;

/// Response from /coins/{id}/market_chart.
///
/// Only `prices` is used; `market_caps` and `total_volumes` are ignored.
#[derive(Debug, Deserialize)]
pub(super) struct MarketChartResponse {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

/// Error body returned by CoinGecko, in either of its two shapes.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponse {
    pub error: Option<String>,
    pub status: Option<ErrorStatus>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorStatus {
    pub error_message: Option<String>,
}

impl ErrorResponse {
    pub fn message(self) -> Option<String> {
        self.error
            .or_else(|| self.status.and_then(|status| status.error_message))
    }
}
