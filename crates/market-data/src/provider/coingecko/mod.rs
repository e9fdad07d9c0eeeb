//! CoinGecko market chart provider.
//!
//! Uses the public `/coins/{id}/market_chart` endpoint, which returns
//! `[timestamp_ms, price]` pairs. An optional demo API key is sent as the
//! `x-cg-demo-api-key` header.
//! API documentation: https://docs.coingecko.com/reference/coins-id-market-chart

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{MarketChartRequest, PricePoint};
use crate::provider::PriceFeedProvider;
use crate::resolver::resolve_coin_id;

use models::{ErrorResponse, MarketChartResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER_ID: &str = "COINGECKO";

/// CoinGecko market data provider.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    vs_currency: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    /// Create a provider quoting prices in `vs_currency` (e.g. "usd").
    pub fn new(base_url: &str, vs_currency: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            vs_currency: vs_currency.to_ascii_lowercase(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    async fn fetch(&self, coin_id: &str, params: &[(&str, String)]) -> Result<String, MarketDataError> {
        let url = format!(
            "{}/coins/{}/market_chart",
            self.base_url,
            urlencoding::encode(coin_id)
        );

        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        debug!("CoinGecko request: {} with {:?}", url, params);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(coin_id.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(ErrorResponse::message)
                .unwrap_or_else(|| format!("HTTP {} - {}", status, body));
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message,
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }
}

/// Parse a market chart body into price points.
///
/// Timestamps are epoch milliseconds. Points with a timestamp that cannot be
/// represented are skipped; a non-finite price fails the whole response.
pub(crate) fn parse_market_chart(body: &str) -> Result<Vec<PricePoint>, MarketDataError> {
    let response: MarketChartResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse market chart response: {}", e),
        })?;

    let mut points = Vec::with_capacity(response.prices.len());
    for (timestamp_ms, price) in response.prices {
        let Some(timestamp) = Utc.timestamp_millis_opt(timestamp_ms as i64).single() else {
            warn!("Skipping CoinGecko point with invalid timestamp {}", timestamp_ms);
            continue;
        };
        let price = Decimal::try_from(price).map_err(|_| MarketDataError::ValidationFailed {
            message: format!("Invalid price {} at {}", price, timestamp),
        })?;
        points.push(PricePoint::new(timestamp, price));
    }
    Ok(points)
}

#[async_trait]
impl PriceFeedProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_market_chart(
        &self,
        request: &MarketChartRequest,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let coin_id = resolve_coin_id(&request.symbol);
        let params = [
            ("vs_currency", self.vs_currency.clone()),
            ("days", request.days.to_string()),
            ("interval", request.interval.as_interval().to_string()),
        ];
        let body = self.fetch(&coin_id, &params).await?;
        parse_market_chart(&body)
    }
}
