//! Price series service: live feed with synthetic fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{MarketChartRequest, PriceSeries, Timeframe};
use crate::provider::PriceFeedProvider;
use crate::registry::{CircuitBreaker, CircuitBreakerConfig};
use crate::synthetic::{SyntheticSeriesConfig, SyntheticSeriesGenerator};

/// Source of price series for the portfolio engine.
///
/// `get_series` never fails: when the live feed is unavailable the returned
/// series is synthetic and says so.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    async fn get_series(&self, symbol: &str, timeframe: Timeframe) -> PriceSeries;
}

#[derive(Clone, Debug)]
pub struct PriceSeriesServiceConfig {
    pub fetch_timeout: Duration,
    pub synthetic: SyntheticSeriesConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for PriceSeriesServiceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            synthetic: SyntheticSeriesConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

pub struct PriceSeriesService {
    provider: Arc<dyn PriceFeedProvider>,
    generator: SyntheticSeriesGenerator,
    circuit_breaker: CircuitBreaker,
    fetch_timeout: Duration,
}

impl PriceSeriesService {
    pub fn new(provider: Arc<dyn PriceFeedProvider>, config: PriceSeriesServiceConfig) -> Self {
        Self {
            provider,
            generator: SyntheticSeriesGenerator::new(config.synthetic),
            circuit_breaker: CircuitBreaker::new(config.circuit_breaker),
            fetch_timeout: config.fetch_timeout,
        }
    }

    pub fn generator(&self) -> &SyntheticSeriesGenerator {
        &self.generator
    }

    /// Fetch a live series, without fallback.
    ///
    /// Honors the circuit breaker and the fetch timeout, and records the
    /// outcome against the breaker.
    pub async fn fetch_live(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<PriceSeries, MarketDataError> {
        let provider_id = self.provider.id();
        if !self.circuit_breaker.is_allowed(provider_id) {
            return Err(MarketDataError::CircuitOpen {
                provider: provider_id.to_string(),
            });
        }

        let request = MarketChartRequest::for_timeframe(symbol, timeframe);
        let fetched = tokio::time::timeout(self.fetch_timeout, self.provider.get_market_chart(&request))
            .await
            .unwrap_or_else(|_| {
                Err(MarketDataError::Timeout {
                    provider: provider_id.to_string(),
                })
            });

        let result = fetched.and_then(|points| PriceSeries::live(symbol, timeframe, points, provider_id));

        match &result {
            Ok(series) => {
                self.circuit_breaker.record_success(provider_id);
                debug!(
                    "Fetched {} live points for {} {} from {}",
                    series.points.len(),
                    symbol,
                    timeframe,
                    provider_id
                );
            }
            Err(e) if e.is_transient() => self.circuit_breaker.record_failure(provider_id),
            Err(_) => {}
        }
        result
    }
}

#[async_trait]
impl PriceSeriesProvider for PriceSeriesService {
    async fn get_series(&self, symbol: &str, timeframe: Timeframe) -> PriceSeries {
        match self.fetch_live(symbol, timeframe).await {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    "Price feed unavailable for {} {}: {}. Serving synthetic series.",
                    symbol, timeframe, e
                );
                self.generator
                    .generate(symbol, timeframe, Utc::now(), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Granularity, PricePoint};
    use crate::registry::CircuitState;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records requests and replays a fixed outcome.
    struct MockFeed {
        requests: Mutex<Vec<MarketChartRequest>>,
        calls: AtomicUsize,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MockFeed {
        fn ok() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail: false,
                delay: None,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl PriceFeedProvider for MockFeed {
        fn id(&self) -> &'static str {
            "MOCK"
        }

        async fn get_market_chart(
            &self,
            request: &MarketChartRequest,
        ) -> Result<Vec<PricePoint>, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(MarketDataError::ProviderError {
                    provider: "MOCK".to_string(),
                    message: "HTTP 503".to_string(),
                });
            }
            Ok(vec![
                PricePoint::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), dec!(47000)),
                PricePoint::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), dec!(46000)),
            ])
        }
    }

    fn service(feed: Arc<MockFeed>) -> PriceSeriesService {
        PriceSeriesService::new(
            feed,
            PriceSeriesServiceConfig {
                fetch_timeout: Duration::from_millis(200),
                synthetic: SyntheticSeriesConfig {
                    default_base_price: dec!(40000),
                    ..SyntheticSeriesConfig::default()
                },
                circuit_breaker: CircuitBreakerConfig {
                    failure_threshold: 2,
                    recovery_timeout: Duration::from_secs(60),
                    half_open_success_threshold: 1,
                },
            },
        )
    }

    #[tokio::test]
    async fn test_live_series_is_returned_sorted() {
        let feed = Arc::new(MockFeed::ok());
        let series = service(feed.clone()).get_series("BTCUSDT", Timeframe::OneDay).await;

        assert!(!series.is_synthetic);
        assert_eq!(series.source, "MOCK");
        assert_eq!(series.latest().unwrap().price, dec!(47000));
    }

    #[tokio::test]
    async fn test_timeframe_drives_request_parameters() {
        let feed = Arc::new(MockFeed::ok());
        let service = service(feed.clone());
        service.get_series("BTCUSDT", Timeframe::OneWeek).await;
        service.get_series("BTCUSDT", Timeframe::OneMonth).await;
        service.get_series("BTCUSDT", Timeframe::OneHour).await;

        let requests = feed.requests.lock().unwrap();
        assert_eq!((requests[0].days, requests[0].interval), (7, Granularity::Daily));
        assert_eq!((requests[1].days, requests[1].interval), (30, Granularity::Daily));
        assert_eq!((requests[2].days, requests[2].interval), (1, Granularity::Hourly));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_bounded_synthetic_series() {
        let feed = Arc::new(MockFeed::failing());
        let series = service(feed).get_series("BTCUSDT", Timeframe::OneWeek).await;

        assert!(series.is_synthetic);
        assert_eq!(series.points.len(), 7);
        assert!(series.fallback_reason.unwrap().contains("HTTP 503"));
        for point in &series.points {
            assert!(point.price >= dec!(38000));
            assert!(point.price <= dec!(40800));
        }
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_synthetic() {
        let feed = Arc::new(MockFeed::slow(Duration::from_secs(5)));
        let series = service(feed).get_series("ETHUSDT", Timeframe::OneDay).await;

        assert!(series.is_synthetic);
        assert_eq!(series.fallback_reason.as_deref(), Some("Timeout: MOCK"));
    }

    #[tokio::test]
    async fn test_open_circuit_skips_the_feed() {
        let feed = Arc::new(MockFeed::failing());
        let service = service(feed.clone());

        service.get_series("BTCUSDT", Timeframe::OneDay).await;
        service.get_series("BTCUSDT", Timeframe::OneDay).await;
        assert_eq!(service.circuit_breaker.state("MOCK"), CircuitState::Open);

        let series = service.get_series("BTCUSDT", Timeframe::OneDay).await;
        assert!(series.is_synthetic);
        assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
        assert_eq!(series.fallback_reason.as_deref(), Some("Circuit open: MOCK"));
    }
}
