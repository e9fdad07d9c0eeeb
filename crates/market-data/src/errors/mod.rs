//! Error types for the market data crate.
//!
//! Every variant here is a "feed unavailable" cause from the portfolio
//! engine's point of view: the series service converts them into a flagged
//! synthetic series instead of propagating them.

use thiserror::Error;

/// Errors that can occur while fetching a live price series.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol is unknown to the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider answered but returned no price points.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited { provider: String },

    /// The request did not complete within the configured timeout.
    #[error("Timeout: {provider}")]
    Timeout { provider: String },

    /// A provider-specific failure (bad status, unreadable body).
    #[error("Provider error: {provider} - {message}")]
    ProviderError { provider: String, message: String },

    /// The provider returned data that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// The circuit breaker is open for this provider.
    #[error("Circuit open: {provider}")]
    CircuitOpen { provider: String },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether this failure says something about the provider's health.
    ///
    /// Transient failures are recorded against the circuit breaker. Bad
    /// symbols and empty ranges are request problems and are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::ProviderError { .. }
            | Self::Network(_) => true,
            Self::SymbolNotFound(_)
            | Self::NoDataForRange
            | Self::ValidationFailed { .. }
            | Self::CircuitOpen { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_transient() {
        let error = MarketDataError::Timeout {
            provider: "COINGECKO".to_string(),
        };
        assert!(error.is_transient());
    }

    #[test]
    fn test_symbol_not_found_is_not_transient() {
        let error = MarketDataError::SymbolNotFound("NOPEUSDT".to_string());
        assert!(!error.is_transient());
    }

    #[test]
    fn test_circuit_open_is_not_recorded_again() {
        let error = MarketDataError::CircuitOpen {
            provider: "COINGECKO".to_string(),
        };
        assert!(!error.is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::ProviderError {
            provider: "COINGECKO".to_string(),
            message: "HTTP 500".to_string(),
        };
        assert_eq!(format!("{}", error), "Provider error: COINGECKO - HTTP 500");

        let error = MarketDataError::RateLimited {
            provider: "COINGECKO".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: COINGECKO");
    }
}
