//! Per-provider circuit breaker.
//!
//! After `failure_threshold` consecutive transient failures the circuit opens
//! and the series service stops calling the provider, serving synthetic data
//! straight away. Once `recovery_timeout` has elapsed one probe request is let
//! through (half-open); enough successes close the circuit again, any failure
//! re-opens it. State is in-memory only.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_HALF_OPEN_SUCCESSES: u32 = 1;

/// Externally visible circuit state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
    pub half_open_success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
            half_open_success_threshold: DEFAULT_HALF_OPEN_SUCCESSES,
        }
    }
}

/// Internal state, carrying only what each state needs.
#[derive(Debug)]
enum Circuit {
    Closed { consecutive_failures: u32 },
    Open { opened_at: Instant },
    HalfOpen { successes: u32 },
}

impl Circuit {
    fn state(&self) -> CircuitState {
        match self {
            Circuit::Closed { .. } => CircuitState::Closed,
            Circuit::Open { .. } => CircuitState::Open,
            Circuit::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, Circuit>>,
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// A poisoned lock only means a panic happened mid-update; the circuit map
    /// is still usable, so recover instead of propagating the panic.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Whether a request to `provider` may go out now.
    ///
    /// Moves an open circuit to half-open once the recovery timeout elapsed.
    pub fn is_allowed(&self, provider: &str) -> bool {
        let mut circuits = self.lock();
        let circuit = circuits
            .entry(provider.to_string())
            .or_insert(Circuit::Closed {
                consecutive_failures: 0,
            });

        match circuit {
            Circuit::Closed { .. } | Circuit::HalfOpen { .. } => true,
            Circuit::Open { opened_at } => {
                if opened_at.elapsed() >= self.config.recovery_timeout {
                    info!("Circuit breaker: '{}' Open -> HalfOpen", provider);
                    *circuit = Circuit::HalfOpen { successes: 0 };
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self, provider: &str) {
        let mut circuits = self.lock();
        let circuit = circuits
            .entry(provider.to_string())
            .or_insert(Circuit::Closed {
                consecutive_failures: 0,
            });

        match circuit {
            Circuit::Closed {
                consecutive_failures,
            } => *consecutive_failures = 0,
            Circuit::HalfOpen { successes } => {
                *successes += 1;
                if *successes >= self.config.half_open_success_threshold {
                    info!("Circuit breaker: '{}' HalfOpen -> Closed", provider);
                    *circuit = Circuit::Closed {
                        consecutive_failures: 0,
                    };
                }
            }
            Circuit::Open { .. } => {
                debug!(
                    "Circuit breaker: late success for '{}' while open, ignored",
                    provider
                );
            }
        }
    }

    pub fn record_failure(&self, provider: &str) {
        let mut circuits = self.lock();
        let circuit = circuits
            .entry(provider.to_string())
            .or_insert(Circuit::Closed {
                consecutive_failures: 0,
            });

        match circuit {
            Circuit::Closed {
                consecutive_failures,
            } => {
                *consecutive_failures += 1;
                if *consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        "Circuit breaker: '{}' Closed -> Open after {} failures",
                        provider, consecutive_failures
                    );
                    *circuit = Circuit::Open {
                        opened_at: Instant::now(),
                    };
                }
            }
            Circuit::HalfOpen { .. } => {
                warn!("Circuit breaker: '{}' probe failed, HalfOpen -> Open", provider);
                *circuit = Circuit::Open {
                    opened_at: Instant::now(),
                };
            }
            Circuit::Open { opened_at } => *opened_at = Instant::now(),
        }
    }

    pub fn state(&self, provider: &str) -> CircuitState {
        self.lock()
            .get(provider)
            .map(Circuit::state)
            .unwrap_or(CircuitState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(recovery_timeout: Duration) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            recovery_timeout,
            half_open_success_threshold: 1,
        })
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = breaker(Duration::from_secs(60));
        cb.record_failure("FEED");
        assert_eq!(cb.state("FEED"), CircuitState::Closed);
        assert!(cb.is_allowed("FEED"));

        cb.record_failure("FEED");
        assert_eq!(cb.state("FEED"), CircuitState::Open);
        assert!(!cb.is_allowed("FEED"));
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cb = breaker(Duration::from_secs(60));
        cb.record_failure("FEED");
        cb.record_success("FEED");
        cb.record_failure("FEED");
        assert_eq!(cb.state("FEED"), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_probe_closes_on_success() {
        let cb = breaker(Duration::ZERO);
        cb.record_failure("FEED");
        cb.record_failure("FEED");
        assert_eq!(cb.state("FEED"), CircuitState::Open);

        assert!(cb.is_allowed("FEED"));
        assert_eq!(cb.state("FEED"), CircuitState::HalfOpen);

        cb.record_success("FEED");
        assert_eq!(cb.state("FEED"), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_probe_failure_reopens() {
        let cb = breaker(Duration::ZERO);
        cb.record_failure("FEED");
        cb.record_failure("FEED");
        assert!(cb.is_allowed("FEED"));

        cb.record_failure("FEED");
        assert_eq!(cb.state("FEED"), CircuitState::Open);
    }

    #[test]
    fn test_providers_are_independent() {
        let cb = breaker(Duration::from_secs(60));
        cb.record_failure("A");
        cb.record_failure("A");
        assert!(!cb.is_allowed("A"));
        assert!(cb.is_allowed("B"));
    }
}
