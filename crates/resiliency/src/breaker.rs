// Path: crates/resiliency/src/breaker.rs
//! The circuit breaker state machine.
//!
//! One breaker guards one `(component, operation)` pair. States move
//! `Closed → Open → HalfOpen` and back; half-open admits exactly one probe
//! call, and every other caller is refused until the probe settles.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Breaker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures that trip the breaker open.
    pub failure_threshold: u32,
    /// How long the breaker stays open before admitting a probe.
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
enum State {
    Closed { consecutive_failures: u32 },
    Open { until: Instant },
    HalfOpen { probe_in_flight: bool },
}

/// A circuit breaker for one `(component, operation)` pair.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    /// Creates a closed breaker.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    /// Asks the breaker to admit one call. Returns `false` when the call
    /// must be refused (open, or a half-open probe is already in flight).
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        match &mut *state {
            State::Closed { .. } => true,
            State::Open { until } => {
                if Instant::now() >= *until {
                    *state = State::HalfOpen {
                        probe_in_flight: true,
                    };
                    true
                } else {
                    false
                }
            }
            State::HalfOpen { probe_in_flight } => {
                if *probe_in_flight {
                    false
                } else {
                    *probe_in_flight = true;
                    true
                }
            }
        }
    }

    /// Records a successful call.
    pub fn on_success(&self) {
        let mut state = self.state.lock();
        *state = State::Closed {
            consecutive_failures: 0,
        };
    }

    /// Records a failed call.
    pub fn on_failure(&self) {
        let mut state = self.state.lock();
        match &mut *state {
            State::Closed {
                consecutive_failures,
            } => {
                *consecutive_failures += 1;
                if *consecutive_failures >= self.config.failure_threshold {
                    *state = State::Open {
                        until: Instant::now() + self.config.cooldown,
                    };
                }
            }
            State::HalfOpen { .. } => {
                // The probe failed; back to open for a full cooldown.
                *state = State::Open {
                    until: Instant::now() + self.config.cooldown,
                };
            }
            State::Open { .. } => {}
        }
    }

    /// Whether the breaker is currently refusing calls.
    pub fn is_open(&self) -> bool {
        matches!(&*self.state.lock(), State::Open { until } if Instant::now() < *until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown: Duration) -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig {
            failure_threshold: threshold,
            cooldown,
        })
    }

    #[test]
    fn trips_after_threshold() {
        let cb = breaker(3, Duration::from_secs(60));
        for _ in 0..2 {
            assert!(cb.try_acquire());
            cb.on_failure();
        }
        assert!(!cb.is_open());
        assert!(cb.try_acquire());
        cb.on_failure();
        assert!(cb.is_open());
        assert!(!cb.try_acquire());
    }

    #[test]
    fn success_resets_failure_count() {
        let cb = breaker(2, Duration::from_secs(60));
        cb.try_acquire();
        cb.on_failure();
        cb.try_acquire();
        cb.on_success();
        cb.try_acquire();
        cb.on_failure();
        assert!(!cb.is_open());
    }

    #[test]
    fn half_open_admits_single_probe() {
        let cb = breaker(1, Duration::from_millis(0));
        cb.try_acquire();
        cb.on_failure();
        // Cooldown of zero: the next acquire becomes the half-open probe.
        assert!(cb.try_acquire());
        // A second concurrent caller is refused while the probe is out.
        assert!(!cb.try_acquire());
        cb.on_success();
        assert!(cb.try_acquire());
    }

    #[test]
    fn failed_probe_reopens() {
        let cb = breaker(1, Duration::from_millis(0));
        cb.try_acquire();
        cb.on_failure();
        assert!(cb.try_acquire());
        cb.on_failure();
        // Cooldown is zero, so the breaker re-admits a fresh probe.
        assert!(cb.try_acquire());
        assert!(!cb.try_acquire());
    }
}
