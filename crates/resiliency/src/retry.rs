// Path: crates/resiliency/src/retry.rs
//! Retry schedules and backoff computation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    /// The same delay before every attempt.
    Constant,
    /// Delay doubles each attempt, capped at `max_delay`.
    #[default]
    Exponential,
}

/// A retry schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Backoff growth strategy.
    #[serde(default)]
    pub strategy: RetryStrategy,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay for backoff calculations.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Jitter factor in `[0.0, 1.0]`: each delay is scaled by a random
    /// factor in `[1 - jitter, 1 + jitter]`.
    #[serde(default)]
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: RetryStrategy::Exponential,
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: 0.2,
        }
    }
}

impl RetryConfig {
    /// The delay to sleep before retry number `attempt` (1-based: the
    /// first retry is attempt 1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = match self.strategy {
            RetryStrategy::Constant => self.base_delay,
            RetryStrategy::Exponential => {
                let shift = attempt.saturating_sub(1).min(31);
                let multiplier = 1u64.checked_shl(shift).unwrap_or(u64::MAX);
                self.base_delay
                    .checked_mul(multiplier.min(u32::MAX as u64) as u32)
                    .unwrap_or(self.max_delay)
            }
        };
        let capped = base.min(self.max_delay);
        apply_jitter(capped, self.jitter)
    }
}

fn apply_jitter(delay: Duration, jitter: f64) -> Duration {
    if jitter <= 0.0 || delay.is_zero() {
        return delay;
    }
    let jitter = jitter.min(1.0);
    let factor = rand::thread_rng().gen_range(1.0 - jitter..=1.0 + jitter);
    delay.mul_f64(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter(strategy: RetryStrategy) -> RetryConfig {
        RetryConfig {
            strategy,
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            jitter: 0.0,
        }
    }

    #[test]
    fn constant_delays_do_not_grow() {
        let config = no_jitter(RetryStrategy::Constant);
        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(4), Duration::from_millis(100));
    }

    #[test]
    fn exponential_doubles_and_caps() {
        let config = no_jitter(RetryStrategy::Exponential);
        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(400));
        // 100ms * 2^9 would be 51.2s; the cap holds it at 1s.
        assert_eq!(config.delay_for(10), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_in_band() {
        let config = RetryConfig {
            jitter: 0.5,
            ..no_jitter(RetryStrategy::Constant)
        };
        for _ in 0..100 {
            let delay = config.delay_for(1);
            assert!(delay >= Duration::from_millis(50));
            assert!(delay <= Duration::from_millis(150));
        }
    }
}
