// Path: crates/resiliency/src/executor.rs
//! The policy executor: timeout, retry, and breaker around one dispatch.

use crate::breaker::CircuitBreaker;
use crate::policy::Policy;
use dashmap::DashMap;
use portico_types::error::DriverError;
use std::future::Future;
use std::sync::Arc;

/// Identifies the breaker slot for one call.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    /// The component (or endpoint) name.
    pub component: &'a str,
    /// The operation being dispatched.
    pub operation: &'a str,
}

/// Runs thunks under resiliency policies.
///
/// Breaker state is process-wide and keyed by `(component, operation)`;
/// everything else is per call. The executor holds no per-request state, so
/// one instance is shared by the whole gateway.
#[derive(Debug, Default)]
pub struct PolicyExecutor {
    breakers: DashMap<(String, String), Arc<CircuitBreaker>>,
}

impl PolicyExecutor {
    /// Creates an executor with no tripped breakers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches `op` under `policy`.
    ///
    /// `replayable` is set by the gateway on read-only calls and on writes
    /// whose caller signaled idempotency; without it the thunk runs at most
    /// once. The whole call, retries and backoff sleeps included, runs
    /// under the policy's wall-clock timeout. Dropping the returned future
    /// (caller cancellation) unwinds at the next await without further
    /// retries.
    pub async fn run<T, F, Fut>(
        &self,
        policy: &Policy,
        target: Target<'_>,
        replayable: bool,
        op: F,
    ) -> Result<T, DriverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DriverError>>,
    {
        let breaker = policy
            .breaker
            .map(|config| self.breaker_for(target, config));

        let attempts = self.attempt_loop(policy, breaker.as_deref(), replayable, op);
        match policy.timeout {
            Some(budget) => match tokio::time::timeout(budget, attempts).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::debug!(
                        policy = %policy.name,
                        component = target.component,
                        operation = target.operation,
                        "call exceeded policy timeout"
                    );
                    Err(DriverError::Timeout)
                }
            },
            None => attempts.await,
        }
    }

    async fn attempt_loop<T, F, Fut>(
        &self,
        policy: &Policy,
        breaker: Option<&CircuitBreaker>,
        replayable: bool,
        mut op: F,
    ) -> Result<T, DriverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DriverError>>,
    {
        let max_retries = match (&policy.retry, replayable) {
            (Some(retry), true) => retry.max_retries,
            _ => 0,
        };

        let mut attempt: u32 = 0;
        loop {
            if let Some(breaker) = breaker {
                if !breaker.try_acquire() {
                    return Err(DriverError::Unavailable(
                        "circuit breaker is open".to_string(),
                    ));
                }
            }

            match op().await {
                Ok(value) => {
                    if let Some(breaker) = breaker {
                        breaker.on_success();
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if let Some(breaker) = breaker {
                        breaker.on_failure();
                    }
                    if attempt >= max_retries || !err.is_retryable() {
                        return Err(err);
                    }
                    attempt += 1;
                    if let Some(retry) = &policy.retry {
                        let delay = retry.delay_for(attempt);
                        tracing::debug!(
                            policy = %policy.name,
                            attempt,
                            ?delay,
                            error = %err,
                            "retrying after transient failure"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    fn breaker_for(
        &self,
        target: Target<'_>,
        config: crate::breaker::BreakerConfig,
    ) -> Arc<CircuitBreaker> {
        self.breakers
            .entry((target.component.to_string(), target.operation.to_string()))
            .or_insert_with(|| Arc::new(CircuitBreaker::new(config)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::BreakerConfig;
    use crate::retry::{RetryConfig, RetryStrategy};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn target() -> Target<'static> {
        Target {
            component: "store1",
            operation: "get",
        }
    }

    fn retrying_policy(max_retries: u32) -> Policy {
        Policy {
            name: "test".into(),
            timeout: None,
            retry: Some(RetryConfig {
                strategy: RetryStrategy::Constant,
                max_retries,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
                jitter: 0.0,
            }),
            breaker: None,
        }
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let executor = PolicyExecutor::new();
        let calls = AtomicU32::new(0);
        let result = executor
            .run(&retrying_policy(5), target(), true, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(DriverError::Unavailable("flake".into()))
                    } else {
                        Ok(42u32)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn condition_failed_is_never_retried() {
        let executor = PolicyExecutor::new();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = executor
            .run(&retrying_policy(5), target(), true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DriverError::EtagMismatch("stored etag is 2".into())) }
            })
            .await;
        assert!(matches!(result, Err(DriverError::EtagMismatch(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_replayable_calls_run_once() {
        let executor = PolicyExecutor::new();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = executor
            .run(&retrying_policy(5), target(), false, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DriverError::Unavailable("down".into())) }
            })
            .await;
        assert!(matches!(result, Err(DriverError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_independent_of_retry_schedule() {
        let executor = PolicyExecutor::new();
        let policy = Policy {
            timeout: Some(Duration::from_millis(50)),
            ..retrying_policy(u32::MAX)
        };
        let result: Result<(), _> = executor
            .run(&policy, target(), true, || async {
                Err(DriverError::Unavailable("down".into()))
            })
            .await;
        assert!(matches!(result, Err(DriverError::Timeout)));
    }

    #[tokio::test]
    async fn breaker_opens_and_refuses() {
        let executor = PolicyExecutor::new();
        let policy = Policy {
            name: "breaking".into(),
            timeout: None,
            retry: None,
            breaker: Some(BreakerConfig {
                failure_threshold: 2,
                cooldown: Duration::from_secs(600),
            }),
        };
        for _ in 0..2 {
            let _: Result<(), _> = executor
                .run(&policy, target(), false, || async {
                    Err(DriverError::Internal("boom".into()))
                })
                .await;
        }
        // Breaker is now open: the thunk must not run.
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = executor
            .run(&policy, target(), false, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert!(matches!(result, Err(DriverError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn breakers_are_scoped_per_operation() {
        let executor = PolicyExecutor::new();
        let policy = Policy {
            name: "breaking".into(),
            timeout: None,
            retry: None,
            breaker: Some(BreakerConfig {
                failure_threshold: 1,
                cooldown: Duration::from_secs(600),
            }),
        };
        let _: Result<(), _> = executor
            .run(&policy, target(), false, || async {
                Err(DriverError::Internal("boom".into()))
            })
            .await;
        // Same component, different operation: separate breaker slot.
        let other = Target {
            component: "store1",
            operation: "set",
        };
        let result = executor.run(&policy, other, false, || async { Ok(7u8) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
