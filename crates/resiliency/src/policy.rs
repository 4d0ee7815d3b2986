// Path: crates/resiliency/src/policy.rs
//! Policy definitions and resolution.
//!
//! A policy is the triple `{timeout, retry schedule, breaker rule}` under a
//! name. The provider resolves policies by `(component name, component
//! kind)` for building-block calls and by `(endpoint id, method)` for
//! direct invocation, falling back to named defaults.

use crate::breaker::BreakerConfig;
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// One named resiliency policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy name, for logs and metrics.
    pub name: String,
    /// Wall-clock budget for the whole call, independent of retries.
    pub timeout: Option<Duration>,
    /// Retry schedule. `None` means a single attempt.
    pub retry: Option<RetryConfig>,
    /// Circuit breaker rule. `None` means no breaker.
    pub breaker: Option<BreakerConfig>,
}

impl Policy {
    /// A policy that does nothing: no timeout, no retries, no breaker.
    pub fn passthrough(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Resolves policies for call sites.
///
/// Registration is rare (startup); resolution is the hot path and clones
/// `Arc`s out of plain maps.
#[derive(Debug, Default)]
pub struct ResiliencyProvider {
    default_policy: Option<Arc<Policy>>,
    /// Keyed by `(component name, component kind)`.
    component_policies: HashMap<(String, String), Arc<Policy>>,
    /// Keyed by `(endpoint id, method)`. An empty method entry is the
    /// endpoint-wide fallback.
    endpoint_policies: HashMap<(String, String), Arc<Policy>>,
}

impl ResiliencyProvider {
    /// Creates an empty provider; unresolved lookups yield `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the process-wide default policy.
    pub fn set_default(&mut self, policy: Policy) {
        self.default_policy = Some(Arc::new(policy));
    }

    /// Registers a policy for a component.
    pub fn add_component_policy(&mut self, name: &str, kind: &str, policy: Policy) {
        self.component_policies
            .insert((name.to_string(), kind.to_string()), Arc::new(policy));
    }

    /// Registers a policy for a direct-invocation endpoint. Pass an empty
    /// `method` to cover every method of the endpoint.
    pub fn add_endpoint_policy(&mut self, endpoint: &str, method: &str, policy: Policy) {
        self.endpoint_policies
            .insert((endpoint.to_string(), method.to_string()), Arc::new(policy));
    }

    /// Resolves the policy for a building-block call.
    pub fn policy_for_component(&self, name: &str, kind: &str) -> Option<Arc<Policy>> {
        self.component_policies
            .get(&(name.to_string(), kind.to_string()))
            .cloned()
            .or_else(|| self.default_policy.clone())
    }

    /// Resolves the policy for a direct-invocation call.
    pub fn policy_for_endpoint(&self, endpoint: &str, method: &str) -> Option<Arc<Policy>> {
        self.endpoint_policies
            .get(&(endpoint.to_string(), method.to_string()))
            .cloned()
            .or_else(|| {
                self.endpoint_policies
                    .get(&(endpoint.to_string(), String::new()))
                    .cloned()
            })
            .or_else(|| self.default_policy.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_resolution_falls_back_to_default() {
        let mut provider = ResiliencyProvider::new();
        provider.set_default(Policy::passthrough("default"));
        provider.add_component_policy("ps1", "pubsub", Policy::passthrough("ps1-policy"));

        assert_eq!(
            provider.policy_for_component("ps1", "pubsub").unwrap().name,
            "ps1-policy"
        );
        assert_eq!(
            provider.policy_for_component("other", "pubsub").unwrap().name,
            "default"
        );
    }

    #[test]
    fn endpoint_resolution_prefers_method_over_wildcard() {
        let mut provider = ResiliencyProvider::new();
        provider.add_endpoint_policy("app2", "", Policy::passthrough("app2-any"));
        provider.add_endpoint_policy("app2", "charge", Policy::passthrough("app2-charge"));

        assert_eq!(
            provider.policy_for_endpoint("app2", "charge").unwrap().name,
            "app2-charge"
        );
        assert_eq!(
            provider.policy_for_endpoint("app2", "refund").unwrap().name,
            "app2-any"
        );
        assert!(provider.policy_for_endpoint("app3", "x").is_none());
    }
}
