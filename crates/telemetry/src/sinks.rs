// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling the gateway from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured pub/sub metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn pubsub_metrics() -> &'static dyn PubSubMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured state metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn state_metrics() -> &'static dyn StateMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured invocation metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn invocation_metrics() -> &'static dyn InvocationMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured configuration metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn configuration_metrics() -> &'static dyn ConfigurationMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to pub/sub egress.
pub trait PubSubMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for published events, labeled by component,
    /// topic, and outcome.
    fn inc_egress(&self, pubsub: &str, topic: &str, success: bool);
    /// Adds to the counters for one bulk publish: events accepted by the
    /// broker and events the broker failed.
    fn inc_bulk_egress(&self, pubsub: &str, topic: &str, published: u64, failed: u64);
    /// Observes the latency of one publish dispatch.
    fn observe_publish_latency(&self, pubsub: &str, topic: &str, duration_secs: f64);
}
impl PubSubMetricsSink for NopSink {
    fn inc_egress(&self, _pubsub: &str, _topic: &str, _success: bool) {}
    fn inc_bulk_egress(&self, _pubsub: &str, _topic: &str, _published: u64, _failed: u64) {}
    fn observe_publish_latency(&self, _pubsub: &str, _topic: &str, _duration_secs: f64) {}
}

/// A sink for metrics related to the state building block.
pub trait StateMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for state operations, labeled by store,
    /// operation, and outcome.
    fn inc_operation(&self, store: &str, operation: &str, success: bool);
    /// Observes the latency of one state operation.
    fn observe_operation_latency(&self, store: &str, operation: &str, duration_secs: f64);
    /// Increments the counter for transactional operation batches, labeled
    /// by store. `operations` is the caller-visible operation count.
    fn inc_transaction(&self, store: &str, operations: u64);
}
impl StateMetricsSink for NopSink {
    fn inc_operation(&self, _store: &str, _operation: &str, _success: bool) {}
    fn observe_operation_latency(&self, _store: &str, _operation: &str, _duration_secs: f64) {}
    fn inc_transaction(&self, _store: &str, _operations: u64) {}
}

/// A sink for metrics related to bindings, actors, and direct invocation.
pub trait InvocationMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for output binding invocations.
    fn inc_binding(&self, name: &str, operation: &str, success: bool);
    /// Increments the counter for direct service invocations.
    fn inc_service(&self, target_app: &str, success: bool);
    /// Increments the counter for actor method invocations.
    fn inc_actor(&self, actor_type: &str, success: bool);
    /// Observes the latency of one direct service invocation.
    fn observe_service_latency(&self, target_app: &str, duration_secs: f64);
}
impl InvocationMetricsSink for NopSink {
    fn inc_binding(&self, _name: &str, _operation: &str, _success: bool) {}
    fn inc_service(&self, _target_app: &str, _success: bool) {}
    fn inc_actor(&self, _actor_type: &str, _success: bool) {}
    fn observe_service_latency(&self, _target_app: &str, _duration_secs: f64) {}
}

/// A sink for metrics related to configuration subscriptions.
pub trait ConfigurationMetricsSink: Send + Sync + std::fmt::Debug {
    /// Sets the gauge for currently live subscriptions.
    fn set_active_subscriptions(&self, count: u64);
    /// Increments the counter for update batches forwarded to consumers.
    fn inc_updates_forwarded(&self, store: &str);
}
impl ConfigurationMetricsSink for NopSink {
    fn set_active_subscriptions(&self, _count: u64) {}
    fn inc_updates_forwarded(&self, _store: &str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by taxonomy
    /// kind and stable error code.
    fn inc_error(&self, kind: &'static str, code: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _code: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink:
    PubSubMetricsSink
    + StateMetricsSink
    + InvocationMetricsSink
    + ConfigurationMetricsSink
    + ErrorMetricsSink
{
}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where
    T: PubSubMetricsSink
        + StateMetricsSink
        + InvocationMetricsSink
        + ConfigurationMetricsSink
        + ErrorMetricsSink
{
}
