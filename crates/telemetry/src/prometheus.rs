// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_histogram_vec, register_int_counter_vec,
    Gauge, HistogramVec, IntCounterVec,
};

// --- Metric Statics ---
// We use OnceCell to hold the metric collectors. They will be initialized
// exactly once by the `install` function.

static PUBSUB_EGRESS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static PUBSUB_BULK_EVENTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static PUBSUB_PUBLISH_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static STATE_OPERATIONS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static STATE_OPERATION_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static STATE_TRANSACTION_OPS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static BINDING_INVOCATIONS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static SERVICE_INVOCATIONS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static SERVICE_INVOCATION_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static ACTOR_INVOCATIONS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static CONFIGURATION_ACTIVE_SUBSCRIPTIONS: OnceCell<Gauge> = OnceCell::new();
static CONFIGURATION_UPDATES_FORWARDED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Helper macro to reduce boilerplate for getting a metric from OnceCell.
/// This will panic if `install()` has not been called, which is intentional
/// as it indicates a critical application setup error.
macro_rules! get_metric {
    ($metric:ident) => {
        $metric
            .get()
            .expect("Prometheus sink not initialized. Call telemetry::prometheus::install() first.")
    };
}

fn outcome(success: bool) -> &'static str {
    if success {
        "true"
    } else {
        "false"
    }
}

impl PubSubMetricsSink for PrometheusSink {
    fn inc_egress(&self, pubsub: &str, topic: &str, success: bool) {
        get_metric!(PUBSUB_EGRESS_TOTAL)
            .with_label_values(&[pubsub, topic, outcome(success)])
            .inc();
    }
    fn inc_bulk_egress(&self, pubsub: &str, topic: &str, published: u64, failed: u64) {
        get_metric!(PUBSUB_BULK_EVENTS_TOTAL)
            .with_label_values(&[pubsub, topic, "true"])
            .inc_by(published);
        get_metric!(PUBSUB_BULK_EVENTS_TOTAL)
            .with_label_values(&[pubsub, topic, "false"])
            .inc_by(failed);
    }
    fn observe_publish_latency(&self, pubsub: &str, topic: &str, duration_secs: f64) {
        get_metric!(PUBSUB_PUBLISH_DURATION_SECONDS)
            .with_label_values(&[pubsub, topic])
            .observe(duration_secs);
    }
}

impl StateMetricsSink for PrometheusSink {
    fn inc_operation(&self, store: &str, operation: &str, success: bool) {
        get_metric!(STATE_OPERATIONS_TOTAL)
            .with_label_values(&[store, operation, outcome(success)])
            .inc();
    }
    fn observe_operation_latency(&self, store: &str, operation: &str, duration_secs: f64) {
        get_metric!(STATE_OPERATION_DURATION_SECONDS)
            .with_label_values(&[store, operation])
            .observe(duration_secs);
    }
    fn inc_transaction(&self, store: &str, operations: u64) {
        get_metric!(STATE_TRANSACTION_OPS_TOTAL)
            .with_label_values(&[store])
            .inc_by(operations);
    }
}

impl InvocationMetricsSink for PrometheusSink {
    fn inc_binding(&self, name: &str, operation: &str, success: bool) {
        get_metric!(BINDING_INVOCATIONS_TOTAL)
            .with_label_values(&[name, operation, outcome(success)])
            .inc();
    }
    fn inc_service(&self, target_app: &str, success: bool) {
        get_metric!(SERVICE_INVOCATIONS_TOTAL)
            .with_label_values(&[target_app, outcome(success)])
            .inc();
    }
    fn inc_actor(&self, actor_type: &str, success: bool) {
        get_metric!(ACTOR_INVOCATIONS_TOTAL)
            .with_label_values(&[actor_type, outcome(success)])
            .inc();
    }
    fn observe_service_latency(&self, target_app: &str, duration_secs: f64) {
        get_metric!(SERVICE_INVOCATION_DURATION_SECONDS)
            .with_label_values(&[target_app])
            .observe(duration_secs);
    }
}

impl ConfigurationMetricsSink for PrometheusSink {
    fn set_active_subscriptions(&self, count: u64) {
        get_metric!(CONFIGURATION_ACTIVE_SUBSCRIPTIONS).set(count as f64);
    }
    fn inc_updates_forwarded(&self, store: &str) {
        get_metric!(CONFIGURATION_UPDATES_FORWARDED_TOTAL)
            .with_label_values(&[store])
            .inc();
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, code: &'static str) {
        get_metric!(ERRORS_TOTAL)
            .with_label_values(&[kind, code])
            .inc();
    }
}

/// Initializes all Prometheus metrics collectors and returns a static reference to the sink.
/// This function must be called only once at application startup.
#[allow(clippy::expect_used)]
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    PUBSUB_EGRESS_TOTAL
        .set(register_int_counter_vec!(
            "portico_pubsub_egress_total",
            "Total events published, by pubsub component, topic, and outcome.",
            &["pubsub", "topic", "success"]
        )?)
        .expect("static already initialized");
    PUBSUB_BULK_EVENTS_TOTAL
        .set(register_int_counter_vec!(
            "portico_pubsub_bulk_events_total",
            "Per-entry outcomes of bulk publishes, by pubsub component and topic.",
            &["pubsub", "topic", "success"]
        )?)
        .expect("static already initialized");
    PUBSUB_PUBLISH_DURATION_SECONDS
        .set(register_histogram_vec!(
            "portico_pubsub_publish_duration_seconds",
            "Latency of publish dispatches.",
            &["pubsub", "topic"],
            exponential_buckets(0.001, 2.0, 15)?
        )?)
        .expect("static already initialized");
    STATE_OPERATIONS_TOTAL
        .set(register_int_counter_vec!(
            "portico_state_operations_total",
            "Total state operations, by store, operation, and outcome.",
            &["store", "operation", "success"]
        )?)
        .expect("static already initialized");
    STATE_OPERATION_DURATION_SECONDS
        .set(register_histogram_vec!(
            "portico_state_operation_duration_seconds",
            "Latency of state operations.",
            &["store", "operation"],
            exponential_buckets(0.0005, 2.0, 16)?
        )?)
        .expect("static already initialized");
    STATE_TRANSACTION_OPS_TOTAL
        .set(register_int_counter_vec!(
            "portico_state_transaction_operations_total",
            "Caller-visible operations committed through state transactions.",
            &["store"]
        )?)
        .expect("static already initialized");
    BINDING_INVOCATIONS_TOTAL
        .set(register_int_counter_vec!(
            "portico_binding_invocations_total",
            "Total output binding invocations, by binding, operation, and outcome.",
            &["name", "operation", "success"]
        )?)
        .expect("static already initialized");
    SERVICE_INVOCATIONS_TOTAL
        .set(register_int_counter_vec!(
            "portico_service_invocations_total",
            "Total direct service invocations, by target app and outcome.",
            &["target_app", "success"]
        )?)
        .expect("static already initialized");
    SERVICE_INVOCATION_DURATION_SECONDS
        .set(register_histogram_vec!(
            "portico_service_invocation_duration_seconds",
            "Latency of direct service invocations.",
            &["target_app"],
            exponential_buckets(0.001, 2.0, 15)?
        )?)
        .expect("static already initialized");
    ACTOR_INVOCATIONS_TOTAL
        .set(register_int_counter_vec!(
            "portico_actor_invocations_total",
            "Total actor method invocations, by actor type and outcome.",
            &["actor_type", "success"]
        )?)
        .expect("static already initialized");
    CONFIGURATION_ACTIVE_SUBSCRIPTIONS
        .set(register_gauge!(
            "portico_configuration_active_subscriptions",
            "Currently live configuration subscriptions."
        )?)
        .expect("static already initialized");
    CONFIGURATION_UPDATES_FORWARDED_TOTAL
        .set(register_int_counter_vec!(
            "portico_configuration_updates_forwarded_total",
            "Configuration update batches forwarded to consumers.",
            &["store"]
        )?)
        .expect("static already initialized");
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "portico_errors_total",
            "Total request-plane errors, by taxonomy kind and stable code.",
            &["kind", "code"]
        )?)
        .expect("static already initialized");

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}
