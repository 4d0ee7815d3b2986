// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Environment variable overriding the log filter for this process. Takes
/// precedence over `RUST_LOG` so a sidecar can be tuned independently of
/// the application sharing its environment.
pub const LOG_FILTER_ENV: &str = "PORTICO_LOG";

/// Default filter directives: request-plane events at `info`, with the
/// transport internals capped so h2/hyper frame logs cannot drown gateway
/// events when an operator raises verbosity.
const DEFAULT_FILTER: &str = "info,h2=warn,hyper=warn,tower=warn";

/// Initializes the global `tracing` subscriber for structured JSON logging.
///
/// Filter resolution order: `PORTICO_LOG`, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`]. Records emitted through the `log` facade are
/// bridged into `tracing`.
pub fn init_tracing() -> Result<(), anyhow::Error> {
    let fmt_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    let subscriber = Registry::default().with(env_filter()).with(fmt_layer);
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn env_filter() -> EnvFilter {
    std::env::var(LOG_FILTER_ENV)
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
