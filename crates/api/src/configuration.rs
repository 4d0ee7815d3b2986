// Path: crates/api/src/configuration.rs
//! Driver contract for configuration stores.

use async_trait::async_trait;
use portico_types::configuration::{ConfigurationItem, ConfigurationUpdate};
use portico_types::error::DriverError;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// A one-shot configuration read.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationGetRequest {
    /// Keys to read. Empty means "all keys the store exposes".
    pub keys: Vec<String>,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// A long-lived configuration subscription request.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationSubscribeRequest {
    /// Keys to watch, already canonicalized (sorted, deduplicated).
    pub keys: Vec<String>,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// A configuration store driver.
///
/// Subscriptions are channel-shaped: the runtime hands the driver a bounded
/// sender and owns the receiving side. The driver pushes every change batch
/// into the sender in emission order, and signals its own termination by
/// dropping the sender. A full channel backpressures the driver.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Reads the requested keys.
    async fn get(
        &self,
        request: ConfigurationGetRequest,
    ) -> Result<HashMap<String, ConfigurationItem>, DriverError>;

    /// Establishes a subscription and returns the driver-assigned
    /// subscription id.
    async fn subscribe(
        &self,
        request: ConfigurationSubscribeRequest,
        updates: mpsc::Sender<ConfigurationUpdate>,
    ) -> Result<String, DriverError>;

    /// Tears down a subscription previously returned by
    /// [`ConfigurationStore::subscribe`]. Idempotent.
    async fn unsubscribe(&self, id: &str) -> Result<(), DriverError>;
}
