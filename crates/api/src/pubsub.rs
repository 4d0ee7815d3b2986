// Path: crates/api/src/pubsub.rs
//! Driver contract for publish/subscribe brokers.

use async_trait::async_trait;
use bytes::Bytes;
use portico_types::error::DriverError;
use std::collections::HashMap;

/// A single message handed to a broker driver.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    /// Destination topic.
    pub topic: String,
    /// Serialized payload. Either an envelope or, under the raw-payload
    /// flag, the caller's bytes verbatim.
    pub data: Bytes,
    /// Content type of `data`.
    pub content_type: String,
    /// Driver-specific metadata, already namespaced by the gateway.
    pub metadata: HashMap<String, String>,
}

/// One entry of a bulk publish.
#[derive(Debug, Clone, Default)]
pub struct BulkMessageEntry {
    /// Caller-assigned id, unique within the batch.
    pub entry_id: String,
    /// Serialized event payload.
    pub event: Bytes,
    /// Content type of `event`.
    pub content_type: String,
    /// Per-entry metadata.
    pub metadata: HashMap<String, String>,
}

/// A batch of messages for one topic.
#[derive(Debug, Clone, Default)]
pub struct BulkPublishRequest {
    /// Destination topic.
    pub topic: String,
    /// The entries, in caller order.
    pub entries: Vec<BulkMessageEntry>,
    /// Request-level metadata.
    pub metadata: HashMap<String, String>,
}

/// A bulk entry the broker failed to accept.
#[derive(Debug, Clone)]
pub struct FailedEntry {
    /// The entry id from the request.
    pub entry_id: String,
    /// The broker's reason.
    pub error: String,
}

/// Outcome of a bulk publish. An empty `failed_entries` means every entry
/// was accepted; partial failure is not a call-level error.
#[derive(Debug, Clone, Default)]
pub struct BulkPublishResult {
    /// Entries the broker rejected or failed.
    pub failed_entries: Vec<FailedEntry>,
}

/// A publish/subscribe broker driver.
#[async_trait]
pub trait PubSub: Send + Sync {
    /// Publishes a single message.
    async fn publish(&self, request: PublishRequest) -> Result<(), DriverError>;

    /// Publishes a batch of messages to one topic.
    ///
    /// The default implementation publishes entries one at a time and
    /// collects per-entry failures, which gives brokers without a native
    /// batch API the same partial-failure contract.
    async fn bulk_publish(
        &self,
        request: BulkPublishRequest,
    ) -> Result<BulkPublishResult, DriverError> {
        let mut failed_entries = Vec::new();
        for entry in request.entries {
            let single = PublishRequest {
                topic: request.topic.clone(),
                data: entry.event,
                content_type: entry.content_type,
                metadata: entry.metadata,
            };
            if let Err(err) = self.publish(single).await {
                failed_entries.push(FailedEntry {
                    entry_id: entry.entry_id,
                    error: err.to_string(),
                });
            }
        }
        Ok(BulkPublishResult { failed_entries })
    }
}
