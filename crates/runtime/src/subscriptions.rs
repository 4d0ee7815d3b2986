// Path: crates/runtime/src/subscriptions.rs
//! The streaming subscription manager.
//!
//! Each live configuration subscription is one entry in a process-wide
//! table plus one owned forwarder task. The driver pushes update batches
//! into a bounded channel (backpressure); the forwarder is the only sender
//! on the consumer stream, which makes delivery order driver-emission
//! order and forbids concurrent sends by construction. The id frame is
//! sent before the forwarder reads a single driver update, so no update
//! can interleave ahead of it.
//!
//! Teardown can start from either side: consumer disconnect, an explicit
//! unsubscribe signal, or driver termination. The driver-side unsubscribe
//! always runs on a detached task, so a disconnected consumer cannot
//! abort cleanup.

use dashmap::DashMap;
use portico_api::configuration::ConfigurationStore;
use portico_ipc::proto::{ConfigurationItem, SubscribeConfigurationResponse};
use portico_telemetry::configuration_metrics;
use portico_types::configuration::ConfigurationUpdate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tonic::Status;

/// Bound of the consumer-facing frame channel. One in-flight frame plus a
/// small cushion; a slow consumer backpressures through here to the
/// driver-update channel and ultimately to the driver itself.
const STREAM_BUFFER: usize = 8;

/// One live subscription.
#[derive(Debug)]
pub struct SubscriptionEntry {
    /// The configuration store the subscription lives on.
    pub store_name: String,
    /// The canonicalized key set.
    pub keys: Vec<String>,
    stop: watch::Sender<bool>,
}

/// The process-wide table of live subscriptions, keyed by driver-assigned id.
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    entries: DashMap<String, SubscriptionEntry>,
}

impl SubscriptionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a subscription with this id is live.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Flips the stop signal of one subscription. The owning forwarder
    /// performs the actual teardown. Returns whether the id was live.
    pub fn signal_stop(&self, id: &str) -> bool {
        match self.entries.get(id) {
            Some(entry) => {
                let _ = entry.stop.send(true);
                true
            }
            None => false,
        }
    }

    /// Signals every subscription and drops all entries. Used on shutdown.
    pub fn drain_all(&self) {
        for entry in self.entries.iter() {
            let _ = entry.stop.send(true);
        }
        self.entries.clear();
        configuration_metrics().set_active_subscriptions(0);
    }

    fn insert(&self, id: String, entry: SubscriptionEntry) {
        self.entries.insert(id, entry);
        configuration_metrics().set_active_subscriptions(self.entries.len() as u64);
    }

    fn remove(&self, id: &str) {
        self.entries.remove(id);
        configuration_metrics().set_active_subscriptions(self.entries.len() as u64);
    }
}

/// Everything the forwarder task needs for one subscription.
pub(crate) struct ForwarderParams {
    /// Driver-assigned subscription id.
    pub id: String,
    /// The configuration store name, for logs and metrics.
    pub store_name: String,
    /// The canonicalized key set.
    pub keys: Vec<String>,
    /// Handle for the driver-side unsubscribe at teardown.
    pub store: Arc<dyn ConfigurationStore>,
    /// The driver's update batches, in emission order.
    pub driver_updates: mpsc::Receiver<ConfigurationUpdate>,
    /// The shared subscription table.
    pub table: Arc<SubscriptionTable>,
}

/// Registers the subscription and spawns its forwarder task. Returns the
/// consumer-facing frame stream, whose first frame carries the id.
pub(crate) fn spawn_forwarder(
    params: ForwarderParams,
) -> ReceiverStream<Result<SubscribeConfigurationResponse, Status>> {
    let ForwarderParams {
        id,
        store_name,
        keys,
        store,
        mut driver_updates,
        table,
    } = params;

    let (frames_tx, frames_rx) = mpsc::channel(STREAM_BUFFER);
    let (stop_tx, mut stop_rx) = watch::channel(false);
    table.insert(
        id.clone(),
        SubscriptionEntry {
            store_name: store_name.clone(),
            keys,
            stop: stop_tx,
        },
    );

    tokio::spawn(async move {
        // READY: the id frame goes out before any driver update is read.
        // Updates the driver emits in the meantime sit in the bounded
        // channel, so none can interleave ahead of the id.
        let id_frame = SubscribeConfigurationResponse {
            id: id.clone(),
            items: HashMap::new(),
        };
        if frames_tx.send(Ok(id_frame)).await.is_ok() {
            // ACTIVE: this task is the only sender on the stream, which
            // both orders frames and rules out concurrent sends.
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => {
                        tracing::debug!(id = %id, "subscription stop signaled");
                        break;
                    }
                    update = driver_updates.recv() => match update {
                        Some(update) => {
                            configuration_metrics().inc_updates_forwarded(&store_name);
                            let frame = SubscribeConfigurationResponse {
                                id: id.clone(),
                                items: to_proto_items(update),
                            };
                            if frames_tx.send(Ok(frame)).await.is_err() {
                                tracing::debug!(id = %id, "consumer disconnected");
                                break;
                            }
                        }
                        None => {
                            tracing::debug!(id = %id, "driver terminated subscription");
                            break;
                        }
                    },
                    _ = frames_tx.closed() => {
                        tracing::debug!(id = %id, "consumer disconnected while idle");
                        break;
                    }
                }
            }
        }

        // DRAINING: remove the table entry, then unsubscribe on a
        // detached task with a fresh context.
        table.remove(&id);
        let unsubscribe_id = id.clone();
        tokio::spawn(async move {
            if let Err(err) = store.unsubscribe(&unsubscribe_id).await {
                tracing::warn!(id = %unsubscribe_id, error = %err, "driver unsubscribe failed");
            }
        });
        // CLOSED.
    });

    ReceiverStream::new(frames_rx)
}

pub(crate) fn to_proto_items(
    update: ConfigurationUpdate,
) -> HashMap<String, ConfigurationItem> {
    update
        .items
        .into_iter()
        .map(|(key, item)| {
            (
                key,
                ConfigurationItem {
                    value: item.value,
                    version: item.version,
                    metadata: item.metadata,
                },
            )
        })
        .collect()
}
