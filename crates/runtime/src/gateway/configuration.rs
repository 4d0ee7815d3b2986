// Path: crates/runtime/src/gateway/configuration.rs
//! Configuration handlers: one-shot reads, subscriptions, unsubscribe.

use super::{dispatch_err, reply_err, Gateway};
use crate::deprecation::DeprecationNotice;
use crate::propagation;
use crate::registry::LookupMiss;
use crate::subscriptions::{spawn_forwarder, to_proto_items, ForwarderParams};
use portico_api::configuration::{ConfigurationGetRequest, ConfigurationSubscribeRequest};
use portico_ipc::proto::{
    GetConfigurationRequest, GetConfigurationResponse, SubscribeConfigurationRequest,
    SubscribeConfigurationResponse, UnsubscribeConfigurationRequest,
    UnsubscribeConfigurationResponse,
};
use portico_resiliency::Target;
use portico_types::configuration::{canonical_keys, ConfigurationUpdate};
use portico_types::error::ConfigurationError;
use portico_types::metadata::normalize_driver_metadata;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Status;

/// One-time notices for the deprecated `*Alpha1` aliases.
pub(crate) static GET_CONFIGURATION_ALPHA1_NOTICE: DeprecationNotice =
    DeprecationNotice::new("GetConfigurationAlpha1", "GetConfiguration");
pub(crate) static SUBSCRIBE_CONFIGURATION_ALPHA1_NOTICE: DeprecationNotice =
    DeprecationNotice::new("SubscribeConfigurationAlpha1", "SubscribeConfiguration");
pub(crate) static UNSUBSCRIBE_CONFIGURATION_ALPHA1_NOTICE: DeprecationNotice =
    DeprecationNotice::new("UnsubscribeConfigurationAlpha1", "UnsubscribeConfiguration");

/// Bound of the driver-update channel. A slow consumer fills the frame
/// channel first, then this one, and the driver blocks on send: that is
/// the backpressure path end to end.
const DRIVER_UPDATE_BUFFER: usize = 16;

impl Gateway {
    pub(crate) async fn handle_get_configuration(
        &self,
        request: GetConfigurationRequest,
    ) -> Result<GetConfigurationResponse, Status> {
        let store = self
            .ctx
            .registry
            .configuration_store(&request.store_name)
            .map_err(|miss| {
                reply_err(match miss {
                    LookupMiss::NotConfigured => ConfigurationError::NotConfigured,
                    LookupMiss::NotFound => {
                        ConfigurationError::NotFound(request.store_name.clone())
                    }
                })
            })?;
        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;
        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        let policy = self
            .ctx
            .component_policy(&request.store_name, "configuration-store");
        let target = Target {
            component: &request.store_name,
            operation: "get",
        };

        let outcome = self
            .ctx
            .executor
            .run(&policy, target, true, || {
                let driver_request = ConfigurationGetRequest {
                    keys: request.keys.clone(),
                    metadata: driver_metadata.clone(),
                };
                let store = store.clone();
                async move { store.get(driver_request).await }
            })
            .await;

        outcome
            .map(|items| GetConfigurationResponse {
                items: to_proto_items(ConfigurationUpdate { items }),
            })
            .map_err(|err| {
                dispatch_err(err, |err| ConfigurationError::GetFailed {
                    store: request.store_name.clone(),
                    keys: request.keys.clone(),
                    message: err.to_string(),
                })
            })
    }

    pub(crate) async fn handle_subscribe_configuration(
        &self,
        request: SubscribeConfigurationRequest,
    ) -> Result<ReceiverStream<Result<SubscribeConfigurationResponse, Status>>, Status> {
        let store = self
            .ctx
            .registry
            .configuration_store(&request.store_name)
            .map_err(|miss| {
                reply_err(match miss {
                    LookupMiss::NotConfigured => ConfigurationError::NotConfigured,
                    LookupMiss::NotFound => {
                        ConfigurationError::NotFound(request.store_name.clone())
                    }
                })
            })?;
        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;

        // Keys are canonicalized on the request side so a subscription's
        // identity does not depend on caller key order.
        let keys = canonical_keys(request.keys);
        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        // INITIALIZING: the driver subscribe runs under the store policy.
        let (updates_tx, updates_rx) = mpsc::channel(DRIVER_UPDATE_BUFFER);
        let policy = self
            .ctx
            .component_policy(&request.store_name, "configuration-store");
        let target = Target {
            component: &request.store_name,
            operation: "subscribe",
        };
        let id = self
            .ctx
            .executor
            .run(&policy, target, true, || {
                let driver_request = ConfigurationSubscribeRequest {
                    keys: keys.clone(),
                    metadata: driver_metadata.clone(),
                };
                let store = store.clone();
                let updates_tx = updates_tx.clone();
                async move { store.subscribe(driver_request, updates_tx).await }
            })
            .await
            .map_err(|err| {
                dispatch_err(err, |err| ConfigurationError::SubscribeFailed {
                    store: request.store_name.clone(),
                    keys: keys.clone(),
                    message: err.to_string(),
                })
            })?;
        drop(updates_tx);

        tracing::debug!(id = %id, store = %request.store_name, "configuration subscription established");

        // READY through CLOSED live in the forwarder task.
        Ok(spawn_forwarder(ForwarderParams {
            id,
            store_name: request.store_name,
            keys,
            store,
            driver_updates: updates_rx,
            table: self.ctx.subscriptions.clone(),
        }))
    }

    pub(crate) async fn handle_unsubscribe_configuration(
        &self,
        request: UnsubscribeConfigurationRequest,
    ) -> Result<UnsubscribeConfigurationResponse, Status> {
        // A signal, not a teardown: the owning stream drains and removes
        // the entry itself.
        if self.ctx.subscriptions.signal_stop(&request.id) {
            Ok(UnsubscribeConfigurationResponse {
                ok: true,
                message: String::new(),
            })
        } else {
            let err = ConfigurationError::SubscriptionNotFound(request.id.clone());
            Ok(UnsubscribeConfigurationResponse {
                ok: false,
                message: err.to_string(),
            })
        }
    }
}
