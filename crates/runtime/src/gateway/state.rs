// Path: crates/runtime/src/gateway/state.rs
//! State handlers: get, bulk get, save, delete, and transactions.

use super::{dispatch_err, reply_err, Gateway};
use crate::keys;
use crate::propagation;
use crate::registry::{LookupMiss, StateStoreEntry};
use futures::stream::{self, StreamExt};
use portico_api::state::{
    BulkGetEntry, DeleteRequest, GetRequest, SetRequest, TransactionRequest,
};
use portico_ipc::proto::{
    BulkStateItem, DeleteBulkStateRequest, DeleteStateRequest, Empty,
    ExecuteStateTransactionRequest, GetBulkStateRequest, GetBulkStateResponse, GetStateRequest,
    GetStateResponse, SaveStateRequest, StateConcurrency, StateConsistency,
    StateItem as ProtoStateItem, StateOptions as ProtoStateOptions,
    TransactionalStateOperation,
};
use portico_resiliency::Target;
use portico_telemetry::state_metrics;
use portico_telemetry::time::ScopeTimer;
use portico_types::error::{DriverError, StateError};
use portico_types::metadata::{is_idempotent, normalize_driver_metadata};
use portico_types::state::{
    Concurrency, Consistency, StateItem, StateOptions, TransactionOp,
};
use std::collections::HashMap;
use tonic::Status;

/// Fan-out width for bulk reads against stores without a native bulk path,
/// when the caller does not ask for a specific parallelism.
const DEFAULT_BULK_PARALLELISM: usize = 10;

impl Gateway {
    pub(crate) async fn handle_get_state(
        &self,
        request: GetStateRequest,
    ) -> Result<GetStateResponse, Status> {
        let entry = self.resolve_state_store(&request.store_name)?;
        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;
        let physical = keys::rewrite(
            &entry.prefix,
            &request.key,
            &request.store_name,
            &self.ctx.app_id,
        )
        .map_err(reply_err)?;

        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        let policy = self
            .ctx
            .component_policy(&request.store_name, "state-store");
        let target = Target {
            component: &request.store_name,
            operation: "get",
        };

        let _timer = ScopeTimer::new(|secs| {
            state_metrics().observe_operation_latency(&request.store_name, "get", secs)
        });
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, true, || {
                let driver_request = GetRequest {
                    key: physical.clone(),
                    consistency: consistency_from_proto(request.consistency),
                    metadata: driver_metadata.clone(),
                };
                let store = entry.store.clone();
                async move { store.get(driver_request).await }
            })
            .await;
        state_metrics().inc_operation(&request.store_name, "get", outcome.is_ok());

        match outcome {
            Ok(None) => Ok(GetStateResponse::default()),
            Ok(Some(record)) => {
                let data = match &entry.encryption {
                    Some(gate) => gate.decrypt(&record.data).map_err(|e| {
                        reply_err(StateError::GetFailed {
                            store: request.store_name.clone(),
                            key: request.key.clone(),
                            message: e.to_string(),
                        })
                    })?,
                    None => record.data,
                };
                Ok(GetStateResponse {
                    data,
                    etag: record.etag.unwrap_or_default(),
                    metadata: record.metadata,
                })
            }
            Err(err) => Err(dispatch_err(err, |err| {
                StateError::from_driver(&request.store_name, &request.key, err)
            })),
        }
    }

    pub(crate) async fn handle_get_bulk_state(
        &self,
        request: GetBulkStateRequest,
    ) -> Result<GetBulkStateResponse, Status> {
        let entry = self.resolve_state_store(&request.store_name)?;
        // An empty key list is answered without touching the driver.
        if request.keys.is_empty() {
            return Ok(GetBulkStateResponse::default());
        }
        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;

        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        let mut driver_requests = Vec::with_capacity(request.keys.len());
        for key in &request.keys {
            let physical = keys::rewrite(
                &entry.prefix,
                key,
                &request.store_name,
                &self.ctx.app_id,
            )
            .map_err(reply_err)?;
            driver_requests.push(GetRequest {
                key: physical,
                consistency: Consistency::Unspecified,
                metadata: driver_metadata.clone(),
            });
        }

        let policy = self
            .ctx
            .component_policy(&request.store_name, "state-store");

        let _timer = ScopeTimer::new(|secs| {
            state_metrics().observe_operation_latency(&request.store_name, "bulk_get", secs)
        });
        let outcome = if entry.capabilities.bulk_get {
            let target = Target {
                component: &request.store_name,
                operation: "bulk_get",
            };
            self.ctx
                .executor
                .run(&policy, target, true, || {
                    let requests = driver_requests.clone();
                    let store = entry.store.clone();
                    async move { store.bulk_get(requests).await }
                })
                .await
        } else {
            // No native bulk path: fan out single gets, bounded by the
            // caller's requested parallelism, preserving key order.
            let width = match request.parallelism as usize {
                0 => DEFAULT_BULK_PARALLELISM,
                n => n,
            };
            let entries = stream::iter(driver_requests.into_iter())
                .map(|driver_request| {
                    let store = entry.store.clone();
                    let policy = policy.clone();
                    let executor = &self.ctx.executor;
                    let store_name = request.store_name.clone();
                    async move {
                        let key = driver_request.key.clone();
                        let target = Target {
                            component: &store_name,
                            operation: "get",
                        };
                        let result = executor
                            .run(&policy, target, true, || {
                                let driver_request = driver_request.clone();
                                let store = store.clone();
                                async move { store.get(driver_request).await }
                            })
                            .await;
                        match result {
                            Ok(Some(record)) => BulkGetEntry {
                                key,
                                data: record.data,
                                etag: record.etag,
                                error: None,
                                metadata: record.metadata,
                            },
                            Ok(None) => BulkGetEntry {
                                key,
                                ..BulkGetEntry::default()
                            },
                            Err(err) => BulkGetEntry {
                                key,
                                error: Some(err.to_string()),
                                ..BulkGetEntry::default()
                            },
                        }
                    }
                })
                .buffered(width)
                .collect::<Vec<_>>()
                .await;
            Ok(entries)
        };
        state_metrics().inc_operation(&request.store_name, "bulk_get", outcome.is_ok());

        let entries = outcome.map_err(|err| {
            dispatch_err(err, |err| StateError::GetFailed {
                store: request.store_name.clone(),
                key: "<bulk>".to_string(),
                message: err.to_string(),
            })
        })?;

        // Project physical keys back to logical keys and run the decrypt
        // gate; per-item decrypt failure clears the item and records an
        // item-level error while the batch as a whole succeeds.
        let items = entries
            .into_iter()
            .map(|item| {
                let logical = keys::reverse(&entry.prefix, &item.key).to_string();
                let (data, error) = match (&entry.encryption, item.error) {
                    (_, Some(error)) => (bytes::Bytes::new(), error),
                    (Some(gate), None) if !item.data.is_empty() => match gate.decrypt(&item.data)
                    {
                        Ok(plain) => (plain, String::new()),
                        Err(e) => (bytes::Bytes::new(), e.to_string()),
                    },
                    (_, None) => (item.data, String::new()),
                };
                BulkStateItem {
                    key: logical,
                    data,
                    etag: item.etag.unwrap_or_default(),
                    error,
                    metadata: item.metadata,
                }
            })
            .collect();
        Ok(GetBulkStateResponse { items })
    }

    pub(crate) async fn handle_save_state(
        &self,
        request: SaveStateRequest,
    ) -> Result<Empty, Status> {
        let entry = self.resolve_state_store(&request.store_name)?;
        if request.states.is_empty() {
            return Ok(Empty {});
        }

        let mut driver_requests = Vec::with_capacity(request.states.len());
        let mut replayable = true;
        for item in &request.states {
            let trace = propagation::extract(&item.metadata).map_err(reply_err)?;
            let physical = keys::rewrite(
                &entry.prefix,
                &item.key,
                &request.store_name,
                &self.ctx.app_id,
            )
            .map_err(reply_err)?;
            let value = match &entry.encryption {
                Some(gate) => gate.encrypt(&item.value).map_err(|e| {
                    reply_err(StateError::SaveFailed {
                        store: request.store_name.clone(),
                        message: e.to_string(),
                    })
                })?,
                None => item.value.clone(),
            };
            replayable &= is_idempotent(&item.metadata);
            let mut metadata = normalize_driver_metadata(&item.metadata);
            propagation::inject(&trace, &mut metadata);
            driver_requests.push(SetRequest {
                key: physical,
                value,
                etag: item.etag.as_ref().map(|e| e.value.clone()),
                options: options_from_proto(item.options),
                metadata,
            });
        }

        let policy = self
            .ctx
            .component_policy(&request.store_name, "state-store");
        let target = Target {
            component: &request.store_name,
            operation: "save",
        };

        let _timer = ScopeTimer::new(|secs| {
            state_metrics().observe_operation_latency(&request.store_name, "save", secs)
        });
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, replayable, || {
                let requests = driver_requests.clone();
                let store = entry.store.clone();
                async move { store.bulk_set(requests).await }
            })
            .await;
        state_metrics().inc_operation(&request.store_name, "save", outcome.is_ok());

        outcome.map(|()| Empty {}).map_err(|err| {
            dispatch_err(err, |err| write_error(&request.store_name, err))
        })
    }

    pub(crate) async fn handle_delete_state(
        &self,
        request: DeleteStateRequest,
    ) -> Result<Empty, Status> {
        let entry = self.resolve_state_store(&request.store_name)?;
        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;
        let physical = keys::rewrite(
            &entry.prefix,
            &request.key,
            &request.store_name,
            &self.ctx.app_id,
        )
        .map_err(reply_err)?;

        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        let policy = self
            .ctx
            .component_policy(&request.store_name, "state-store");
        let target = Target {
            component: &request.store_name,
            operation: "delete",
        };
        let replayable = is_idempotent(&request.metadata);

        let _timer = ScopeTimer::new(|secs| {
            state_metrics().observe_operation_latency(&request.store_name, "delete", secs)
        });
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, replayable, || {
                let driver_request = DeleteRequest {
                    key: physical.clone(),
                    etag: request.etag.as_ref().map(|e| e.value.clone()),
                    options: options_from_proto(request.options),
                    metadata: driver_metadata.clone(),
                };
                let store = entry.store.clone();
                async move { store.delete(driver_request).await }
            })
            .await;
        state_metrics().inc_operation(&request.store_name, "delete", outcome.is_ok());

        outcome.map(|()| Empty {}).map_err(|err| {
            dispatch_err(err, |err| match err {
                DriverError::EtagMismatch(message) => StateError::EtagMismatch {
                    store: request.store_name.clone(),
                    message,
                },
                DriverError::EtagInvalid(message) => StateError::EtagInvalid { message },
                other => StateError::DeleteFailed {
                    key: request.key.clone(),
                    message: other.to_string(),
                },
            })
        })
    }

    pub(crate) async fn handle_delete_bulk_state(
        &self,
        request: DeleteBulkStateRequest,
    ) -> Result<Empty, Status> {
        let entry = self.resolve_state_store(&request.store_name)?;
        if request.states.is_empty() {
            return Ok(Empty {});
        }

        let mut driver_requests = Vec::with_capacity(request.states.len());
        for item in &request.states {
            let physical = keys::rewrite(
                &entry.prefix,
                &item.key,
                &request.store_name,
                &self.ctx.app_id,
            )
            .map_err(reply_err)?;
            driver_requests.push(DeleteRequest {
                key: physical,
                etag: item.etag.as_ref().map(|e| e.value.clone()),
                options: options_from_proto(item.options),
                metadata: normalize_driver_metadata(&item.metadata),
            });
        }

        let policy = self
            .ctx
            .component_policy(&request.store_name, "state-store");
        let target = Target {
            component: &request.store_name,
            operation: "bulk_delete",
        };

        let _timer = ScopeTimer::new(|secs| {
            state_metrics().observe_operation_latency(&request.store_name, "bulk_delete", secs)
        });
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, false, || {
                let requests = driver_requests.clone();
                let store = entry.store.clone();
                async move { store.bulk_delete(requests).await }
            })
            .await;
        state_metrics().inc_operation(&request.store_name, "bulk_delete", outcome.is_ok());

        outcome.map(|()| Empty {}).map_err(|err| {
            dispatch_err(err, |err| write_error(&request.store_name, err))
        })
    }

    pub(crate) async fn handle_execute_state_transaction(
        &self,
        request: ExecuteStateTransactionRequest,
    ) -> Result<Empty, Status> {
        let entry = self.resolve_state_store(&request.store_name)?;
        if !entry.capabilities.transactional {
            return Err(reply_err(StateError::TransactionsNotSupported(
                request.store_name.clone(),
            )));
        }
        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;

        let mut operations = Vec::with_capacity(request.operations.len());
        for op in &request.operations {
            operations.push(transaction_op_from_proto(op).map_err(reply_err)?);
        }
        let caller_visible_ops = operations.len() as u64;

        // The outbox rewrites the logical operation list before key
        // prefixing; the rewritten list is the atomic unit from here on.
        if let Some(outbox) = &self.ctx.outbox {
            if outbox.enabled(&request.store_name) {
                operations = outbox
                    .rewrite(&request.store_name, operations)
                    .await
                    .map_err(|err| {
                        dispatch_err(err, |err| StateError::TransactionFailed {
                            message: err.to_string(),
                        })
                    })?;
                tracing::debug!(
                    store = %request.store_name,
                    rewritten_operations = operations.len(),
                    "outbox rewrote transaction"
                );
            }
        }

        if let Some(max) = entry.capabilities.multi_max_size {
            if operations.len() > max {
                return Err(reply_err(StateError::TooManyTransactionalOps {
                    count: operations.len(),
                    max,
                }));
            }
        }

        let mut rewritten = Vec::with_capacity(operations.len());
        for op in operations {
            let physical = keys::rewrite(
                &entry.prefix,
                op.key(),
                &request.store_name,
                &self.ctx.app_id,
            )
            .map_err(reply_err)?;
            let op = match (op, &entry.encryption) {
                (TransactionOp::Upsert(mut item), Some(gate)) => {
                    item.value = gate.encrypt(&item.value).map_err(|e| {
                        reply_err(StateError::TransactionFailed {
                            message: e.to_string(),
                        })
                    })?;
                    TransactionOp::Upsert(item)
                }
                (op, _) => op,
            };
            rewritten.push(op.with_key(physical));
        }

        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        let policy = self
            .ctx
            .component_policy(&request.store_name, "state-store");
        let target = Target {
            component: &request.store_name,
            operation: "transaction",
        };
        let replayable = is_idempotent(&request.metadata);

        let _timer = ScopeTimer::new(|secs| {
            state_metrics().observe_operation_latency(&request.store_name, "transaction", secs)
        });
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, replayable, || {
                let driver_request = TransactionRequest {
                    operations: rewritten.clone(),
                    metadata: driver_metadata.clone(),
                };
                let store = entry.store.clone();
                async move { store.multi(driver_request).await }
            })
            .await;
        state_metrics().inc_operation(&request.store_name, "transaction", outcome.is_ok());
        if outcome.is_ok() {
            // Metrics report the operation count the caller submitted, not
            // the outbox-rewritten length.
            state_metrics().inc_transaction(&request.store_name, caller_visible_ops);
        }

        outcome.map(|()| Empty {}).map_err(|err| {
            dispatch_err(err, |err| match err {
                DriverError::EtagMismatch(message) => StateError::EtagMismatch {
                    store: request.store_name.clone(),
                    message,
                },
                DriverError::EtagInvalid(message) => StateError::EtagInvalid { message },
                other => StateError::TransactionFailed {
                    message: other.to_string(),
                },
            })
        })
    }

    fn resolve_state_store(&self, store_name: &str) -> Result<StateStoreEntry, Status> {
        if store_name.is_empty() {
            return Err(reply_err(StateError::NotConfigured));
        }
        self.ctx.registry.state_store(store_name).map_err(|miss| {
            reply_err(match miss {
                LookupMiss::NotConfigured => StateError::NotConfigured,
                LookupMiss::NotFound => StateError::NotFound(store_name.to_string()),
            })
        })
    }
}

fn write_error(store: &str, err: DriverError) -> StateError {
    match err {
        DriverError::EtagMismatch(message) => StateError::EtagMismatch {
            store: store.to_string(),
            message,
        },
        DriverError::EtagInvalid(message) => StateError::EtagInvalid { message },
        other => StateError::SaveFailed {
            store: store.to_string(),
            message: other.to_string(),
        },
    }
}

fn consistency_from_proto(value: i32) -> Consistency {
    match StateConsistency::try_from(value) {
        Ok(StateConsistency::ConsistencyStrong) => Consistency::Strong,
        Ok(StateConsistency::ConsistencyEventual) => Consistency::Eventual,
        _ => Consistency::Unspecified,
    }
}

fn concurrency_from_proto(value: i32) -> Concurrency {
    match StateConcurrency::try_from(value) {
        Ok(StateConcurrency::ConcurrencyFirstWrite) => Concurrency::FirstWrite,
        Ok(StateConcurrency::ConcurrencyLastWrite) => Concurrency::LastWrite,
        _ => Concurrency::Unspecified,
    }
}

fn options_from_proto(options: Option<ProtoStateOptions>) -> StateOptions {
    match options {
        Some(options) => StateOptions {
            concurrency: concurrency_from_proto(options.concurrency),
            consistency: consistency_from_proto(options.consistency),
        },
        None => StateOptions::default(),
    }
}

fn state_item_from_proto(item: &ProtoStateItem) -> StateItem {
    StateItem {
        key: item.key.clone(),
        value: item.value.clone(),
        etag: item.etag.as_ref().map(|e| e.value.clone()),
        metadata: item.metadata.clone(),
        options: options_from_proto(item.options),
    }
}

fn transaction_op_from_proto(
    op: &TransactionalStateOperation,
) -> Result<TransactionOp, StateError> {
    let item = op.request.as_ref().ok_or_else(|| {
        StateError::UnknownOperation("missing operation payload".to_string())
    })?;
    if item.key.is_empty() {
        return Err(StateError::KeyEmpty);
    }
    match op.operation_type.as_str() {
        "upsert" => Ok(TransactionOp::Upsert(state_item_from_proto(item))),
        "delete" => Ok(TransactionOp::Delete {
            key: item.key.clone(),
            etag: item.etag.as_ref().map(|e| e.value.clone()),
            options: options_from_proto(item.options),
        }),
        other => Err(StateError::UnknownOperation(other.to_string())),
    }
}
