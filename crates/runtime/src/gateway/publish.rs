// Path: crates/runtime/src/gateway/publish.rs
//! Publish handlers: single event and bulk.

use super::{dispatch_err, reply_err, Gateway};
use crate::propagation;
use crate::registry::{LookupMiss, PubSubEntry};
use bytes::Bytes;
use portico_api::pubsub::{BulkMessageEntry, BulkPublishRequest as DriverBulkRequest, PublishRequest as DriverPublishRequest};
use portico_ipc::proto::{
    BulkPublishRequest, BulkPublishResponse, BulkPublishResponseFailedEntry, Empty,
    PublishEventRequest,
};
use portico_resiliency::Target;
use portico_telemetry::pubsub_metrics;
use portico_telemetry::time::ScopeTimer;
use portico_types::envelope::{EnvelopeBuilder, ENVELOPE_CONTENT_TYPE};
use portico_types::error::PubSubError;
use portico_types::metadata::{is_idempotent, is_raw_payload, normalize_driver_metadata};
use std::collections::HashMap;
use std::collections::HashSet;
use tonic::Status;

impl Gateway {
    pub(crate) async fn handle_publish_event(
        &self,
        request: PublishEventRequest,
    ) -> Result<Empty, Status> {
        let entry = self.resolve_pubsub(&request.pubsub_name, &request.topic)?;

        // Trace extraction and the raw-payload flag are validated before
        // any envelope is built; a malformed request has no side effects.
        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;
        let raw = is_raw_payload(&request.metadata).map_err(reply_err)?;
        if raw && !entry.capabilities.raw_payload {
            return Err(reply_err(PubSubError::RawPayloadNotSupported(
                request.pubsub_name.clone(),
            )));
        }

        let (data, content_type) = if raw {
            (request.data.clone(), request.data_content_type.clone())
        } else {
            let envelope = EnvelopeBuilder::new(
                &self.ctx.app_id,
                &request.pubsub_name,
                &request.topic,
            )
            .content_type(&request.data_content_type)
            .trace(trace.traceparent.clone(), trace.tracestate.clone())
            .build(&request.data)
            .map_err(|e| {
                reply_err(PubSubError::Serialization {
                    topic: request.topic.clone(),
                    message: e.to_string(),
                })
            })?;
            let bytes = envelope.to_bytes().map_err(|e| {
                reply_err(PubSubError::Serialization {
                    topic: request.topic.clone(),
                    message: e.to_string(),
                })
            })?;
            (bytes, ENVELOPE_CONTENT_TYPE.to_string())
        };

        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        let policy = self
            .ctx
            .component_policy(&request.pubsub_name, "pubsub");
        let target = Target {
            component: &request.pubsub_name,
            operation: "publish",
        };
        let replayable = is_idempotent(&request.metadata);

        let _timer = ScopeTimer::new(|secs| {
            pubsub_metrics().observe_publish_latency(&request.pubsub_name, &request.topic, secs)
        });
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, replayable, || {
                let driver_request = DriverPublishRequest {
                    topic: request.topic.clone(),
                    data: data.clone(),
                    content_type: content_type.clone(),
                    metadata: driver_metadata.clone(),
                };
                let component = entry.component.clone();
                async move { component.publish(driver_request).await }
            })
            .await;

        pubsub_metrics().inc_egress(&request.pubsub_name, &request.topic, outcome.is_ok());
        outcome.map(|()| Empty {}).map_err(|err| {
            dispatch_err(err, |err| match err {
                portico_types::error::DriverError::Forbidden(_) => PubSubError::Forbidden {
                    topic: request.topic.clone(),
                    app_id: self.ctx.app_id.clone(),
                },
                other => PubSubError::PublishFailed {
                    pubsub: request.pubsub_name.clone(),
                    topic: request.topic.clone(),
                    message: other.to_string(),
                },
            })
        })
    }

    pub(crate) async fn handle_bulk_publish(
        &self,
        request: BulkPublishRequest,
    ) -> Result<BulkPublishResponse, Status> {
        let entry = self.resolve_pubsub(&request.pubsub_name, &request.topic)?;

        // Entry ids must be unique and non-empty; the whole request fails
        // before any broker dispatch otherwise.
        let mut seen = HashSet::with_capacity(request.entries.len());
        for e in &request.entries {
            if e.entry_id.is_empty() {
                return Err(reply_err(PubSubError::EmptyEntryId));
            }
            if !seen.insert(e.entry_id.as_str()) {
                return Err(reply_err(PubSubError::DuplicateEntryId(
                    e.entry_id.clone(),
                )));
            }
        }

        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;
        let raw = is_raw_payload(&request.metadata).map_err(reply_err)?;
        if raw && !entry.capabilities.raw_payload {
            return Err(reply_err(PubSubError::RawPayloadNotSupported(
                request.pubsub_name.clone(),
            )));
        }

        let mut driver_entries = Vec::with_capacity(request.entries.len());
        for e in &request.entries {
            let span = tracing::info_span!("bulk_publish_entry", entry_id = %e.entry_id, topic = %request.topic);
            let _enter = span.enter();
            let (event, content_type) = if raw {
                (e.event.clone(), e.content_type.clone())
            } else {
                let envelope = EnvelopeBuilder::new(
                    &self.ctx.app_id,
                    &request.pubsub_name,
                    &request.topic,
                )
                .content_type(&e.content_type)
                .trace(trace.traceparent.clone(), trace.tracestate.clone())
                .build(&e.event)
                .map_err(|err| {
                    reply_err(PubSubError::Serialization {
                        topic: request.topic.clone(),
                        message: err.to_string(),
                    })
                })?;
                let bytes: Bytes = envelope.to_bytes().map_err(|err| {
                    reply_err(PubSubError::Serialization {
                        topic: request.topic.clone(),
                        message: err.to_string(),
                    })
                })?;
                (bytes, ENVELOPE_CONTENT_TYPE.to_string())
            };
            let mut metadata: HashMap<String, String> = normalize_driver_metadata(&e.metadata);
            propagation::inject(&trace, &mut metadata);
            driver_entries.push(BulkMessageEntry {
                entry_id: e.entry_id.clone(),
                event,
                content_type,
                metadata,
            });
        }

        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        let policy = self
            .ctx
            .component_policy(&request.pubsub_name, "pubsub");
        let target = Target {
            component: &request.pubsub_name,
            operation: "bulk_publish",
        };
        let replayable = is_idempotent(&request.metadata);
        let total = driver_entries.len() as u64;

        let outcome = self
            .ctx
            .executor
            .run(&policy, target, replayable, || {
                let driver_request = DriverBulkRequest {
                    topic: request.topic.clone(),
                    entries: driver_entries.clone(),
                    metadata: driver_metadata.clone(),
                };
                let component = entry.component.clone();
                async move { component.bulk_publish(driver_request).await }
            })
            .await;

        match outcome {
            Ok(result) => {
                let failed = result.failed_entries.len() as u64;
                pubsub_metrics().inc_bulk_egress(
                    &request.pubsub_name,
                    &request.topic,
                    total - failed,
                    failed,
                );
                Ok(BulkPublishResponse {
                    failed_entries: result
                        .failed_entries
                        .into_iter()
                        .map(|f| BulkPublishResponseFailedEntry {
                            entry_id: f.entry_id,
                            error: f.error,
                        })
                        .collect(),
                })
            }
            Err(err) => {
                pubsub_metrics().inc_bulk_egress(&request.pubsub_name, &request.topic, 0, total);
                Err(dispatch_err(err, |err| PubSubError::PublishFailed {
                    pubsub: request.pubsub_name.clone(),
                    topic: request.topic.clone(),
                    message: err.to_string(),
                }))
            }
        }
    }

    fn resolve_pubsub(&self, pubsub_name: &str, topic: &str) -> Result<PubSubEntry, Status> {
        if pubsub_name.is_empty() {
            return Err(reply_err(PubSubError::NameEmpty));
        }
        if topic.is_empty() {
            return Err(reply_err(PubSubError::TopicEmpty(pubsub_name.to_string())));
        }
        self.ctx.registry.pubsub(pubsub_name).map_err(|miss| {
            reply_err(match miss {
                LookupMiss::NotConfigured => PubSubError::NotConfigured,
                LookupMiss::NotFound => PubSubError::NotFound(pubsub_name.to_string()),
            })
        })
    }
}
