// Path: crates/runtime/src/gateway/tests/mod.rs
//! Gateway scenario tests against in-memory components.


use super::{Gateway, RuntimeOptions};
use crate::encryption::StateEncryption;
use crate::keys::KeyPrefixStrategy;
use crate::registry::{ComponentRegistry, SecretStoreEntry, StateStoreEntry};
use bytes::Bytes;
use mocks::*;
use portico_api::capabilities::ComponentCapabilities;
use portico_ipc::proto::*;
use portico_ipc::status::ERROR_CODE_METADATA_KEY;
use portico_ipc::RequestPlane;
use portico_resiliency::policy::Policy;
use portico_resiliency::retry::{RetryConfig, RetryStrategy};
use portico_resiliency::ResiliencyProvider;
use portico_types::metadata::{BAGGAGE_HEADER, IDEMPOTENCY_KEY, RAW_PAYLOAD_KEY};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tonic::{Code, Request};

fn options(registry: Arc<ComponentRegistry>) -> RuntimeOptions {
    RuntimeOptions {
        app_id: "app1".to_string(),
        registry,
        resiliency: Arc::new(ResiliencyProvider::new()),
        actors: None,
        invoker: None,
        outbox: None,
    }
}

fn retrying_policy(max_retries: u32) -> Policy {
    Policy {
        name: "retrying".to_string(),
        timeout: None,
        retry: Some(RetryConfig {
            strategy: RetryStrategy::Constant,
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            jitter: 0.0,
        }),
        breaker: None,
    }
}

fn md(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn code_of(status: &tonic::Status) -> Option<String> {
    status
        .metadata()
        .get(ERROR_CODE_METADATA_KEY)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn plain_store_entry(store: Arc<MemoryStateStore>) -> StateStoreEntry {
    StateStoreEntry {
        store,
        capabilities: ComponentCapabilities::NONE,
        prefix: KeyPrefixStrategy::AppId,
        encryption: None,
    }
}

// --- Publish ---

#[tokio::test]
async fn publish_wraps_payload_in_an_envelope() {
    let registry = Arc::new(ComponentRegistry::new());
    let broker = Arc::new(MockPubSub::default());
    registry.register_pubsub("ps1", broker.clone(), ComponentCapabilities::NONE);
    let gateway = Gateway::new(options(registry));

    gateway
        .handle_publish_event(PublishEventRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            data: Bytes::from_static(b"hi"),
            data_content_type: "text/plain".into(),
            metadata: HashMap::new(),
        })
        .await
        .unwrap();

    let published = broker.published.lock();
    assert_eq!(published.len(), 1);
    let envelope: serde_json::Value = serde_json::from_slice(&published[0].data).unwrap();
    assert_eq!(envelope["source"], "app1");
    assert_eq!(envelope["topic"], "t");
    assert_eq!(envelope["pubsubname"], "ps1");
    assert_eq!(envelope["data"], "hi");
    assert!(!envelope["id"].as_str().unwrap().is_empty());
    assert_eq!(published[0].content_type, "application/cloudevents+json");
}

#[tokio::test]
async fn publish_without_configuration_is_a_precondition_failure() {
    let gateway = Gateway::new(options(Arc::new(ComponentRegistry::new())));
    let status = gateway
        .handle_publish_event(PublishEventRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            data: Bytes::from_static(b"hi"),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);
    assert_eq!(code_of(&status).as_deref(), Some("ERR_PUBSUB_NOT_CONFIGURED"));
}

#[tokio::test]
async fn unknown_pubsub_among_registered_is_not_found() {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register_pubsub(
        "ps1",
        Arc::new(MockPubSub::default()),
        ComponentCapabilities::NONE,
    );
    let gateway = Gateway::new(options(registry));
    let status = gateway
        .handle_publish_event(PublishEventRequest {
            pubsub_name: "other".into(),
            topic: "t".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn raw_payload_bypasses_the_envelope() {
    let registry = Arc::new(ComponentRegistry::new());
    let broker = Arc::new(MockPubSub::default());
    registry.register_pubsub(
        "ps1",
        broker.clone(),
        ComponentCapabilities {
            raw_payload: true,
            ..ComponentCapabilities::NONE
        },
    );
    let gateway = Gateway::new(options(registry));

    gateway
        .handle_publish_event(PublishEventRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            data: Bytes::from_static(b"exact bytes"),
            data_content_type: "application/octet-stream".into(),
            metadata: md(&[(RAW_PAYLOAD_KEY, "true")]),
        })
        .await
        .unwrap();

    let published = broker.published.lock();
    assert_eq!(&published[0].data[..], b"exact bytes");
    assert_eq!(published[0].content_type, "application/octet-stream");
}

#[tokio::test]
async fn raw_payload_needs_the_capability() {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register_pubsub(
        "ps1",
        Arc::new(MockPubSub::default()),
        ComponentCapabilities::NONE,
    );
    let gateway = Gateway::new(options(registry));
    let status = gateway
        .handle_publish_event(PublishEventRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            metadata: md(&[(RAW_PAYLOAD_KEY, "true")]),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);
}

#[tokio::test]
async fn malformed_baggage_fails_before_any_dispatch() {
    let registry = Arc::new(ComponentRegistry::new());
    let broker = Arc::new(MockPubSub::default());
    registry.register_pubsub("ps1", broker.clone(), ComponentCapabilities::NONE);
    let gateway = Gateway::new(options(registry));

    let status = gateway
        .handle_publish_event(PublishEventRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            data: Bytes::from_static(b"hi"),
            metadata: md(&[(BAGGAGE_HEADER, "no-equals-sign")]),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(broker.published.lock().is_empty());
}

#[tokio::test]
async fn idempotent_publish_is_replayed_through_transient_failures() {
    let registry = Arc::new(ComponentRegistry::new());
    let broker = Arc::new(MockPubSub {
        transient_failures: 2.into(),
        ..MockPubSub::default()
    });
    registry.register_pubsub("ps1", broker.clone(), ComponentCapabilities::NONE);

    let mut resiliency = ResiliencyProvider::new();
    resiliency.add_component_policy("ps1", "pubsub", retrying_policy(5));
    let mut opts = options(registry);
    opts.resiliency = Arc::new(resiliency);
    let gateway = Gateway::new(opts);

    gateway
        .handle_publish_event(PublishEventRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            data: Bytes::from_static(b"hi"),
            metadata: md(&[(IDEMPOTENCY_KEY, "req-1")]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(broker.published.lock().len(), 1);
}

#[tokio::test]
async fn non_idempotent_publish_is_not_replayed() {
    let registry = Arc::new(ComponentRegistry::new());
    let broker = Arc::new(MockPubSub {
        transient_failures: 1.into(),
        ..MockPubSub::default()
    });
    registry.register_pubsub("ps1", broker.clone(), ComponentCapabilities::NONE);

    let mut resiliency = ResiliencyProvider::new();
    resiliency.add_component_policy("ps1", "pubsub", retrying_policy(5));
    let mut opts = options(registry);
    opts.resiliency = Arc::new(resiliency);
    let gateway = Gateway::new(opts);

    let status = gateway
        .handle_publish_event(PublishEventRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            data: Bytes::from_static(b"hi"),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
    assert!(broker.published.lock().is_empty());
}

#[tokio::test]
async fn bulk_publish_rejects_duplicate_entry_ids_before_dispatch() {
    let registry = Arc::new(ComponentRegistry::new());
    let broker = Arc::new(MockPubSub::default());
    registry.register_pubsub("ps1", broker.clone(), ComponentCapabilities::NONE);
    let gateway = Gateway::new(options(registry));

    let entry = |id: &str| BulkPublishRequestEntry {
        entry_id: id.to_string(),
        event: Bytes::from_static(b"x"),
        content_type: "text/plain".into(),
        metadata: HashMap::new(),
    };
    let status = gateway
        .handle_bulk_publish(BulkPublishRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            entries: vec![entry("a"), entry("a"), entry("b")],
            metadata: HashMap::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(broker.published.lock().is_empty());
}

#[tokio::test]
async fn bulk_publish_reports_partial_failure_as_success() {
    let registry = Arc::new(ComponentRegistry::new());
    let broker = Arc::new(MockPubSub {
        poison_payloads: vec!["poison"],
        ..MockPubSub::default()
    });
    registry.register_pubsub("ps1", broker.clone(), ComponentCapabilities::NONE);
    let gateway = Gateway::new(options(registry));

    let entry = |id: &str, body: &'static [u8]| BulkPublishRequestEntry {
        entry_id: id.to_string(),
        event: Bytes::from_static(body),
        content_type: "text/plain".into(),
        metadata: HashMap::new(),
    };
    let response = gateway
        .handle_bulk_publish(BulkPublishRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            entries: vec![entry("a", b"fine"), entry("b", b"poison"), entry("c", b"ok")],
            metadata: HashMap::new(),
        })
        .await
        .unwrap();

    assert_eq!(response.failed_entries.len(), 1);
    assert_eq!(response.failed_entries[0].entry_id, "b");
    // published = |entries| - |failed|
    assert_eq!(broker.published.lock().len(), 2);
}

// --- State ---

#[tokio::test]
async fn state_keys_are_rewritten_for_drivers_and_projected_back() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MemoryStateStore::default());
    registry.register_state_store("s1", plain_store_entry(store.clone()));
    let gateway = Gateway::new(options(registry));

    gateway
        .handle_save_state(SaveStateRequest {
            store_name: "s1".into(),
            states: vec![StateItem {
                key: "k1".into(),
                value: Bytes::from_static(b"v1"),
                ..Default::default()
            }],
        })
        .await
        .unwrap();

    // The driver observed only the rewritten key.
    assert_eq!(store.observed_keys.lock().as_slice(), ["app1||k1"]);

    let response = gateway
        .handle_get_bulk_state(GetBulkStateRequest {
            store_name: "s1".into(),
            keys: vec!["k1".into()],
            ..Default::default()
        })
        .await
        .unwrap();
    // The caller sees its original key.
    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].key, "k1");
    assert_eq!(&response.items[0].data[..], b"v1");
}

#[tokio::test]
async fn empty_bulk_get_answers_without_dispatch() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MemoryStateStore::default());
    registry.register_state_store("s1", plain_store_entry(store.clone()));
    let gateway = Gateway::new(options(registry));

    let response = gateway
        .handle_get_bulk_state(GetBulkStateRequest {
            store_name: "s1".into(),
            keys: vec![],
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(response.items.is_empty());
    assert!(store.observed_keys.lock().is_empty());
}

#[tokio::test]
async fn empty_state_key_is_rejected() {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register_state_store("s1", plain_store_entry(Arc::new(MemoryStateStore::default())));
    let gateway = Gateway::new(options(registry));

    let status = gateway
        .handle_get_state(GetStateRequest {
            store_name: "s1".into(),
            key: String::new(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn etag_mismatch_maps_to_condition_failed() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MemoryStateStore::default());
    store.seed("app1||k", b"old", 2);
    registry.register_state_store("s1", plain_store_entry(store));
    let gateway = Gateway::new(options(registry));

    let status = gateway
        .handle_save_state(SaveStateRequest {
            store_name: "s1".into(),
            states: vec![StateItem {
                key: "k".into(),
                value: Bytes::from_static(b"new"),
                etag: Some(Etag { value: "1".into() }),
                ..Default::default()
            }],
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Aborted);
    assert_eq!(code_of(&status).as_deref(), Some("ERR_STATE_ETAG_MISMATCH"));
}

#[tokio::test]
async fn unparseable_etag_maps_to_invalid_argument() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MemoryStateStore::default());
    store.seed("app1||k", b"old", 2);
    registry.register_state_store("s1", plain_store_entry(store));
    let gateway = Gateway::new(options(registry));

    let status = gateway
        .handle_delete_state(DeleteStateRequest {
            store_name: "s1".into(),
            key: "k".into(),
            etag: Some(Etag {
                value: "zzz".into(),
            }),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(code_of(&status).as_deref(), Some("ERR_STATE_ETAG_INVALID"));
}

#[tokio::test]
async fn encrypted_store_round_trips_and_hides_plaintext() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MemoryStateStore::default());
    registry.register_state_store(
        "es1",
        StateStoreEntry {
            store: store.clone(),
            capabilities: ComponentCapabilities::NONE,
            prefix: KeyPrefixStrategy::AppId,
            encryption: Some(Arc::new(StateEncryption::new(&[9u8; 32]))),
        },
    );
    let gateway = Gateway::new(options(registry));

    gateway
        .handle_save_state(SaveStateRequest {
            store_name: "es1".into(),
            states: vec![StateItem {
                key: "k".into(),
                value: Bytes::from_static(b"plaintext"),
                ..Default::default()
            }],
        })
        .await
        .unwrap();

    // Ciphertext on the wire differs from the plaintext.
    let stored = store.raw("app1||k").unwrap();
    assert_ne!(&stored[..], b"plaintext");

    let response = gateway
        .handle_get_state(GetStateRequest {
            store_name: "es1".into(),
            key: "k".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(&response.data[..], b"plaintext");
}

#[tokio::test]
async fn corrupt_encrypted_item_fails_item_not_batch() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MemoryStateStore::default());
    registry.register_state_store(
        "es1",
        StateStoreEntry {
            store: store.clone(),
            capabilities: ComponentCapabilities::NONE,
            prefix: KeyPrefixStrategy::AppId,
            encryption: Some(Arc::new(StateEncryption::new(&[9u8; 32]))),
        },
    );
    let gateway = Gateway::new(options(registry));

    gateway
        .handle_save_state(SaveStateRequest {
            store_name: "es1".into(),
            states: vec![StateItem {
                key: "good".into(),
                value: Bytes::from_static(b"readable"),
                ..Default::default()
            }],
        })
        .await
        .unwrap();
    store.seed("app1||bad", b"not-real-ciphertext", 1);

    let response = gateway
        .handle_get_bulk_state(GetBulkStateRequest {
            store_name: "es1".into(),
            keys: vec!["good".into(), "bad".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    let good = response.items.iter().find(|i| i.key == "good").unwrap();
    assert_eq!(&good.data[..], b"readable");
    assert!(good.error.is_empty());

    let bad = response.items.iter().find(|i| i.key == "bad").unwrap();
    assert!(bad.data.is_empty());
    assert!(!bad.error.is_empty());
}

#[tokio::test]
async fn transactions_need_the_capability() {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register_state_store("s1", plain_store_entry(Arc::new(MemoryStateStore::default())));
    let gateway = Gateway::new(options(registry));

    let status = gateway
        .handle_execute_state_transaction(ExecuteStateTransactionRequest {
            store_name: "s1".into(),
            operations: vec![],
            metadata: HashMap::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);
}

#[tokio::test]
async fn oversized_transactions_are_rejected_without_dispatch() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MemoryStateStore::default());
    registry.register_state_store(
        "s1",
        StateStoreEntry {
            store: store.clone(),
            capabilities: ComponentCapabilities {
                transactional: true,
                multi_max_size: Some(2),
                ..ComponentCapabilities::NONE
            },
            prefix: KeyPrefixStrategy::AppId,
            encryption: None,
        },
    );
    let gateway = Gateway::new(options(registry));

    let upsert = |key: &str| TransactionalStateOperation {
        operation_type: "upsert".into(),
        request: Some(StateItem {
            key: key.into(),
            value: Bytes::from_static(b"v"),
            ..Default::default()
        }),
    };
    let status = gateway
        .handle_execute_state_transaction(ExecuteStateTransactionRequest {
            store_name: "s1".into(),
            operations: vec![upsert("a"), upsert("b"), upsert("c")],
            metadata: HashMap::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(store.multi_batches.lock().is_empty());
}

#[tokio::test]
async fn outbox_rewrite_is_the_atomic_unit() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MemoryStateStore::default());
    registry.register_state_store(
        "s1",
        StateStoreEntry {
            store: store.clone(),
            capabilities: ComponentCapabilities {
                transactional: true,
                ..ComponentCapabilities::NONE
            },
            prefix: KeyPrefixStrategy::AppId,
            encryption: None,
        },
    );
    let mut opts = options(registry);
    opts.outbox = Some(Arc::new(MockOutbox {
        store_name: "s1".into(),
    }));
    let gateway = Gateway::new(opts);

    gateway
        .handle_execute_state_transaction(ExecuteStateTransactionRequest {
            store_name: "s1".into(),
            operations: vec![TransactionalStateOperation {
                operation_type: "upsert".into(),
                request: Some(StateItem {
                    key: "k1".into(),
                    value: Bytes::from_static(b"v"),
                    ..Default::default()
                }),
            }],
            metadata: HashMap::new(),
        })
        .await
        .unwrap();

    let batches = store.multi_batches.lock();
    assert_eq!(batches.len(), 1);
    let keys: Vec<_> = batches[0].iter().map(|op| op.key().to_string()).collect();
    assert_eq!(keys, ["app1||k1", "app1||outbox-evt"]);
}

// --- Actors ---

#[tokio::test]
async fn actor_invocation_retries_resolution_but_not_the_call() {
    let actors = Arc::new(MockActorRuntime {
        resolve_failures: 2.into(),
        ..MockActorRuntime::default()
    });
    let mut resiliency = ResiliencyProvider::new();
    resiliency.add_component_policy("counter", "actor", retrying_policy(5));
    let mut opts = options(Arc::new(ComponentRegistry::new()));
    opts.resiliency = Arc::new(resiliency);
    opts.actors = Some(actors.clone());
    let gateway = Gateway::new(opts);

    let response = gateway
        .handle_invoke_actor(InvokeActorRequest {
            actor_type: "counter".into(),
            actor_id: "7".into(),
            method: "inc".into(),
            data: Bytes::new(),
            metadata: HashMap::new(),
        })
        .await
        .unwrap();
    assert_eq!(&response.data[..], b"ok:inc");
    // Resolution was replayed; the actor call stayed at-most-once.
    assert_eq!(actors.resolve_calls.load(Ordering::SeqCst), 3);
    assert_eq!(actors.invoke_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn actors_absent_is_not_configured() {
    let gateway = Gateway::new(options(Arc::new(ComponentRegistry::new())));
    let status = gateway
        .handle_get_actor_state(GetActorStateRequest {
            actor_type: "counter".into(),
            actor_id: "7".into(),
            key: "n".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);
}

// --- Direct invocation ---

#[tokio::test]
async fn invoke_service_copies_headers_and_cross_transport_status() {
    let invoker = Arc::new(MockInvoker::default());
    let mut opts = options(Arc::new(ComponentRegistry::new()));
    opts.invoker = Some(invoker.clone());
    let gateway = Gateway::new(opts);

    let response = gateway
        .handle_invoke_service(InvokeServiceRequest {
            id: "app2".into(),
            message: Some(InvokeRequest {
                method: "charge".into(),
                data: Bytes::from_static(b"{}"),
                content_type: "application/json".into(),
                metadata: HashMap::new(),
            }),
        })
        .await
        .unwrap();

    assert_eq!(response.metadata.get("x-upstream").unwrap(), "1");
    assert_eq!(response.metadata.get("x-trailer").unwrap(), "t");
    assert_eq!(response.metadata.get("portico-http-status").unwrap(), "200");
    assert_eq!(&response.data[..], b"{}");
}

// --- Configuration ---

#[tokio::test]
async fn get_configuration_projects_driver_items() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MockConfigurationStore::default());
    store.set_value("k1", "v1", "1");
    registry.register_configuration_store("cs1", store);
    let gateway = Gateway::new(options(registry));

    let response = gateway
        .handle_get_configuration(GetConfigurationRequest {
            store_name: "cs1".into(),
            keys: vec!["k1".into()],
            metadata: HashMap::new(),
        })
        .await
        .unwrap();
    assert_eq!(response.items.get("k1").unwrap().value, "v1");
}

#[tokio::test]
async fn subscription_stream_sends_id_before_any_update() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MockConfigurationStore::default());
    registry.register_configuration_store("cs1", store.clone());
    let gateway = Gateway::new(options(registry));

    let mut stream = gateway
        .handle_subscribe_configuration(SubscribeConfigurationRequest {
            store_name: "cs1".into(),
            keys: vec!["k2".into(), "k1".into(), "k2".into()],
            metadata: HashMap::new(),
        })
        .await
        .unwrap();

    // The driver emits an update immediately; it must still arrive after
    // the id frame.
    store
        .push_update(
            "sub-1",
            [(
                "k1".to_string(),
                portico_types::configuration::ConfigurationItem {
                    value: "v".into(),
                    version: "1".into(),
                    metadata: HashMap::new(),
                },
            )]
            .into(),
        )
        .await;

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.id, "sub-1");
    assert!(first.items.is_empty());

    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second.items.get("k1").unwrap().value, "v");

    // Keys were canonicalized: sorted, deduplicated.
    assert!(gateway.subscriptions().contains("sub-1"));

    // Consumer disconnect drains the subscription and unsubscribes the
    // driver on a fresh context.
    drop(stream);
    wait_until(|| {
        !gateway.subscriptions().contains("sub-1")
            && store.unsubscribed.lock().contains(&"sub-1".to_string())
    })
    .await;
}

#[tokio::test]
async fn unsubscribe_rpc_is_a_signal_that_drains_the_stream() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MockConfigurationStore::default());
    registry.register_configuration_store("cs1", store.clone());
    let gateway = Gateway::new(options(registry));

    let mut stream = gateway
        .handle_subscribe_configuration(SubscribeConfigurationRequest {
            store_name: "cs1".into(),
            keys: vec!["k1".into()],
            metadata: HashMap::new(),
        })
        .await
        .unwrap();
    let first = stream.next().await.unwrap().unwrap();

    let response = gateway
        .handle_unsubscribe_configuration(UnsubscribeConfigurationRequest {
            store_name: "cs1".into(),
            id: first.id.clone(),
        })
        .await
        .unwrap();
    assert!(response.ok);

    // The owning stream tears down: it ends, and the entry disappears.
    assert!(stream.next().await.is_none());
    wait_until(|| !gateway.subscriptions().contains(&first.id)).await;

    let missing = gateway
        .handle_unsubscribe_configuration(UnsubscribeConfigurationRequest {
            store_name: "cs1".into(),
            id: "sub-999".into(),
        })
        .await
        .unwrap();
    assert!(!missing.ok);
}

#[tokio::test]
async fn driver_termination_drains_the_subscription() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MockConfigurationStore::default());
    registry.register_configuration_store("cs1", store.clone());
    let gateway = Gateway::new(options(registry));

    let mut stream = gateway
        .handle_subscribe_configuration(SubscribeConfigurationRequest {
            store_name: "cs1".into(),
            keys: vec!["k1".into()],
            metadata: HashMap::new(),
        })
        .await
        .unwrap();
    let first = stream.next().await.unwrap().unwrap();

    store.terminate(&first.id);
    assert!(stream.next().await.is_none());
    wait_until(|| !gateway.subscriptions().contains(&first.id)).await;
}

// --- Secrets ---

#[tokio::test]
async fn secrets_respect_the_allowed_list() {
    let registry = Arc::new(ComponentRegistry::new());
    let mut secrets = HashMap::new();
    secrets.insert(
        "db-password".to_string(),
        [("value".to_string(), "hunter2".to_string())].into(),
    );
    secrets.insert(
        "api-key".to_string(),
        [("value".to_string(), "k".to_string())].into(),
    );
    registry.register_secret_store(
        "vault",
        SecretStoreEntry {
            store: Arc::new(MockSecretStore { secrets }),
            allowed_secrets: Some(vec!["db-password".to_string()]),
        },
    );
    let gateway = Gateway::new(options(registry));

    let response = gateway
        .handle_get_secret(GetSecretRequest {
            store_name: "vault".into(),
            key: "db-password".into(),
            metadata: HashMap::new(),
        })
        .await
        .unwrap();
    assert_eq!(response.data.get("value").unwrap(), "hunter2");

    let status = gateway
        .handle_get_secret(GetSecretRequest {
            store_name: "vault".into(),
            key: "api-key".into(),
            metadata: HashMap::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);

    // The bulk path silently omits undisclosed secrets.
    let bulk = gateway
        .handle_get_bulk_secret(GetBulkSecretRequest {
            store_name: "vault".into(),
            metadata: HashMap::new(),
        })
        .await
        .unwrap();
    assert!(bulk.data.contains_key("db-password"));
    assert!(!bulk.data.contains_key("api-key"));
}

// --- Lifecycle ---

#[tokio::test]
async fn closed_gateway_drains_calls_with_unavailable() {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register_pubsub(
        "ps1",
        Arc::new(MockPubSub::default()),
        ComponentCapabilities::NONE,
    );
    let gateway = Gateway::new(options(registry));
    gateway.shutdown().await;

    let status = gateway
        .publish_event(Request::new(PublishEventRequest {
            pubsub_name: "ps1".into(),
            topic: "t".into(),
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
    assert_eq!(code_of(&status).as_deref(), Some("ERR_RUNTIME_CLOSED"));
}

#[tokio::test]
async fn shutdown_drops_live_subscriptions() {
    let registry = Arc::new(ComponentRegistry::new());
    let store = Arc::new(MockConfigurationStore::default());
    registry.register_configuration_store("cs1", store.clone());
    let gateway = Gateway::new(options(registry));

    let mut stream = gateway
        .handle_subscribe_configuration(SubscribeConfigurationRequest {
            store_name: "cs1".into(),
            keys: vec!["k1".into()],
            metadata: HashMap::new(),
        })
        .await
        .unwrap();
    let _ = stream.next().await.unwrap().unwrap();
    assert_eq!(gateway.subscriptions().len(), 1);

    gateway.shutdown().await;
    assert!(gateway.subscriptions().is_empty());
    assert!(stream.next().await.is_none());
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within the drain window");
}
