// Path: crates/ipc/src/proto.rs
//! Wire messages for the request plane, package `portico.runtime.v1`.
//!
//! Field tags are part of the wire contract; never renumber them.

use bytes::Bytes;
use std::collections::HashMap;

/// An empty response.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Empty {}

/// Concurrency discipline for state writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StateConcurrency {
    /// Store default.
    ConcurrencyUnspecified = 0,
    /// First writer wins.
    ConcurrencyFirstWrite = 1,
    /// Last writer wins.
    ConcurrencyLastWrite = 2,
}

/// Consistency level for state operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StateConsistency {
    /// Store default.
    ConsistencyUnspecified = 0,
    /// Reads may be stale.
    ConsistencyEventual = 1,
    /// Reads observe the latest acknowledged write.
    ConsistencyStrong = 2,
}

/// Per-operation state options.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct StateOptions {
    #[prost(enumeration = "StateConcurrency", tag = "1")]
    pub concurrency: i32,
    #[prost(enumeration = "StateConsistency", tag = "2")]
    pub consistency: i32,
}

/// An optimistic-concurrency token. Wrapped in a message so "absent" and
/// "empty string" stay distinguishable on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Etag {
    #[prost(string, tag = "1")]
    pub value: String,
}

/// A keyed state record.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StateItem {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub value: Bytes,
    #[prost(message, optional, tag = "3")]
    pub etag: Option<Etag>,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
    #[prost(message, optional, tag = "5")]
    pub options: Option<StateOptions>,
}

// --- Publish ---

/// Publishes a single event.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublishEventRequest {
    #[prost(string, tag = "1")]
    pub pubsub_name: String,
    #[prost(string, tag = "2")]
    pub topic: String,
    #[prost(bytes = "bytes", tag = "3")]
    pub data: Bytes,
    #[prost(string, tag = "4")]
    pub data_content_type: String,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
}

/// One entry of a bulk publish.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkPublishRequestEntry {
    #[prost(string, tag = "1")]
    pub entry_id: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub event: Bytes,
    #[prost(string, tag = "3")]
    pub content_type: String,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

/// Publishes a batch of events to one topic.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkPublishRequest {
    #[prost(string, tag = "1")]
    pub pubsub_name: String,
    #[prost(string, tag = "2")]
    pub topic: String,
    #[prost(message, repeated, tag = "3")]
    pub entries: Vec<BulkPublishRequestEntry>,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

/// A bulk entry the broker failed.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkPublishResponseFailedEntry {
    #[prost(string, tag = "1")]
    pub entry_id: String,
    #[prost(string, tag = "2")]
    pub error: String,
}

/// Outcome of a bulk publish; empty `failed_entries` means total success.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkPublishResponse {
    #[prost(message, repeated, tag = "1")]
    pub failed_entries: Vec<BulkPublishResponseFailedEntry>,
}

// --- Bindings ---

/// Invokes an output binding.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeBindingRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub data: Bytes,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
    #[prost(string, tag = "4")]
    pub operation: String,
}

/// The binding driver's answer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeBindingResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: Bytes,
    #[prost(map = "string, string", tag = "2")]
    pub metadata: HashMap<String, String>,
}

// --- State ---

/// Reads one key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, tag = "2")]
    pub key: String,
    #[prost(enumeration = "StateConsistency", tag = "3")]
    pub consistency: i32,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

/// One stored record; `data` is empty for missing keys.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStateResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: Bytes,
    #[prost(string, tag = "2")]
    pub etag: String,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

/// Reads many keys.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBulkStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, repeated, tag = "2")]
    pub keys: Vec<String>,
    #[prost(uint32, tag = "3")]
    pub parallelism: u32,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

/// One entry of a bulk read; a non-empty `error` marks per-item failure.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkStateItem {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub data: Bytes,
    #[prost(string, tag = "3")]
    pub etag: String,
    #[prost(string, tag = "4")]
    pub error: String,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
}

/// Bulk read response, one entry per requested key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBulkStateResponse {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<BulkStateItem>,
}

/// Writes a batch of records (not atomic).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SaveStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(message, repeated, tag = "2")]
    pub states: Vec<StateItem>,
}

/// Deletes one key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, tag = "2")]
    pub key: String,
    #[prost(message, optional, tag = "3")]
    pub etag: Option<Etag>,
    #[prost(message, optional, tag = "4")]
    pub options: Option<StateOptions>,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
}

/// Deletes a batch of keys (not atomic).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteBulkStateRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(message, repeated, tag = "2")]
    pub states: Vec<StateItem>,
}

/// One operation of a state transaction. `operation_type` is `upsert` or
/// `delete`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionalStateOperation {
    #[prost(string, tag = "1")]
    pub operation_type: String,
    #[prost(message, optional, tag = "2")]
    pub request: Option<StateItem>,
}

/// Applies an ordered operation list atomically.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteStateTransactionRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(message, repeated, tag = "2")]
    pub operations: Vec<TransactionalStateOperation>,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

// --- Actors ---

/// Reads one key of an actor's state.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetActorStateRequest {
    #[prost(string, tag = "1")]
    pub actor_type: String,
    #[prost(string, tag = "2")]
    pub actor_id: String,
    #[prost(string, tag = "3")]
    pub key: String,
}

/// The actor state value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetActorStateResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: Bytes,
    #[prost(map = "string, string", tag = "2")]
    pub metadata: HashMap<String, String>,
}

/// One actor state operation. `operation_type` is `upsert` or `delete`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionalActorStateOperation {
    #[prost(string, tag = "1")]
    pub operation_type: String,
    #[prost(string, tag = "2")]
    pub key: String,
    #[prost(bytes = "bytes", tag = "3")]
    pub value: Bytes,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

/// Applies a batch of actor state operations atomically.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteActorStateTransactionRequest {
    #[prost(string, tag = "1")]
    pub actor_type: String,
    #[prost(string, tag = "2")]
    pub actor_id: String,
    #[prost(message, repeated, tag = "3")]
    pub operations: Vec<TransactionalActorStateOperation>,
}

/// Invokes a method on an actor.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeActorRequest {
    #[prost(string, tag = "1")]
    pub actor_type: String,
    #[prost(string, tag = "2")]
    pub actor_id: String,
    #[prost(string, tag = "3")]
    pub method: String,
    #[prost(bytes = "bytes", tag = "4")]
    pub data: Bytes,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
}

/// The actor method's answer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeActorResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: Bytes,
}

// --- Configuration ---

/// A single configuration value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigurationItem {
    #[prost(string, tag = "1")]
    pub value: String,
    #[prost(string, tag = "2")]
    pub version: String,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

/// Reads configuration keys.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetConfigurationRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, repeated, tag = "2")]
    pub keys: Vec<String>,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

/// The configuration items, keyed by configuration key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetConfigurationResponse {
    #[prost(map = "string, message", tag = "1")]
    pub items: HashMap<String, ConfigurationItem>,
}

/// Opens a configuration subscription.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeConfigurationRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, repeated, tag = "2")]
    pub keys: Vec<String>,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

/// One frame of the subscription stream. The first frame carries only the
/// subscription `id`; subsequent frames carry changed items.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeConfigurationResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(map = "string, message", tag = "2")]
    pub items: HashMap<String, ConfigurationItem>,
}

/// Signals a subscription to stop.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnsubscribeConfigurationRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, tag = "2")]
    pub id: String,
}

/// Whether the stop signal reached a live subscription.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnsubscribeConfigurationResponse {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(string, tag = "2")]
    pub message: String,
}

// --- Secrets ---

/// Reads one secret.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetSecretRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(string, tag = "2")]
    pub key: String,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}

/// The secret's named values.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetSecretResponse {
    #[prost(map = "string, string", tag = "1")]
    pub data: HashMap<String, String>,
}

/// Reads every secret the store exposes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBulkSecretRequest {
    #[prost(string, tag = "1")]
    pub store_name: String,
    #[prost(map = "string, string", tag = "2")]
    pub metadata: HashMap<String, String>,
}

/// One secret's values inside a bulk response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SecretResponse {
    #[prost(map = "string, string", tag = "1")]
    pub secrets: HashMap<String, String>,
}

/// All secrets, keyed by secret name.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBulkSecretResponse {
    #[prost(map = "string, message", tag = "1")]
    pub data: HashMap<String, SecretResponse>,
}

// --- Direct invocation (legacy) ---

/// The inner invocation message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeRequest {
    #[prost(string, tag = "1")]
    pub method: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub data: Bytes,
    #[prost(string, tag = "3")]
    pub content_type: String,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

/// Invokes a method on a remote application through the sidecar.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeServiceRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    pub message: Option<InvokeRequest>,
}

/// The remote application's answer. Headers and trailers are copied into
/// `metadata`; a cross-transport status rides under its reserved key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: Bytes,
    #[prost(string, tag = "2")]
    pub content_type: String,
    #[prost(map = "string, string", tag = "3")]
    pub metadata: HashMap<String, String>,
}
