// Path: crates/ipc/src/service.rs
//! The typed service surface of the request plane.
//!
//! The trait mirrors the shape tonic generates for a gRPC service: unary
//! methods take `Request<T>` and return `Response<U>`, server-streaming
//! methods return an associated stream of frames. The gateway in
//! `portico-runtime` is the one implementation; test harnesses implement
//! it with in-memory components.

use crate::proto::*;
use tokio_stream::Stream;
use tonic::{Request, Response, Status};

/// The request-plane service.
///
/// The `*_alpha1` methods are deprecated aliases kept for callers built
/// against the pre-stable surface. Implementations route them to the
/// stable handlers and emit a one-time deprecation warning.
#[tonic::async_trait]
pub trait RequestPlane: Send + Sync + 'static {
    /// Publishes a single event.
    async fn publish_event(
        &self,
        request: Request<PublishEventRequest>,
    ) -> Result<Response<Empty>, Status>;

    /// Publishes a batch of events to one topic. Partial broker failure is
    /// reported through `failed_entries`, not a call-level error.
    async fn bulk_publish_event(
        &self,
        request: Request<BulkPublishRequest>,
    ) -> Result<Response<BulkPublishResponse>, Status>;

    /// Invokes an output binding.
    async fn invoke_binding(
        &self,
        request: Request<InvokeBindingRequest>,
    ) -> Result<Response<InvokeBindingResponse>, Status>;

    /// Reads one key from a state store.
    async fn get_state(
        &self,
        request: Request<GetStateRequest>,
    ) -> Result<Response<GetStateResponse>, Status>;

    /// Reads many keys from a state store.
    async fn get_bulk_state(
        &self,
        request: Request<GetBulkStateRequest>,
    ) -> Result<Response<GetBulkStateResponse>, Status>;

    /// Writes a batch of records to a state store.
    async fn save_state(
        &self,
        request: Request<SaveStateRequest>,
    ) -> Result<Response<Empty>, Status>;

    /// Deletes one key from a state store.
    async fn delete_state(
        &self,
        request: Request<DeleteStateRequest>,
    ) -> Result<Response<Empty>, Status>;

    /// Deletes a batch of keys from a state store.
    async fn delete_bulk_state(
        &self,
        request: Request<DeleteBulkStateRequest>,
    ) -> Result<Response<Empty>, Status>;

    /// Applies an ordered operation list atomically.
    async fn execute_state_transaction(
        &self,
        request: Request<ExecuteStateTransactionRequest>,
    ) -> Result<Response<Empty>, Status>;

    /// Reads one key of an actor's state.
    async fn get_actor_state(
        &self,
        request: Request<GetActorStateRequest>,
    ) -> Result<Response<GetActorStateResponse>, Status>;

    /// Applies a batch of actor state operations atomically.
    async fn execute_actor_state_transaction(
        &self,
        request: Request<ExecuteActorStateTransactionRequest>,
    ) -> Result<Response<Empty>, Status>;

    /// Invokes a method on an actor.
    async fn invoke_actor(
        &self,
        request: Request<InvokeActorRequest>,
    ) -> Result<Response<InvokeActorResponse>, Status>;

    /// Reads configuration keys.
    async fn get_configuration(
        &self,
        request: Request<GetConfigurationRequest>,
    ) -> Result<Response<GetConfigurationResponse>, Status>;

    /// Deprecated alias for [`RequestPlane::get_configuration`].
    async fn get_configuration_alpha1(
        &self,
        request: Request<GetConfigurationRequest>,
    ) -> Result<Response<GetConfigurationResponse>, Status>;

    /// Server streaming response type for the SubscribeConfiguration method.
    type SubscribeConfigurationStream: Stream<Item = Result<SubscribeConfigurationResponse, Status>>
        + Send
        + 'static;

    /// Opens a configuration subscription. The first frame carries the
    /// subscription id; updates follow in driver-emission order.
    async fn subscribe_configuration(
        &self,
        request: Request<SubscribeConfigurationRequest>,
    ) -> Result<Response<Self::SubscribeConfigurationStream>, Status>;

    /// Deprecated alias for [`RequestPlane::subscribe_configuration`].
    async fn subscribe_configuration_alpha1(
        &self,
        request: Request<SubscribeConfigurationRequest>,
    ) -> Result<Response<Self::SubscribeConfigurationStream>, Status>;

    /// Signals a subscription to stop. The owning stream performs the
    /// actual teardown.
    async fn unsubscribe_configuration(
        &self,
        request: Request<UnsubscribeConfigurationRequest>,
    ) -> Result<Response<UnsubscribeConfigurationResponse>, Status>;

    /// Deprecated alias for [`RequestPlane::unsubscribe_configuration`].
    async fn unsubscribe_configuration_alpha1(
        &self,
        request: Request<UnsubscribeConfigurationRequest>,
    ) -> Result<Response<UnsubscribeConfigurationResponse>, Status>;

    /// Reads one secret.
    async fn get_secret(
        &self,
        request: Request<GetSecretRequest>,
    ) -> Result<Response<GetSecretResponse>, Status>;

    /// Reads every secret the store exposes.
    async fn get_bulk_secret(
        &self,
        request: Request<GetBulkSecretRequest>,
    ) -> Result<Response<GetBulkSecretResponse>, Status>;

    /// Legacy direct invocation of a remote application.
    async fn invoke_service(
        &self,
        request: Request<InvokeServiceRequest>,
    ) -> Result<Response<InvokeResponse>, Status>;
}
