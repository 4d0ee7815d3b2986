// Path: crates/runtime/src/gateway/mod.rs
//! The typed service surface: one handler per operation.
//!
//! Every handler follows the same arc: validate, resolve the component,
//! rewrite or build, dispatch through the resiliency engine, record
//! metrics, map errors through the taxonomy. Handlers live in one module
//! per operation family; this module owns the shared context and the
//! [`portico_ipc::RequestPlane`] implementation.

use crate::lifecycle::{InFlightGuard, Lifecycle};
use crate::registry::ComponentRegistry;
use crate::subscriptions::SubscriptionTable;
use portico_api::actors::ActorRuntime;
use portico_api::invocation::DirectInvoker;
use portico_api::outbox::Outbox;
use portico_ipc::proto::*;
use portico_ipc::status::rich_status;
use portico_ipc::RequestPlane;
use portico_resiliency::policy::Policy;
use portico_resiliency::{PolicyExecutor, ResiliencyProvider};
use portico_telemetry::error_metrics;
use portico_types::error::{Classified, ErrorCode};
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

mod actors;
mod bindings;
mod configuration;
mod invoke;
mod publish;
mod secrets;
mod state;

#[cfg(test)]
mod tests;

/// Construction-time wiring for one gateway instance.
///
/// Collaborators are injected here; none of them refer back to the gateway
/// type, which keeps the object graph acyclic.
pub struct RuntimeOptions {
    /// The application this sidecar fronts.
    pub app_id: String,
    /// The component registry.
    pub registry: Arc<ComponentRegistry>,
    /// Resiliency policy resolution.
    pub resiliency: Arc<ResiliencyProvider>,
    /// The actor runtime collaborator, when actors are enabled.
    pub actors: Option<Arc<dyn ActorRuntime>>,
    /// The direct invocation collaborator, when enabled.
    pub invoker: Option<Arc<dyn DirectInvoker>>,
    /// The outbox collaborator, when enabled.
    pub outbox: Option<Arc<dyn Outbox>>,
}

/// The shared, read-only context available to every handler.
pub(crate) struct RuntimeContext {
    pub app_id: String,
    pub registry: Arc<ComponentRegistry>,
    pub resiliency: Arc<ResiliencyProvider>,
    pub executor: PolicyExecutor,
    pub actors: Option<Arc<dyn ActorRuntime>>,
    pub invoker: Option<Arc<dyn DirectInvoker>>,
    pub outbox: Option<Arc<dyn Outbox>>,
    pub subscriptions: Arc<SubscriptionTable>,
    pub lifecycle: Arc<Lifecycle>,
}

impl RuntimeContext {
    /// The policy for a building-block call, or a passthrough when none is
    /// configured.
    pub fn component_policy(&self, name: &str, kind: &str) -> Arc<Policy> {
        self.resiliency
            .policy_for_component(name, kind)
            .unwrap_or_else(|| Arc::new(Policy::passthrough("default")))
    }

    /// The policy for a direct-invocation call.
    pub fn endpoint_policy(&self, endpoint: &str, method: &str) -> Arc<Policy> {
        self.resiliency
            .policy_for_endpoint(endpoint, method)
            .unwrap_or_else(|| Arc::new(Policy::passthrough("default")))
    }
}

/// The request-plane gateway.
///
/// Cheap to clone; all state lives behind the shared context.
#[derive(Clone)]
pub struct Gateway {
    pub(crate) ctx: Arc<RuntimeContext>,
}

impl Gateway {
    /// Builds a gateway from its wiring. Startup order is registry, then
    /// resiliency, then the gateway itself; both collaborators arrive
    /// already constructed.
    pub fn new(options: RuntimeOptions) -> Self {
        let RuntimeOptions {
            app_id,
            registry,
            resiliency,
            actors,
            invoker,
            outbox,
        } = options;
        Self {
            ctx: Arc::new(RuntimeContext {
                app_id,
                registry,
                resiliency,
                executor: PolicyExecutor::new(),
                actors,
                invoker,
                outbox,
                subscriptions: Arc::new(SubscriptionTable::new()),
                lifecycle: Arc::new(Lifecycle::new()),
            }),
        }
    }

    /// The gateway's lifecycle handle, for wiring into servers and the
    /// telemetry endpoint.
    pub fn lifecycle(&self) -> Arc<Lifecycle> {
        self.ctx.lifecycle.clone()
    }

    /// The live subscription table. Exposed for diagnostics and tests.
    pub fn subscriptions(&self) -> Arc<SubscriptionTable> {
        self.ctx.subscriptions.clone()
    }

    /// Closes the gateway: refuses new calls, drains in-flight requests,
    /// then drops every live subscription. Idempotent.
    pub async fn shutdown(&self) {
        if self.ctx.lifecycle.close() {
            tracing::info!("gateway closing; draining in-flight requests");
        }
        self.ctx.lifecycle.wait_drained().await;
        self.ctx.subscriptions.drain_all();
    }

    fn guard(&self) -> Result<InFlightGuard, Status> {
        self.ctx.lifecycle.guard().map_err(reply_err)
    }
}

/// Records the error metric and maps a taxonomy error to transport status.
/// The single choke point every handler returns errors through.
pub(crate) fn reply_err<E>(err: E) -> Status
where
    E: Classified + ErrorCode + std::fmt::Display,
{
    error_metrics().inc_error(err.kind().as_str(), err.code());
    rich_status(&err)
}

/// Maps a driver failure that survived the resiliency engine.
///
/// Transport-shaped outcomes (deadline, cancellation, unavailability — the
/// resiliency engine's own verdicts included) pass through with their
/// driver kind so callers see `DeadlineExceeded` and friends; every other
/// failure is folded into the call site's templated taxonomy error.
pub(crate) fn dispatch_err<E, F>(err: portico_types::error::DriverError, template: F) -> Status
where
    E: Classified + ErrorCode + std::fmt::Display,
    F: FnOnce(portico_types::error::DriverError) -> E,
{
    use portico_types::error::DriverError;
    match err {
        DriverError::Timeout | DriverError::Canceled | DriverError::Unavailable(_) => {
            reply_err(err)
        }
        other => reply_err(template(other)),
    }
}

#[tonic::async_trait]
impl RequestPlane for Gateway {
    async fn publish_event(
        &self,
        request: Request<PublishEventRequest>,
    ) -> Result<Response<Empty>, Status> {
        let _guard = self.guard()?;
        self.handle_publish_event(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn bulk_publish_event(
        &self,
        request: Request<BulkPublishRequest>,
    ) -> Result<Response<BulkPublishResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_bulk_publish(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn invoke_binding(
        &self,
        request: Request<InvokeBindingRequest>,
    ) -> Result<Response<InvokeBindingResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_invoke_binding(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn get_state(
        &self,
        request: Request<GetStateRequest>,
    ) -> Result<Response<GetStateResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_get_state(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn get_bulk_state(
        &self,
        request: Request<GetBulkStateRequest>,
    ) -> Result<Response<GetBulkStateResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_get_bulk_state(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn save_state(
        &self,
        request: Request<SaveStateRequest>,
    ) -> Result<Response<Empty>, Status> {
        let _guard = self.guard()?;
        self.handle_save_state(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn delete_state(
        &self,
        request: Request<DeleteStateRequest>,
    ) -> Result<Response<Empty>, Status> {
        let _guard = self.guard()?;
        self.handle_delete_state(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn delete_bulk_state(
        &self,
        request: Request<DeleteBulkStateRequest>,
    ) -> Result<Response<Empty>, Status> {
        let _guard = self.guard()?;
        self.handle_delete_bulk_state(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn execute_state_transaction(
        &self,
        request: Request<ExecuteStateTransactionRequest>,
    ) -> Result<Response<Empty>, Status> {
        let _guard = self.guard()?;
        self.handle_execute_state_transaction(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn get_actor_state(
        &self,
        request: Request<GetActorStateRequest>,
    ) -> Result<Response<GetActorStateResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_get_actor_state(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn execute_actor_state_transaction(
        &self,
        request: Request<ExecuteActorStateTransactionRequest>,
    ) -> Result<Response<Empty>, Status> {
        let _guard = self.guard()?;
        self.handle_execute_actor_state_transaction(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn invoke_actor(
        &self,
        request: Request<InvokeActorRequest>,
    ) -> Result<Response<InvokeActorResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_invoke_actor(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn get_configuration(
        &self,
        request: Request<GetConfigurationRequest>,
    ) -> Result<Response<GetConfigurationResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_get_configuration(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn get_configuration_alpha1(
        &self,
        request: Request<GetConfigurationRequest>,
    ) -> Result<Response<GetConfigurationResponse>, Status> {
        configuration::GET_CONFIGURATION_ALPHA1_NOTICE.warn_once();
        let _guard = self.guard()?;
        self.handle_get_configuration(request.into_inner())
            .await
            .map(Response::new)
    }

    type SubscribeConfigurationStream =
        ReceiverStream<Result<SubscribeConfigurationResponse, Status>>;

    async fn subscribe_configuration(
        &self,
        request: Request<SubscribeConfigurationRequest>,
    ) -> Result<Response<Self::SubscribeConfigurationStream>, Status> {
        let _guard = self.guard()?;
        self.handle_subscribe_configuration(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn subscribe_configuration_alpha1(
        &self,
        request: Request<SubscribeConfigurationRequest>,
    ) -> Result<Response<Self::SubscribeConfigurationStream>, Status> {
        configuration::SUBSCRIBE_CONFIGURATION_ALPHA1_NOTICE.warn_once();
        let _guard = self.guard()?;
        self.handle_subscribe_configuration(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn unsubscribe_configuration(
        &self,
        request: Request<UnsubscribeConfigurationRequest>,
    ) -> Result<Response<UnsubscribeConfigurationResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_unsubscribe_configuration(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn unsubscribe_configuration_alpha1(
        &self,
        request: Request<UnsubscribeConfigurationRequest>,
    ) -> Result<Response<UnsubscribeConfigurationResponse>, Status> {
        configuration::UNSUBSCRIBE_CONFIGURATION_ALPHA1_NOTICE.warn_once();
        let _guard = self.guard()?;
        self.handle_unsubscribe_configuration(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn get_secret(
        &self,
        request: Request<GetSecretRequest>,
    ) -> Result<Response<GetSecretResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_get_secret(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn get_bulk_secret(
        &self,
        request: Request<GetBulkSecretRequest>,
    ) -> Result<Response<GetBulkSecretResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_get_bulk_secret(request.into_inner())
            .await
            .map(Response::new)
    }

    async fn invoke_service(
        &self,
        request: Request<InvokeServiceRequest>,
    ) -> Result<Response<InvokeResponse>, Status> {
        let _guard = self.guard()?;
        self.handle_invoke_service(request.into_inner())
            .await
            .map(Response::new)
    }
}
