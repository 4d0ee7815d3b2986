// Path: crates/runtime/src/gateway/actors.rs
//! Actor handlers: state reads, state transactions, and invocation.
//!
//! The gateway validates and delegates. Invocation is two-phase: host
//! resolution runs under the pre-lock resiliency policy and may be
//! retried; the actor call itself is dispatched exactly once against the
//! resolved target, keeping it at-most-once.

use super::{dispatch_err, reply_err, Gateway};
use portico_api::actors::{ActorInvocation, ActorRuntime};
use portico_ipc::proto::{
    Empty, ExecuteActorStateTransactionRequest, GetActorStateRequest, GetActorStateResponse,
    InvokeActorRequest, InvokeActorResponse,
};
use portico_resiliency::Target;
use portico_telemetry::invocation_metrics;
use portico_types::error::ActorError;
use portico_types::state::{ActorOperation, ActorTransactionOp};
use std::collections::HashMap;
use std::sync::Arc;
use tonic::Status;

impl Gateway {
    pub(crate) async fn handle_get_actor_state(
        &self,
        request: GetActorStateRequest,
    ) -> Result<GetActorStateResponse, Status> {
        let actors = self.actor_runtime()?;
        let policy = self.ctx.component_policy(&request.actor_type, "actor");
        let target = Target {
            component: &request.actor_type,
            operation: "get_state",
        };
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, true, || {
                let actors = actors.clone();
                let (actor_type, actor_id, key) = (
                    request.actor_type.clone(),
                    request.actor_id.clone(),
                    request.key.clone(),
                );
                async move { actors.get_state(&actor_type, &actor_id, &key).await }
            })
            .await;

        outcome
            .map(|data| GetActorStateResponse {
                data,
                metadata: HashMap::new(),
            })
            .map_err(|err| {
                dispatch_err(err, |err| ActorError::GetStateFailed(err.to_string()))
            })
    }

    pub(crate) async fn handle_execute_actor_state_transaction(
        &self,
        request: ExecuteActorStateTransactionRequest,
    ) -> Result<Empty, Status> {
        let actors = self.actor_runtime()?;
        let mut operations = Vec::with_capacity(request.operations.len());
        for op in &request.operations {
            let operation = match op.operation_type.as_str() {
                "upsert" => ActorOperation::Upsert,
                "delete" => ActorOperation::Delete,
                other => {
                    return Err(reply_err(ActorError::UnsupportedOperation(
                        other.to_string(),
                    )))
                }
            };
            operations.push(ActorTransactionOp {
                operation,
                key: op.key.clone(),
                value: (!op.value.is_empty()).then(|| op.value.clone()),
                metadata: op.metadata.clone(),
            });
        }

        let policy = self.ctx.component_policy(&request.actor_type, "actor");
        let target = Target {
            component: &request.actor_type,
            operation: "state_transaction",
        };
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, false, || {
                let actors = actors.clone();
                let (actor_type, actor_id, operations) = (
                    request.actor_type.clone(),
                    request.actor_id.clone(),
                    operations.clone(),
                );
                async move {
                    actors
                        .execute_state_transaction(&actor_type, &actor_id, operations)
                        .await
                }
            })
            .await;

        outcome.map(|()| Empty {}).map_err(|err| {
            dispatch_err(err, |err| ActorError::TransactionFailed(err.to_string()))
        })
    }

    pub(crate) async fn handle_invoke_actor(
        &self,
        request: InvokeActorRequest,
    ) -> Result<InvokeActorResponse, Status> {
        let actors = self.actor_runtime()?;

        // Phase one, replayable: resolve the owning host under the
        // pre-lock policy.
        let policy = self.ctx.component_policy(&request.actor_type, "actor");
        let target = Target {
            component: &request.actor_type,
            operation: "resolve",
        };
        let resolved = self
            .ctx
            .executor
            .run(&policy, target, true, || {
                let actors = actors.clone();
                let (actor_type, actor_id) =
                    (request.actor_type.clone(), request.actor_id.clone());
                async move { actors.resolve(&actor_type, &actor_id).await }
            })
            .await
            .map_err(|err| {
                dispatch_err(err, |err| ActorError::InvokeFailed(err.to_string()))
            })?;

        // Phase two, at-most-once: the actor call is never replayed.
        let invocation = ActorInvocation {
            actor_type: request.actor_type.clone(),
            actor_id: request.actor_id.clone(),
            method: request.method.clone(),
            data: request.data.clone(),
            metadata: request.metadata.clone(),
        };
        let outcome = actors.invoke(&resolved, invocation).await;
        invocation_metrics().inc_actor(&request.actor_type, outcome.is_ok());

        outcome
            .map(|data| InvokeActorResponse { data })
            .map_err(|err| {
                dispatch_err(err, |err| ActorError::InvokeFailed(err.to_string()))
            })
    }

    fn actor_runtime(&self) -> Result<Arc<dyn ActorRuntime>, Status> {
        self.ctx
            .actors
            .clone()
            .ok_or_else(|| reply_err(ActorError::NotConfigured))
    }
}
