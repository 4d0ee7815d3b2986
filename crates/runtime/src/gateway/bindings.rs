// Path: crates/runtime/src/gateway/bindings.rs
//! Output binding invocation.

use super::{dispatch_err, reply_err, Gateway};
use crate::propagation;
use crate::registry::LookupMiss;
use portico_api::bindings::BindingInvocation;
use portico_ipc::proto::{InvokeBindingRequest, InvokeBindingResponse};
use portico_resiliency::Target;
use portico_telemetry::invocation_metrics;
use portico_types::error::BindingError;
use portico_types::metadata::{is_idempotent, normalize_driver_metadata};
use tonic::Status;

impl Gateway {
    pub(crate) async fn handle_invoke_binding(
        &self,
        request: InvokeBindingRequest,
    ) -> Result<InvokeBindingResponse, Status> {
        let binding = self.ctx.registry.binding(&request.name).map_err(|miss| {
            reply_err(match miss {
                // A binding miss has a single taxonomy mapping either way;
                // the distinction lives in the message.
                LookupMiss::NotConfigured | LookupMiss::NotFound => {
                    BindingError::NotFound(request.name.clone())
                }
            })
        })?;

        let trace = propagation::extract(&request.metadata).map_err(reply_err)?;
        // Reserved transport headers are remapped so the driver observes a
        // non-colliding namespace; the caller's trace context rides along.
        let mut driver_metadata = normalize_driver_metadata(&request.metadata);
        propagation::inject(&trace, &mut driver_metadata);

        let policy = self.ctx.component_policy(&request.name, "binding-output");
        let target = Target {
            component: &request.name,
            operation: "invoke",
        };
        let replayable = is_idempotent(&request.metadata);

        let outcome = self
            .ctx
            .executor
            .run(&policy, target, replayable, || {
                let driver_request = BindingInvocation {
                    operation: request.operation.clone(),
                    data: request.data.clone(),
                    metadata: driver_metadata.clone(),
                };
                let binding = binding.clone();
                async move { binding.invoke(driver_request).await }
            })
            .await;
        invocation_metrics().inc_binding(&request.name, &request.operation, outcome.is_ok());

        outcome
            .map(|result| InvokeBindingResponse {
                data: result.data,
                metadata: result.metadata,
            })
            .map_err(|err| {
                dispatch_err(err, |err| BindingError::InvokeFailed {
                    name: request.name.clone(),
                    message: err.to_string(),
                })
            })
    }
}
