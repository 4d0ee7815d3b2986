// Path: crates/runtime/src/gateway/invoke.rs
//! Legacy direct service invocation.

use super::{dispatch_err, reply_err, Gateway};
use crate::propagation;
use portico_api::invocation::InvocationRequest;
use portico_ipc::proto::{InvokeResponse, InvokeServiceRequest};
use portico_resiliency::Target;
use portico_telemetry::invocation_metrics;
use portico_telemetry::time::ScopeTimer;
use portico_types::error::InvocationError;
use portico_types::metadata::normalize_driver_metadata;
use tonic::Status;

/// Response metadata key carrying the upstream HTTP status when the remote
/// application answered over a different transport than the caller's.
pub const HTTP_STATUS_METADATA_KEY: &str = "portico-http-status";

impl Gateway {
    pub(crate) async fn handle_invoke_service(
        &self,
        request: InvokeServiceRequest,
    ) -> Result<InvokeResponse, Status> {
        let Some(invoker) = self.ctx.invoker.clone() else {
            return Err(reply_err(InvocationError::NotConfigured));
        };
        if request.id.is_empty() {
            return Err(reply_err(InvocationError::AppIdEmpty));
        }
        let Some(message) = request.message else {
            return Err(reply_err(InvocationError::InvokeFailed {
                id: request.id.clone(),
                message: "missing invocation message".to_string(),
            }));
        };

        let trace = propagation::extract(&message.metadata).map_err(reply_err)?;
        let mut metadata = normalize_driver_metadata(&message.metadata);
        propagation::inject(&trace, &mut metadata);

        // Endpoint policies support replay on this path: the remote app
        // contract treats re-delivery of an invocation as acceptable when a
        // policy with retries is configured for the endpoint.
        let policy = self.ctx.endpoint_policy(&request.id, &message.method);
        let target = Target {
            component: &request.id,
            operation: &message.method,
        };

        let _timer = ScopeTimer::new(|secs| {
            invocation_metrics().observe_service_latency(&request.id, secs)
        });
        let outcome = self
            .ctx
            .executor
            .run(&policy, target, true, || {
                let driver_request = InvocationRequest {
                    target_app_id: request.id.clone(),
                    method: message.method.clone(),
                    data: message.data.clone(),
                    content_type: message.content_type.clone(),
                    metadata: metadata.clone(),
                };
                let invoker = invoker.clone();
                async move { invoker.invoke(driver_request).await }
            })
            .await;
        invocation_metrics().inc_service(&request.id, outcome.is_ok());

        let response = outcome.map_err(|err| {
            dispatch_err(err, |err| InvocationError::InvokeFailed {
                id: request.id.clone(),
                message: err.to_string(),
            })
        })?;

        // Headers and trailers are copied back verbatim. When the upstream
        // answered over HTTP, its status code is recorded under the
        // auxiliary key; it is preserved on every reply, same-transport
        // callers included, so the response shape does not depend on who
        // is asking.
        let mut response_metadata = response.headers;
        response_metadata.extend(response.trailers);
        if let Some(status) = response.http_status {
            response_metadata.insert(HTTP_STATUS_METADATA_KEY.to_string(), status.to_string());
        }

        Ok(InvokeResponse {
            data: response.data,
            content_type: response.content_type,
            metadata: response_metadata,
        })
    }
}
