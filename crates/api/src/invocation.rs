// Path: crates/api/src/invocation.rs
//! Collaborator contract for legacy direct service invocation.

use async_trait::async_trait;
use bytes::Bytes;
use portico_types::error::DriverError;
use std::collections::HashMap;

/// A direct invocation of a remote application.
#[derive(Debug, Clone, Default)]
pub struct InvocationRequest {
    /// The target application id.
    pub target_app_id: String,
    /// The method (or route) to invoke.
    pub method: String,
    /// Request payload.
    pub data: Bytes,
    /// Content type of `data`.
    pub content_type: String,
    /// Request metadata, including propagated trace context.
    pub metadata: HashMap<String, String>,
}

/// The upstream application's answer.
#[derive(Debug, Clone, Default)]
pub struct InvocationResponse {
    /// Response payload.
    pub data: Bytes,
    /// Content type of `data`.
    pub content_type: String,
    /// Response headers to copy back to the caller.
    pub headers: HashMap<String, String>,
    /// Response trailers to copy back to the caller.
    pub trailers: HashMap<String, String>,
    /// Set when the upstream answered over HTTP rather than the caller's
    /// transport; the gateway records it in response metadata.
    pub http_status: Option<u16>,
}

/// The direct invocation transport collaborator.
#[async_trait]
pub trait DirectInvoker: Send + Sync {
    /// Invokes a method on a remote application and returns its response.
    async fn invoke(&self, request: InvocationRequest)
        -> Result<InvocationResponse, DriverError>;
}
