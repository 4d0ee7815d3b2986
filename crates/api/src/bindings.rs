// Path: crates/api/src/bindings.rs
//! Driver contract for output bindings.

use async_trait::async_trait;
use bytes::Bytes;
use portico_types::error::DriverError;
use std::collections::HashMap;

/// An invocation of an output binding.
#[derive(Debug, Clone, Default)]
pub struct BindingInvocation {
    /// The driver-defined operation name (`create`, `get`, ...).
    pub operation: String,
    /// The payload.
    pub data: Bytes,
    /// Normalized metadata: reserved transport headers arrive prefixed.
    pub metadata: HashMap<String, String>,
}

/// The driver's answer to a binding invocation.
#[derive(Debug, Clone, Default)]
pub struct BindingResult {
    /// Response payload, possibly empty.
    pub data: Bytes,
    /// Response metadata.
    pub metadata: HashMap<String, String>,
}

/// An output binding driver.
#[async_trait]
pub trait OutputBinding: Send + Sync {
    /// Invokes the binding.
    async fn invoke(&self, request: BindingInvocation) -> Result<BindingResult, DriverError>;

    /// The operations this binding supports, for diagnostics.
    fn operations(&self) -> Vec<String> {
        Vec::new()
    }
}
