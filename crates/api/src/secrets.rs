// Path: crates/api/src/secrets.rs
//! Driver contract for secret stores.

use async_trait::async_trait;
use portico_types::error::DriverError;
use std::collections::HashMap;

/// A read of a single named secret.
#[derive(Debug, Clone, Default)]
pub struct SecretRequest {
    /// The secret name.
    pub key: String,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// A secret store driver.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Reads one secret. A secret may carry multiple named values.
    async fn get_secret(
        &self,
        request: SecretRequest,
    ) -> Result<HashMap<String, String>, DriverError>;

    /// Reads every secret the store exposes, keyed by secret name.
    async fn bulk_get_secret(
        &self,
        metadata: HashMap<String, String>,
    ) -> Result<HashMap<String, HashMap<String, String>>, DriverError>;
}
