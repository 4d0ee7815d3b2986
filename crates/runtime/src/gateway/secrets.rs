// Path: crates/runtime/src/gateway/secrets.rs
//! Secret handlers: single and bulk reads.

use super::{dispatch_err, reply_err, Gateway};
use crate::registry::{LookupMiss, SecretStoreEntry};
use portico_api::secrets::SecretRequest;
use portico_ipc::proto::{
    GetBulkSecretRequest, GetBulkSecretResponse, GetSecretRequest, GetSecretResponse,
    SecretResponse,
};
use portico_resiliency::Target;
use portico_types::error::SecretError;
use portico_types::metadata::normalize_driver_metadata;
use tonic::Status;

impl Gateway {
    pub(crate) async fn handle_get_secret(
        &self,
        request: GetSecretRequest,
    ) -> Result<GetSecretResponse, Status> {
        let entry = self.resolve_secret_store(&request.store_name)?;
        if !secret_allowed(&entry, &request.key) {
            return Err(reply_err(SecretError::Forbidden {
                store: request.store_name.clone(),
                key: request.key.clone(),
            }));
        }

        let driver_metadata = normalize_driver_metadata(&request.metadata);
        let policy = self
            .ctx
            .component_policy(&request.store_name, "secret-store");
        let target = Target {
            component: &request.store_name,
            operation: "get_secret",
        };

        let outcome = self
            .ctx
            .executor
            .run(&policy, target, true, || {
                let driver_request = SecretRequest {
                    key: request.key.clone(),
                    metadata: driver_metadata.clone(),
                };
                let store = entry.store.clone();
                async move { store.get_secret(driver_request).await }
            })
            .await;

        outcome
            .map(|data| GetSecretResponse { data })
            .map_err(|err| {
                dispatch_err(err, |err| SecretError::GetFailed {
                    store: request.store_name.clone(),
                    key: request.key.clone(),
                    message: err.to_string(),
                })
            })
    }

    pub(crate) async fn handle_get_bulk_secret(
        &self,
        request: GetBulkSecretRequest,
    ) -> Result<GetBulkSecretResponse, Status> {
        let entry = self.resolve_secret_store(&request.store_name)?;

        let driver_metadata = normalize_driver_metadata(&request.metadata);
        let policy = self
            .ctx
            .component_policy(&request.store_name, "secret-store");
        let target = Target {
            component: &request.store_name,
            operation: "bulk_get_secret",
        };

        let outcome = self
            .ctx
            .executor
            .run(&policy, target, true, || {
                let metadata = driver_metadata.clone();
                let store = entry.store.clone();
                async move { store.bulk_get_secret(metadata).await }
            })
            .await;

        // Scope filtering applies on the bulk path too: undisclosed
        // secrets are silently omitted rather than failing the call.
        outcome
            .map(|all| GetBulkSecretResponse {
                data: all
                    .into_iter()
                    .filter(|(name, _)| secret_allowed(&entry, name))
                    .map(|(name, secrets)| (name, SecretResponse { secrets }))
                    .collect(),
            })
            .map_err(|err| {
                dispatch_err(err, |err| SecretError::GetFailed {
                    store: request.store_name.clone(),
                    key: "<bulk>".to_string(),
                    message: err.to_string(),
                })
            })
    }

    fn resolve_secret_store(&self, store_name: &str) -> Result<SecretStoreEntry, Status> {
        self.ctx.registry.secret_store(store_name).map_err(|miss| {
            reply_err(match miss {
                LookupMiss::NotConfigured => SecretError::NotConfigured,
                LookupMiss::NotFound => SecretError::NotFound(store_name.to_string()),
            })
        })
    }
}

fn secret_allowed(entry: &SecretStoreEntry, key: &str) -> bool {
    match &entry.allowed_secrets {
        Some(allowed) => allowed.iter().any(|name| name == key),
        None => true,
    }
}
