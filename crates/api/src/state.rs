// Path: crates/api/src/state.rs
//! Driver contract for keyed state stores.
//!
//! All keys in this module are *physical* keys: the gateway's key rewriter
//! has already applied the store's prefixing strategy before a request
//! reaches a driver, and responses are projected back before they surface.

use async_trait::async_trait;
use bytes::Bytes;
use portico_types::error::DriverError;
use portico_types::state::{Consistency, StateOptions, TransactionOp};
use std::collections::HashMap;

/// A read of a single key.
#[derive(Debug, Clone, Default)]
pub struct GetRequest {
    /// Physical key.
    pub key: String,
    /// Requested consistency level.
    pub consistency: Consistency,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// A stored record as returned by a driver.
#[derive(Debug, Clone, Default)]
pub struct StateRecord {
    /// Value bytes (possibly ciphertext for encrypted stores).
    pub data: Bytes,
    /// The record's current etag, if the store versions records.
    pub etag: Option<String>,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// One entry of a bulk read response.
#[derive(Debug, Clone, Default)]
pub struct BulkGetEntry {
    /// Physical key this entry answers.
    pub key: String,
    /// Value bytes; empty when the key was missing or errored.
    pub data: Bytes,
    /// The record's etag, when present.
    pub etag: Option<String>,
    /// Per-entry failure; the bulk call itself still succeeds.
    pub error: Option<String>,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// A write of a single record.
#[derive(Debug, Clone, Default)]
pub struct SetRequest {
    /// Physical key.
    pub key: String,
    /// Value bytes.
    pub value: Bytes,
    /// Etag precondition; when present the driver must treat the write as
    /// a compare-and-swap.
    pub etag: Option<String>,
    /// Concurrency and consistency options.
    pub options: StateOptions,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// A delete of a single key.
#[derive(Debug, Clone, Default)]
pub struct DeleteRequest {
    /// Physical key.
    pub key: String,
    /// Etag precondition.
    pub etag: Option<String>,
    /// Concurrency and consistency options.
    pub options: StateOptions,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// An ordered list of operations to apply atomically.
#[derive(Debug, Clone, Default)]
pub struct TransactionRequest {
    /// Operations with physical keys, in caller order.
    pub operations: Vec<TransactionOp>,
    /// Request-level metadata.
    pub metadata: HashMap<String, String>,
}

/// A keyed state store driver.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Reads one key. `Ok(None)` means the key does not exist.
    async fn get(&self, request: GetRequest) -> Result<Option<StateRecord>, DriverError>;

    /// Reads many keys. The default implementation fans out single reads;
    /// stores with a native batch path should override it and advertise
    /// `bulk_get` in their capabilities.
    async fn bulk_get(&self, requests: Vec<GetRequest>) -> Result<Vec<BulkGetEntry>, DriverError> {
        let mut entries = Vec::with_capacity(requests.len());
        for request in requests {
            let key = request.key.clone();
            match self.get(request).await {
                Ok(Some(record)) => entries.push(BulkGetEntry {
                    key,
                    data: record.data,
                    etag: record.etag,
                    error: None,
                    metadata: record.metadata,
                }),
                Ok(None) => entries.push(BulkGetEntry {
                    key,
                    ..BulkGetEntry::default()
                }),
                Err(err) => entries.push(BulkGetEntry {
                    key,
                    error: Some(err.to_string()),
                    ..BulkGetEntry::default()
                }),
            }
        }
        Ok(entries)
    }

    /// Writes one record.
    async fn set(&self, request: SetRequest) -> Result<(), DriverError>;

    /// Writes many records. Not atomic; per-record failure aborts the loop
    /// in the default implementation.
    async fn bulk_set(&self, requests: Vec<SetRequest>) -> Result<(), DriverError> {
        for request in requests {
            self.set(request).await?;
        }
        Ok(())
    }

    /// Deletes one key.
    async fn delete(&self, request: DeleteRequest) -> Result<(), DriverError>;

    /// Deletes many keys. Not atomic.
    async fn bulk_delete(&self, requests: Vec<DeleteRequest>) -> Result<(), DriverError> {
        for request in requests {
            self.delete(request).await?;
        }
        Ok(())
    }

    /// Applies a transaction atomically. Only stores advertising the
    /// `transactional` capability implement this; the default refuses.
    async fn multi(&self, request: TransactionRequest) -> Result<(), DriverError> {
        let _ = request;
        Err(DriverError::Unsupported(
            "state store does not support transactions".to_string(),
        ))
    }
}
