// Path: crates/types/src/state.rs
//! State items and transactional operations.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Concurrency control requested for a state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Concurrency {
    /// The store may apply whichever discipline it defaults to.
    #[default]
    Unspecified,
    /// First writer wins; subsequent conflicting writes fail.
    FirstWrite,
    /// Last writer wins; conflicting writes overwrite.
    LastWrite,
}

/// Consistency level requested for a state operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Consistency {
    /// The store may apply whichever level it defaults to.
    #[default]
    Unspecified,
    /// Reads observe the latest acknowledged write.
    Strong,
    /// Reads may observe stale values.
    Eventual,
}

/// Per-operation state options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateOptions {
    /// Concurrency discipline for writes.
    pub concurrency: Concurrency,
    /// Consistency level for reads and writes.
    pub consistency: Consistency,
}

/// A single keyed state record as submitted by, or returned to, a caller.
///
/// The `key` is always the caller's logical key. Key rewriting happens at
/// the gateway boundary and is never visible in this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateItem {
    /// Logical key.
    pub key: String,
    /// Opaque value bytes.
    pub value: Bytes,
    /// Optimistic-concurrency token. When present, the store must treat it
    /// as a compare-and-swap precondition.
    pub etag: Option<String>,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
    /// Concurrency and consistency options.
    pub options: StateOptions,
}

/// One operation inside a state transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionOp {
    /// Insert or overwrite a record.
    Upsert(StateItem),
    /// Delete a record, optionally under an etag precondition.
    Delete {
        /// Logical key to delete.
        key: String,
        /// Optional etag precondition.
        etag: Option<String>,
        /// Concurrency and consistency options.
        options: StateOptions,
    },
}

impl TransactionOp {
    /// The logical key this operation touches.
    pub fn key(&self) -> &str {
        match self {
            Self::Upsert(item) => &item.key,
            Self::Delete { key, .. } => key,
        }
    }

    /// Returns a copy of this operation with its key replaced.
    pub fn with_key(self, key: String) -> Self {
        match self {
            Self::Upsert(mut item) => {
                item.key = key;
                Self::Upsert(item)
            }
            Self::Delete { etag, options, .. } => Self::Delete { key, etag, options },
        }
    }
}

/// The kind of an actor state operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorOperation {
    /// Insert or overwrite the keyed value.
    Upsert,
    /// Remove the keyed value.
    Delete,
}

/// One operation inside an actor state transaction.
///
/// Actor transactions additionally carry the `(actor type, actor id)` pair
/// at the request level and route through the actor collaborator rather
/// than a state store directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorTransactionOp {
    /// Whether this is an upsert or a delete.
    pub operation: ActorOperation,
    /// The actor-scoped key.
    pub key: String,
    /// The value for upserts; ignored for deletes.
    pub value: Option<Bytes>,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}
