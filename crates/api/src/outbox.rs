// Path: crates/api/src/outbox.rs
//! Collaborator contract for the transactional outbox.

use async_trait::async_trait;
use portico_types::error::DriverError;
use portico_types::state::TransactionOp;

/// The outbox collaborator.
///
/// When enabled for a store, the gateway hands it the caller's operation
/// list before dispatch; the outbox appends the implicit event-publishing
/// operations and the *rewritten* list becomes the atomic unit the store
/// commits.
#[async_trait]
pub trait Outbox: Send + Sync {
    /// Whether the outbox is configured for the named store.
    fn enabled(&self, store_name: &str) -> bool;

    /// Rewrites the operation list, appending implicit operations.
    /// Operation keys are logical at this point; rewriting happens before
    /// the gateway applies key prefixing.
    async fn rewrite(
        &self,
        store_name: &str,
        operations: Vec<TransactionOp>,
    ) -> Result<Vec<TransactionOp>, DriverError>;
}
