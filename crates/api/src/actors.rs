// Path: crates/api/src/actors.rs
//! Collaborator contract for the actor subsystem.
//!
//! The request plane does not place actors or hold actor locks; it
//! validates and delegates. The contract is split so resiliency can wrap
//! the two phases differently: host resolution is replayable, the actor
//! call itself is at-most-once relative to the resolved target.

use async_trait::async_trait;
use bytes::Bytes;
use portico_types::error::DriverError;
use portico_types::state::ActorTransactionOp;
use std::collections::HashMap;

/// A resolved actor placement. Opaque to the gateway beyond equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorTarget {
    /// The address of the host currently owning the actor.
    pub address: String,
}

/// An actor method invocation, addressed to a resolved target.
#[derive(Debug, Clone)]
pub struct ActorInvocation {
    /// Actor type.
    pub actor_type: String,
    /// Actor id.
    pub actor_id: String,
    /// Method to invoke.
    pub method: String,
    /// Request payload.
    pub data: Bytes,
    /// Invocation metadata.
    pub metadata: HashMap<String, String>,
}

/// The actor runtime collaborator.
#[async_trait]
pub trait ActorRuntime: Send + Sync {
    /// Resolves the host currently owning `(actor_type, actor_id)`.
    ///
    /// This is the replayable phase: the gateway retries resolution under
    /// the pre-lock resiliency policy.
    async fn resolve(&self, actor_type: &str, actor_id: &str)
        -> Result<ActorTarget, DriverError>;

    /// Invokes a method on the actor at a previously resolved target.
    ///
    /// Never retried by the gateway; the actor's own call must stay
    /// at-most-once relative to the target.
    async fn invoke(
        &self,
        target: &ActorTarget,
        invocation: ActorInvocation,
    ) -> Result<Bytes, DriverError>;

    /// Reads one key of the actor's state.
    async fn get_state(
        &self,
        actor_type: &str,
        actor_id: &str,
        key: &str,
    ) -> Result<Bytes, DriverError>;

    /// Applies a batch of actor state operations atomically.
    async fn execute_state_transaction(
        &self,
        actor_type: &str,
        actor_id: &str,
        operations: Vec<ActorTransactionOp>,
    ) -> Result<(), DriverError>;
}
