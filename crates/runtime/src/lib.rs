// Path: crates/runtime/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Portico Runtime
//!
//! The request-plane gateway: the layer that accepts typed requests from an
//! application, validates them, enforces resiliency policies, encrypts
//! state at rest, propagates distributed-tracing context, routes each call
//! to the correct pluggable component, converts component failures into the
//! stable error taxonomy, and streams long-lived results back.
//!
//! The gateway holds no per-request shared state. Process-wide state (the
//! component registry, the subscription table, the deprecation flags) is
//! owned by an explicit [`gateway::Gateway`] value constructed from a
//! [`gateway::RuntimeOptions`] record; there are no hidden singletons.

/// One-time deprecation warnings with CAS flags.
pub mod deprecation;
/// Envelope encryption for state at rest.
pub mod encryption;
/// The typed service surface implementation.
pub mod gateway;
/// App-scoped state key rewriting.
pub mod keys;
/// Startup, draining, and shutdown.
pub mod lifecycle;
/// W3C trace context and baggage propagation.
pub mod propagation;
/// The process-wide component registry.
pub mod registry;
/// The streaming subscription table and forwarder tasks.
pub mod subscriptions;

pub use gateway::{Gateway, RuntimeOptions};
pub use registry::ComponentRegistry;
