// Path: crates/api/src/lib.rs
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

//! # Portico Component API
//!
//! Trait contracts for everything the request plane can route a call to:
//! the five pluggable component kinds (state store, pub/sub, output
//! binding, configuration store, secret store) and the collaborators the
//! gateway delegates to (actor runtime, direct invoker, outbox).
//!
//! This crate contains no implementations. Drivers live in their own
//! crates and are registered with the runtime's component registry; the
//! gateway only ever sees `Arc<dyn Trait>` handles from here.

/// Actor runtime collaborator traits.
pub mod actors;
/// Output binding driver traits.
pub mod bindings;
/// Component capability flags advertised to the registry.
pub mod capabilities;
/// Configuration store driver traits.
pub mod configuration;
/// Direct service invocation collaborator traits.
pub mod invocation;
/// Outbox collaborator trait for transactional event publishing.
pub mod outbox;
/// Pub/sub driver traits.
pub mod pubsub;
/// Secret store driver traits.
pub mod secrets;
/// State store driver traits.
pub mod state;

pub use capabilities::ComponentCapabilities;
