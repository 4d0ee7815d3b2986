// Path: crates/types/src/lib.rs
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

//! # Portico Core Types
//!
//! The shared data model for the Portico request plane: the standard event
//! envelope, state items and transactional operations, configuration items,
//! request-metadata conventions, and the error taxonomy used by every
//! building block.
//!
//! This crate is dependency-light on purpose. Anything that talks to a
//! driver, a socket, or a clock lives above it.

/// Configuration items and subscription identifiers.
pub mod configuration;
/// The standard event envelope and its builder.
pub mod envelope;
/// The stable error taxonomy shared by all building blocks.
pub mod error;
/// Request-metadata conventions: reserved headers, raw-payload, idempotency.
pub mod metadata;
/// State items, options, and transactional operations.
pub mod state;

pub use error::{ErrorCode, ErrorKind};
