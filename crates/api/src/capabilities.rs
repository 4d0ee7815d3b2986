// Path: crates/api/src/capabilities.rs
//! Capability flags a component advertises at registration time.
//!
//! The registry stores these alongside the driver handle; the gateway
//! consults them before dispatch. A component that is present but lacks a
//! required capability fails the call with `NotSupported` rather than
//! reaching the driver.

/// The capability set for one registered component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentCapabilities {
    /// The store supports atomic multi-operation transactions.
    pub transactional: bool,
    /// The store has a native bulk-get path (otherwise the gateway fans
    /// out single gets through the driver's default implementation).
    pub bulk_get: bool,
    /// Upper bound on operations per transaction, when the store declares
    /// one. `None` means unbounded.
    pub multi_max_size: Option<usize>,
    /// The broker accepts raw payloads (publishing without an envelope).
    pub raw_payload: bool,
}

impl ComponentCapabilities {
    /// Capabilities of a plain component with no optional features.
    pub const NONE: Self = Self {
        transactional: false,
        bulk_get: false,
        multi_max_size: None,
        raw_payload: false,
    };
}
