// Path: crates/runtime/src/keys.rs
//! App-scoped rewriting of logical state keys.
//!
//! Rewriting is pure: no I/O, no clock. Physical keys exist only between
//! the gateway and a driver; every response is projected back to logical
//! keys before it surfaces.

use portico_types::error::StateError;

/// Separator between the scope prefix and the logical key.
pub const KEY_SEPARATOR: &str = "||";

/// The prefixing strategy a state store declares at registration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyPrefixStrategy {
    /// Scope keys by the calling application id (the default).
    #[default]
    AppId,
    /// Scope keys by the store's own name.
    StoreName,
    /// A fixed prefix.
    Constant(String),
    /// No scoping; logical and physical keys coincide.
    None,
}

/// Rewrites a logical key into the physical key the driver observes.
///
/// An empty logical key is a caller error and is rejected before any
/// dispatch.
pub fn rewrite(
    strategy: &KeyPrefixStrategy,
    logical: &str,
    store_name: &str,
    app_id: &str,
) -> Result<String, StateError> {
    if logical.is_empty() {
        return Err(StateError::KeyEmpty);
    }
    Ok(match strategy {
        KeyPrefixStrategy::AppId => format!("{app_id}{KEY_SEPARATOR}{logical}"),
        KeyPrefixStrategy::StoreName => format!("{store_name}{KEY_SEPARATOR}{logical}"),
        KeyPrefixStrategy::Constant(prefix) => format!("{prefix}{KEY_SEPARATOR}{logical}"),
        KeyPrefixStrategy::None => logical.to_string(),
    })
}

/// Projects a physical key back to the logical key the caller submitted.
///
/// The inverse of [`rewrite`] under the same strategy. Only strategies
/// that actually added a prefix strip one; under
/// [`KeyPrefixStrategy::None`] the key passes through untouched, so a
/// logical key that happens to contain the separator is never truncated.
pub fn reverse<'a>(strategy: &KeyPrefixStrategy, physical: &'a str) -> &'a str {
    match strategy {
        KeyPrefixStrategy::None => physical,
        _ => match physical.split_once(KEY_SEPARATOR) {
            Some((_, logical)) => logical,
            None => physical,
        },
    }
}
