// Path: crates/types/src/configuration.rs
//! Configuration items and subscription update records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single configuration value as returned by a configuration store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationItem {
    /// The configuration value.
    pub value: String,
    /// Store-assigned version of the value.
    pub version: String,
    /// Driver-specific metadata.
    pub metadata: HashMap<String, String>,
}

/// A batch of changed configuration items pushed by a store driver for one
/// live subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationUpdate {
    /// Changed items, keyed by configuration key.
    pub items: HashMap<String, ConfigurationItem>,
}

/// Canonicalizes a subscription key list: sorted and deduplicated, so a
/// subscription's identity does not depend on caller key order.
pub fn canonical_keys(keys: Vec<String>) -> Vec<String> {
    let mut keys = keys;
    keys.sort();
    keys.dedup();
    keys
}

#[cfg(test)]
mod tests {
    use super::canonical_keys;

    #[test]
    fn keys_are_sorted_and_deduped() {
        let keys = canonical_keys(vec!["b".into(), "a".into(), "b".into()]);
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
