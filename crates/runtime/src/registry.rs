// Path: crates/runtime/src/registry.rs
//! The process-wide component registry.
//!
//! Maps `(kind, name)` to a live driver handle plus its capability set and
//! per-store configuration. Reads vastly outnumber writes (registration
//! happens at startup, lookups on every request), so each kind gets its own
//! `RwLock`-guarded map and lookups clone `Arc` handles out.

use crate::encryption::StateEncryption;
use crate::keys::KeyPrefixStrategy;
use parking_lot::RwLock;
use portico_api::bindings::OutputBinding;
use portico_api::capabilities::ComponentCapabilities;
use portico_api::configuration::ConfigurationStore;
use portico_api::pubsub::PubSub;
use portico_api::secrets::SecretStore;
use portico_api::state::StateStore;
use std::collections::HashMap;
use std::sync::Arc;

/// The component kinds the registry knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Publish/subscribe brokers.
    PubSub,
    /// Keyed state stores.
    StateStore,
    /// Configuration stores.
    ConfigurationStore,
    /// Output bindings.
    OutputBinding,
    /// Secret stores.
    SecretStore,
}

impl ComponentKind {
    /// The lowercase label used in policy resolution, logs, and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PubSub => "pubsub",
            Self::StateStore => "state-store",
            Self::ConfigurationStore => "configuration-store",
            Self::OutputBinding => "binding-output",
            Self::SecretStore => "secret-store",
        }
    }
}

/// Why a lookup failed: the kind has no registrations at all, or the name
/// is absent among existing registrations. The two map to different
/// taxonomy kinds at the gateway boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMiss {
    /// Zero components of the kind are registered.
    NotConfigured,
    /// Other components of the kind exist, but not this name.
    NotFound,
}

/// A registered pub/sub component.
#[derive(Clone)]
pub struct PubSubEntry {
    /// The driver handle.
    pub component: Arc<dyn PubSub>,
    /// Advertised capabilities.
    pub capabilities: ComponentCapabilities,
}

impl std::fmt::Debug for PubSubEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSubEntry")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// A registered state store with its per-store configuration.
#[derive(Clone)]
pub struct StateStoreEntry {
    /// The driver handle.
    pub store: Arc<dyn StateStore>,
    /// Advertised capabilities.
    pub capabilities: ComponentCapabilities,
    /// The key prefixing strategy the store declared.
    pub prefix: KeyPrefixStrategy,
    /// Envelope encryption, when opted in for this store.
    pub encryption: Option<Arc<StateEncryption>>,
}

/// A registered secret store with its access scope.
#[derive(Clone)]
pub struct SecretStoreEntry {
    /// The driver handle.
    pub store: Arc<dyn SecretStore>,
    /// When set, only these secret names may be read through the gateway.
    pub allowed_secrets: Option<Vec<String>>,
}

/// The process-wide registry of live components.
#[derive(Default)]
pub struct ComponentRegistry {
    pubsubs: RwLock<HashMap<String, PubSubEntry>>,
    state_stores: RwLock<HashMap<String, StateStoreEntry>>,
    configuration_stores: RwLock<HashMap<String, Arc<dyn ConfigurationStore>>>,
    bindings: RwLock<HashMap<String, Arc<dyn OutputBinding>>>,
    secret_stores: RwLock<HashMap<String, SecretStoreEntry>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a pub/sub component.
    pub fn register_pubsub(
        &self,
        name: &str,
        component: Arc<dyn PubSub>,
        capabilities: ComponentCapabilities,
    ) {
        self.pubsubs.write().insert(
            name.to_string(),
            PubSubEntry {
                component,
                capabilities,
            },
        );
        tracing::info!(name, kind = ComponentKind::PubSub.as_str(), "component registered");
    }

    /// Registers (or replaces) a state store.
    pub fn register_state_store(&self, name: &str, entry: StateStoreEntry) {
        self.state_stores.write().insert(name.to_string(), entry);
        tracing::info!(
            name,
            kind = ComponentKind::StateStore.as_str(),
            "component registered"
        );
    }

    /// Registers (or replaces) a configuration store.
    pub fn register_configuration_store(&self, name: &str, store: Arc<dyn ConfigurationStore>) {
        self.configuration_stores
            .write()
            .insert(name.to_string(), store);
        tracing::info!(
            name,
            kind = ComponentKind::ConfigurationStore.as_str(),
            "component registered"
        );
    }

    /// Registers (or replaces) an output binding.
    pub fn register_binding(&self, name: &str, binding: Arc<dyn OutputBinding>) {
        self.bindings.write().insert(name.to_string(), binding);
        tracing::info!(
            name,
            kind = ComponentKind::OutputBinding.as_str(),
            "component registered"
        );
    }

    /// Registers (or replaces) a secret store.
    pub fn register_secret_store(&self, name: &str, entry: SecretStoreEntry) {
        self.secret_stores.write().insert(name.to_string(), entry);
        tracing::info!(
            name,
            kind = ComponentKind::SecretStore.as_str(),
            "component registered"
        );
    }

    /// Removes a component registration.
    pub fn deregister(&self, kind: ComponentKind, name: &str) -> bool {
        let removed = match kind {
            ComponentKind::PubSub => self.pubsubs.write().remove(name).is_some(),
            ComponentKind::StateStore => self.state_stores.write().remove(name).is_some(),
            ComponentKind::ConfigurationStore => {
                self.configuration_stores.write().remove(name).is_some()
            }
            ComponentKind::OutputBinding => self.bindings.write().remove(name).is_some(),
            ComponentKind::SecretStore => self.secret_stores.write().remove(name).is_some(),
        };
        if removed {
            tracing::info!(name, kind = kind.as_str(), "component deregistered");
        }
        removed
    }

    /// Looks up a pub/sub component.
    pub fn pubsub(&self, name: &str) -> Result<PubSubEntry, LookupMiss> {
        let map = self.pubsubs.read();
        lookup(&map, name)
    }

    /// Looks up a state store.
    pub fn state_store(&self, name: &str) -> Result<StateStoreEntry, LookupMiss> {
        let map = self.state_stores.read();
        lookup(&map, name)
    }

    /// Looks up a configuration store.
    pub fn configuration_store(&self, name: &str) -> Result<Arc<dyn ConfigurationStore>, LookupMiss> {
        let map = self.configuration_stores.read();
        lookup(&map, name)
    }

    /// Looks up an output binding.
    pub fn binding(&self, name: &str) -> Result<Arc<dyn OutputBinding>, LookupMiss> {
        let map = self.bindings.read();
        lookup(&map, name)
    }

    /// Looks up a secret store.
    pub fn secret_store(&self, name: &str) -> Result<SecretStoreEntry, LookupMiss> {
        let map = self.secret_stores.read();
        lookup(&map, name)
    }
}

fn lookup<T: Clone>(map: &HashMap<String, T>, name: &str) -> Result<T, LookupMiss> {
    if map.is_empty() {
        return Err(LookupMiss::NotConfigured);
    }
    map.get(name).cloned().ok_or(LookupMiss::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portico_api::pubsub::PublishRequest;
    use portico_types::error::DriverError;

    #[derive(Debug)]
    struct NullPubSub;

    #[async_trait]
    impl PubSub for NullPubSub {
        async fn publish(&self, _request: PublishRequest) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[test]
    fn empty_kind_is_not_configured() {
        let registry = ComponentRegistry::new();
        assert_eq!(registry.pubsub("ps1").unwrap_err(), LookupMiss::NotConfigured);
    }

    #[test]
    fn missing_name_among_existing_is_not_found() {
        let registry = ComponentRegistry::new();
        registry.register_pubsub("ps1", Arc::new(NullPubSub), ComponentCapabilities::NONE);
        assert_eq!(registry.pubsub("other").unwrap_err(), LookupMiss::NotFound);
        assert!(registry.pubsub("ps1").is_ok());
    }

    #[test]
    fn deregister_removes_the_entry() {
        let registry = ComponentRegistry::new();
        registry.register_pubsub("ps1", Arc::new(NullPubSub), ComponentCapabilities::NONE);
        assert!(registry.deregister(ComponentKind::PubSub, "ps1"));
        assert!(!registry.deregister(ComponentKind::PubSub, "ps1"));
        assert_eq!(registry.pubsub("ps1").unwrap_err(), LookupMiss::NotConfigured);
    }
}
