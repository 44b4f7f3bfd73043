//! Named provider table used to wire configured databases.

use crate::error::ConfigError;
use gamedb_core::Provider;
use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of provider instances addressable by name.
///
/// Configuration refers to providers by name; hosts register the concrete
/// instances here before calling
/// [`GameDatabase::from_config`](crate::GameDatabase::from_config). Several
/// categories may share one registered instance.
///
/// ```
/// use gamedb_database::ProviderRegistry;
/// use gamedb_providers::MemoryProvider;
/// use std::sync::Arc;
///
/// let mut providers = ProviderRegistry::new();
/// providers.register_provider("memory", Arc::new(MemoryProvider::new("memory")));
///
/// assert!(providers.has_provider("memory"));
/// assert_eq!(providers.provider_names(), ["memory"]);
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    // Insertion order is kept so diagnostics list providers as registered.
    providers: IndexMap<String, Arc<dyn Provider>>,
}

impl core::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_names())
            .finish()
    }
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: IndexMap::new(),
        }
    }

    /// Registers a provider under `name`.
    ///
    /// # Panics
    ///
    /// Panics if a provider with the same name is already registered.
    pub fn register_provider<P: Provider>(&mut self, name: impl Into<String>, provider: Arc<P>) {
        self.register_shared(name, provider as Arc<dyn Provider>);
    }

    /// Registers an already type-erased provider under `name`.
    ///
    /// # Panics
    ///
    /// Panics if a provider with the same name is already registered.
    pub fn register_shared(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        let name = name.into();
        assert!(
            !self.providers.contains_key(&name),
            "provider '{name}' is already registered"
        );
        self.providers.insert(name, provider);
    }

    /// Returns a provider by name.
    #[must_use]
    pub fn get_provider(&self, name: impl AsRef<str>) -> Option<Arc<dyn Provider>> {
        self.providers.get(name.as_ref()).cloned()
    }

    /// Checks if a provider is registered.
    #[must_use]
    pub fn has_provider(&self, name: impl AsRef<str>) -> bool {
        self.providers.contains_key(name.as_ref())
    }

    /// Lists registered provider names in registration order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Looks up a provider a configuration refers to.
    pub(crate) fn require(&self, name: &str) -> Result<Arc<dyn Provider>, ConfigError> {
        self.get_provider(name)
            .ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))
    }
}
