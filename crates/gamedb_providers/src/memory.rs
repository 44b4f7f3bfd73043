//! In-memory [`Provider`] implementation.

use async_trait::async_trait;
use gamedb_core::{Asset, AssetType, Lifetime, LoadResult, Provider, ProviderFault};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Provider serving assets from an in-process map.
///
/// Useful as a fallback for generated or preloaded content, and as a test
/// double. Each stored asset remembers its concrete type, so `supports` only
/// accepts keys whose stored asset has the requested type.
///
/// ```
/// use gamedb_core::ProviderExt;
/// use gamedb_providers::MemoryProvider;
///
/// let provider = MemoryProvider::new("builtin");
/// provider.insert("greeting", String::from("hello"));
///
/// assert!(provider.supports_type::<String>("greeting"));
/// assert!(!provider.supports_type::<u32>("greeting"));
/// ```
pub struct MemoryProvider {
    name: String,
    assets: RwLock<HashMap<String, (AssetType, Asset)>>,
    accept_unknown_keys: bool,
}

impl core::fmt::Debug for MemoryProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryProvider")
            .field("name", &self.name)
            .field("assets", &self.len())
            .field("accept_unknown_keys", &self.accept_unknown_keys)
            .finish()
    }
}

impl MemoryProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assets: RwLock::new(HashMap::new()),
            accept_unknown_keys: false,
        }
    }

    /// Makes `supports` accept keys that are not stored yet.
    ///
    /// Loads of unknown keys still report "not found".
    #[must_use]
    pub fn accept_unknown_keys(mut self, accept: bool) -> Self {
        self.accept_unknown_keys = accept;
        self
    }

    /// Stores `value` under `key`, replacing any previous asset.
    pub fn insert<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.assets
            .write()
            .insert(key.into(), (AssetType::of::<T>(), Arc::new(value)));
    }

    /// Stores `value` under `key`, builder style.
    #[must_use]
    pub fn with_asset<T: Send + Sync + 'static>(self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Removes the asset stored under `key`.
    pub fn remove(&self, key: &str) -> bool {
        self.assets.write().remove(key).is_some()
    }

    /// Number of stored assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }
}

#[async_trait]
impl Provider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, key: &str, asset_type: AssetType) -> bool {
        if key.is_empty() {
            return false;
        }
        match self.assets.read().get(key) {
            Some((stored, _)) => *stored == asset_type,
            None => self.accept_unknown_keys,
        }
    }

    async fn load(&self, key: &str, asset_type: AssetType, _lifetime: &Lifetime) -> LoadResult {
        let entry = self.assets.read().get(key).cloned();
        match entry {
            Some((stored, asset)) if stored == asset_type => LoadResult::success(key, asset),
            Some(_) => LoadResult::fault(
                key,
                ProviderFault::TypeMismatch {
                    expected: asset_type.name(),
                    key: key.to_string(),
                },
            ),
            None => LoadResult::not_found(key),
        }
    }
}
