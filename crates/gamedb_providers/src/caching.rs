//! Process-wide caching decorator for providers.
//!
//! [`CachingProvider`] memoizes successful loads in a cache shared by every
//! instance in the process. Entries survive database re-initialization, so
//! hosts must call [`CachingProvider::reset_shared_cache`] at session start to
//! drop assets cached by a previous session.

use async_trait::async_trait;
use core::any::TypeId;
use gamedb_core::{Asset, AssetType, Lifetime, LoadResult, Provider};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    namespace: String,
    key: String,
    type_id: TypeId,
}

static SHARED_CACHE: LazyLock<RwLock<HashMap<CacheKey, Asset>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Drops every entry of the process-wide provider cache.
///
/// Same as [`CachingProvider::reset_shared_cache`], callable without naming a
/// provider type.
pub fn reset_shared_cache() {
    let mut cache = SHARED_CACHE.write();
    let dropped = cache.len();
    cache.clear();
    tracing::debug!(dropped, "shared provider cache reset");
}

/// When a [`CachingProvider`] stores load results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Store every successful load (default).
    #[default]
    OnSuccess,
    /// Never store; existing entries are still served.
    Disabled,
}

/// Provider decorator memoizing `key -> asset` in process-wide state.
///
/// Entries are keyed by namespace, resource key and requested type. The
/// namespace defaults to the inner provider's name; two decorators with the
/// same namespace share entries.
///
/// ```
/// use gamedb_providers::{CachePolicy, CachingProvider, MemoryProvider};
///
/// // At session start:
/// gamedb_providers::reset_shared_cache();
///
/// let provider = CachingProvider::new(MemoryProvider::new("sprites"))
///     .with_policy(CachePolicy::OnSuccess);
/// # let _ = provider;
/// ```
#[derive(Debug)]
pub struct CachingProvider<P> {
    inner: P,
    namespace: String,
    policy: CachePolicy,
}

impl<P: Provider> CachingProvider<P> {
    /// Wraps `inner`, using its name as the cache namespace.
    #[must_use]
    pub fn new(inner: P) -> Self {
        let namespace = inner.name().to_string();
        Self {
            inner,
            namespace,
            policy: CachePolicy::default(),
        }
    }

    /// Overrides the cache namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the population policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The wrapped provider.
    #[must_use]
    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn cache_key(&self, key: &str, asset_type: AssetType) -> CacheKey {
        CacheKey {
            namespace: self.namespace.clone(),
            key: key.to_string(),
            type_id: asset_type.id(),
        }
    }
}

impl<P> CachingProvider<P> {
    /// Drops every entry of the process-wide cache.
    ///
    /// Call at process or session start so assets from a previous session are
    /// not served after the database is re-initialized.
    pub fn reset_shared_cache() {
        reset_shared_cache();
    }

    /// Number of entries in the process-wide cache.
    #[must_use]
    pub fn shared_cache_len() -> usize {
        SHARED_CACHE.read().len()
    }
}

#[async_trait]
impl<P: Provider> Provider for CachingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn supports(&self, key: &str, asset_type: AssetType) -> bool {
        SHARED_CACHE
            .read()
            .contains_key(&self.cache_key(key, asset_type))
            || self.inner.supports(key, asset_type)
    }

    async fn load(&self, key: &str, asset_type: AssetType, lifetime: &Lifetime) -> LoadResult {
        let cache_key = self.cache_key(key, asset_type);
        let cached = SHARED_CACHE.read().get(&cache_key).cloned();
        if let Some(asset) = cached {
            return LoadResult::success(key, asset);
        }

        let result = self.inner.load(key, asset_type, lifetime).await;

        if self.policy == CachePolicy::OnSuccess
            && result.complete
            && let Some(asset) = &result.asset
        {
            SHARED_CACHE.write().insert(cache_key, Asset::clone(asset));
        }

        result
    }
}
