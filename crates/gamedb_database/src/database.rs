//! The game database: category registry, resolution engine and load paths.
//!
//! # Resolution
//!
//! [`GameDatabase::find`] probes categories in configured order and stops at
//! the first one whose [`Category::find`] yields a real record. Inside that
//! category the last matching record wins; across categories the first
//! category wins. Results, misses included, are memoized by the exact filter
//! string until the next [`GameDatabase::initialize`].
//!
//! # Loading
//!
//! [`GameDatabase::load`] resolves the id, then either:
//!
//! - loads through the owning category's provider, keyed by the record's
//!   [`resolved_path`](Record::resolved_path), returning the result as-is; or
//! - when nothing owns the id or the owner has no provider, tries the
//!   fallback providers in order and returns the first complete result, or
//!   the canonical "not found" result.
//!
//! # State
//!
//! Registered categories, the fallback chain and both resolution caches form
//! one immutable [`DatabaseState`] snapshot. Initialization stages every
//! category index first and commits them together with the new snapshot, so
//! readers never observe a half-initialized database and a cancelled
//! initialization changes nothing.

use crate::category::{Category, CategoryInitResult, CategorySource};
use crate::error::DatabaseError;
use async_trait::async_trait;
use core::any::Any;
use futures::future::join_all;
use gamedb_core::{AssetType, Lifetime, LoadResult, Provider, Record};
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// ResolvedRecord
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of resolving a filter to an owning category and record.
#[derive(Clone)]
pub struct ResolvedRecord {
    /// The filter exactly as it was looked up.
    pub filter: String,
    /// Whether a category owns the filter.
    pub found: bool,
    /// Owning category, when found.
    pub category: Option<Arc<dyn Category>>,
    /// Matching record, or the empty sentinel.
    pub record: Arc<Record>,
}

impl ResolvedRecord {
    /// A miss for `filter`.
    #[must_use]
    pub fn not_found(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            found: false,
            category: None,
            record: Record::empty(),
        }
    }

    /// A hit for `filter`.
    #[must_use]
    pub fn resolved(
        filter: impl Into<String>,
        category: Arc<dyn Category>,
        record: Arc<Record>,
    ) -> Self {
        Self {
            filter: filter.into(),
            found: true,
            category: Some(category),
            record,
        }
    }

    /// Name of the owning category.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_deref().map(Category::name)
    }

    /// The record, unless this is a miss.
    #[must_use]
    pub fn found_record(&self) -> Option<&Arc<Record>> {
        (self.found && !self.record.is_empty()).then_some(&self.record)
    }
}

impl core::fmt::Debug for ResolvedRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolvedRecord")
            .field("filter", &self.filter)
            .field("found", &self.found)
            .field("category", &self.category_name())
            .field("record", &self.record.id)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DatabaseState
// ─────────────────────────────────────────────────────────────────────────────

/// One published generation of the database.
struct DatabaseState {
    categories: Vec<Arc<dyn Category>>,
    category_index: HashMap<String, Arc<dyn Category>>,
    fallback_providers: Vec<Arc<dyn Provider>>,
    resolution_cache: Mutex<HashMap<String, ResolvedRecord>>,
    resolution_set_cache: Mutex<HashMap<String, Vec<ResolvedRecord>>>,
}

impl DatabaseState {
    fn new(categories: Vec<Arc<dyn Category>>, fallback_providers: Vec<Arc<dyn Provider>>) -> Self {
        let mut category_index = HashMap::with_capacity(categories.len());
        for category in &categories {
            category_index.insert(category.name().to_string(), Arc::clone(category));
        }
        Self {
            categories,
            category_index,
            fallback_providers,
            resolution_cache: Mutex::new(HashMap::new()),
            resolution_set_cache: Mutex::new(HashMap::new()),
        }
    }

    /// First category owning `filter`, with its record.
    fn owner(&self, filter: &str) -> Option<(Arc<dyn Category>, Arc<Record>)> {
        self.categories.iter().find_map(|category| {
            let record = category.find(filter);
            (!record.is_empty()).then(|| (Arc::clone(category), record))
        })
    }

    fn resolve(&self, filter: &str) -> ResolvedRecord {
        match self.owner(filter) {
            Some((category, record)) => ResolvedRecord::resolved(filter, category, record),
            None => {
                debug!(filter, "no category owns resource");
                ResolvedRecord::not_found(filter)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GameDatabase
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of categories and fallback providers.
///
/// ```
/// use gamedb_core::{Lifetime, Record};
/// use gamedb_database::{GameDatabase, StaticCategory};
/// use std::sync::Arc;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let database = GameDatabase::builder()
///     .with_category(Arc::new(StaticCategory::new("audio").with_record(Record::new("click"))))
///     .with_category(Arc::new(StaticCategory::new("sprites").with_record(Record::new("click"))))
///     .build();
///
/// database.initialize(&Lifetime::new()).await.unwrap();
///
/// let resolved = database.find("click");
/// assert!(resolved.found);
/// assert_eq!(resolved.category_name(), Some("audio"));
/// # });
/// ```
pub struct GameDatabase {
    sources: Vec<Arc<dyn CategorySource>>,
    fallback: Vec<Arc<dyn Provider>>,
    fallback_locations: Vec<Arc<dyn Provider>>,
    state: RwLock<Arc<DatabaseState>>,
}

impl GameDatabase {
    /// Starts building a database.
    #[must_use]
    pub fn builder() -> GameDatabaseBuilder {
        GameDatabaseBuilder::default()
    }

    fn snapshot(&self) -> Arc<DatabaseState> {
        Arc::clone(&self.state.read())
    }

    fn fallback_chain(&self) -> Vec<Arc<dyn Provider>> {
        self.fallback
            .iter()
            .chain(&self.fallback_locations)
            .cloned()
            .collect()
    }

    /// Acquires and initializes every configured category and publishes the result.
    ///
    /// Categories are acquired and prepared concurrently; each category is
    /// prepared as soon as it has been acquired. Once every category has
    /// settled, all of them commit and the new state is published. A category
    /// that fails either step is logged and left out. Registration follows
    /// configured order regardless of completion order. Resolution caches
    /// start empty.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Cancelled`] if `lifetime` ends before every
    /// category has settled. Staged indices are discarded, so the previously
    /// published state and every category index it refers to are kept.
    pub async fn initialize(&self, lifetime: &Lifetime) -> Result<&Self, DatabaseError> {
        let fallback_providers = self.fallback_chain();
        let acquired = Mutex::new(Vec::with_capacity(self.sources.len()));

        let settling = self
            .sources
            .iter()
            .map(|source| Self::settle(source.as_ref(), lifetime, &acquired));
        let Some(outcomes) = lifetime.run(join_all(settling)).await else {
            for category in acquired.into_inner() {
                category.discard();
            }
            warn!("database initialization cancelled; keeping previous state");
            return Err(DatabaseError::Cancelled);
        };

        for category in acquired.into_inner() {
            category.commit();
        }

        let configured = outcomes.len();
        let mut categories = Vec::with_capacity(configured);
        for outcome in outcomes {
            match outcome {
                Ok(category) => categories.push(category),
                Err(failed) => {
                    error!(
                        category = %failed.category_name,
                        error = failed.error.as_deref().unwrap_or_default(),
                        "category failed to initialize; skipping"
                    );
                }
            }
        }

        info!(
            configured,
            registered = categories.len(),
            fallback_providers = fallback_providers.len(),
            "game database initialized"
        );

        *self.state.write() = Arc::new(DatabaseState::new(categories, fallback_providers));
        Ok(self)
    }

    async fn settle(
        source: &dyn CategorySource,
        lifetime: &Lifetime,
        acquired: &Mutex<Vec<Arc<dyn Category>>>,
    ) -> Result<Arc<dyn Category>, CategoryInitResult> {
        let category = source
            .acquire(lifetime)
            .await
            .map_err(|err| CategoryInitResult::failed(source.label(), err.to_string()))?;
        acquired.lock().push(Arc::clone(&category));

        let result = category.prepare(lifetime).await;
        if result.complete {
            Ok(category)
        } else {
            Err(result)
        }
    }

    /// Resolves `filter` to its owning category and record.
    ///
    /// The first category with a match wins. The outcome, including a miss,
    /// is cached under `filter` exactly as given.
    #[must_use]
    pub fn find(&self, filter: &str) -> ResolvedRecord {
        let state = self.snapshot();
        if let Some(hit) = state.resolution_cache.lock().get(filter) {
            return hit.clone();
        }

        let resolved = state.resolve(filter);
        state
            .resolution_cache
            .lock()
            .insert(filter.to_string(), resolved.clone());
        resolved
    }

    /// Resolves `filter` for multi-record loads.
    ///
    /// Stops at the first category with a match and returns only that
    /// category's single best record, so the result holds at most one
    /// entry. Use [`find_all_aggregated`](Self::find_all_aggregated) to
    /// collect matches across every category.
    #[must_use]
    pub fn find_all(&self, filter: &str) -> Vec<ResolvedRecord> {
        let state = self.snapshot();
        if let Some(hit) = state.resolution_set_cache.lock().get(filter) {
            return hit.clone();
        }

        let resolved: Vec<_> = state
            .owner(filter)
            .map(|(category, record)| ResolvedRecord::resolved(filter, category, record))
            .into_iter()
            .collect();
        state
            .resolution_set_cache
            .lock()
            .insert(filter.to_string(), resolved.clone());
        resolved
    }

    /// Every record matching `filter` in every category.
    ///
    /// Categories are visited in configured order and records in declaration
    /// order. Not cached, and not used by [`load_all`](Self::load_all).
    #[must_use]
    pub fn find_all_aggregated(&self, filter: &str) -> Vec<ResolvedRecord> {
        let state = self.snapshot();
        state
            .categories
            .iter()
            .flat_map(|category| {
                category
                    .find_all(filter)
                    .into_iter()
                    .filter(|record| !record.is_empty())
                    .map(|record| ResolvedRecord::resolved(filter, Arc::clone(category), record))
            })
            .collect()
    }

    /// Loads `resource_id` as `T`.
    pub async fn load<T: Any>(&self, resource_id: &str, lifetime: &Lifetime) -> LoadResult {
        self.load_type(resource_id, AssetType::of::<T>(), lifetime).await
    }

    /// Loads `resource_id` and returns the asset if the load completed.
    pub async fn load_asset<T: Any + Send + Sync>(
        &self,
        resource_id: &str,
        lifetime: &Lifetime,
    ) -> Option<Arc<T>> {
        self.load::<T>(resource_id, lifetime).await.asset::<T>()
    }

    /// Loads `resource_id` as `asset_type`.
    ///
    /// Trailing whitespace is trimmed before resolution.
    pub async fn load_type(
        &self,
        resource_id: &str,
        asset_type: AssetType,
        lifetime: &Lifetime,
    ) -> LoadResult {
        let resource_id = resource_id.trim_end();
        let resolved = self.find(resource_id);
        self.load_resolved(&resolved, resource_id, asset_type, lifetime)
            .await
    }

    /// Loads an already resolved record.
    ///
    /// Goes through the owning category's provider when there is one and
    /// through the fallback chain otherwise. A failed category load is
    /// returned as-is; the fallback chain is not consulted.
    pub async fn load_resolved(
        &self,
        resolved: &ResolvedRecord,
        resource_id: &str,
        asset_type: AssetType,
        lifetime: &Lifetime,
    ) -> LoadResult {
        let owner = resolved.found_record().and_then(|record| {
            let category = resolved.category.as_ref()?;
            Some((category, category.provider()?, record))
        });

        match owner {
            Some((category, provider, record)) => {
                let key = record.resolved_path();
                let Some(result) = lifetime.run(provider.load(key, asset_type, lifetime)).await
                else {
                    return LoadResult::cancelled(key);
                };
                if !result.complete {
                    warn!(
                        resource_id,
                        category = category.name(),
                        provider = provider.name(),
                        key,
                        error = %result.error,
                        "category load failed"
                    );
                }
                result
            }
            None => self.load_fallback(resource_id, asset_type, lifetime).await,
        }
    }

    async fn load_fallback(
        &self,
        resource_id: &str,
        asset_type: AssetType,
        lifetime: &Lifetime,
    ) -> LoadResult {
        let state = self.snapshot();
        for provider in &state.fallback_providers {
            if !provider.supports(resource_id, asset_type) {
                continue;
            }
            let Some(result) = lifetime
                .run(provider.load(resource_id, asset_type, lifetime))
                .await
            else {
                return LoadResult::cancelled(resource_id);
            };
            if result.complete {
                return result;
            }
            debug!(
                resource_id,
                provider = provider.name(),
                error = %result.error,
                "fallback provider failed; trying next"
            );
        }

        warn!(
            resource_id,
            asset_type = asset_type.name(),
            "resource not found in any category or fallback provider"
        );
        LoadResult::not_found(resource_id)
    }

    /// Loads every record [`find_all`](Self::find_all) resolves for `filter`.
    ///
    /// Loads run concurrently and independently; results keep resolution
    /// order. A filter nothing owns yields no results.
    pub async fn load_all<T: Any>(&self, filter: &str, lifetime: &Lifetime) -> Vec<LoadResult> {
        let filter = filter.trim_end();
        let asset_type = AssetType::of::<T>();
        let resolved = self.find_all(filter);
        join_all(
            resolved
                .iter()
                .map(|record| self.load_resolved(record, filter, asset_type, lifetime)),
        )
        .await
    }

    /// Registered category named `name`.
    ///
    /// With duplicate names the last registered category wins.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<Arc<dyn Category>> {
        self.snapshot().category_index.get(name).cloned()
    }

    /// Registered categories in configured order.
    #[must_use]
    pub fn categories(&self) -> Vec<Arc<dyn Category>> {
        self.snapshot().categories.clone()
    }

    /// Fallback providers in the order they are tried.
    #[must_use]
    pub fn fallback_providers(&self) -> Vec<Arc<dyn Provider>> {
        self.snapshot().fallback_providers.clone()
    }

    /// Number of cached single-record resolutions.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.snapshot().resolution_cache.lock().len()
    }
}

#[async_trait]
impl Provider for GameDatabase {
    fn name(&self) -> &str {
        "gamedb"
    }

    fn supports(&self, _key: &str, _asset_type: AssetType) -> bool {
        true
    }

    async fn load(&self, key: &str, asset_type: AssetType, lifetime: &Lifetime) -> LoadResult {
        self.load_type(key, asset_type, lifetime).await
    }
}

impl core::fmt::Debug for GameDatabase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.snapshot();
        let categories: Vec<_> = state.categories.iter().map(|c| c.name()).collect();
        let fallback: Vec<_> = state.fallback_providers.iter().map(|p| p.name()).collect();
        f.debug_struct("GameDatabase")
            .field("configured", &self.sources.len())
            .field("categories", &categories)
            .field("fallback_providers", &fallback)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for [`GameDatabase`].
#[derive(Default)]
pub struct GameDatabaseBuilder {
    sources: Vec<Arc<dyn CategorySource>>,
    fallback: Vec<Arc<dyn Provider>>,
    fallback_locations: Vec<Arc<dyn Provider>>,
}

impl GameDatabaseBuilder {
    /// Adds an already instantiated category.
    #[must_use]
    pub fn with_category(self, category: Arc<dyn Category>) -> Self {
        self.with_source(Arc::new(category))
    }

    /// Adds a category acquired during initialization.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn CategorySource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Appends a primary fallback provider.
    #[must_use]
    pub fn with_fallback(mut self, provider: Arc<dyn Provider>) -> Self {
        self.fallback.push(provider);
        self
    }

    /// Appends a secondary fallback provider, tried after every primary one.
    #[must_use]
    pub fn with_fallback_location(mut self, provider: Arc<dyn Provider>) -> Self {
        self.fallback_locations.push(provider);
        self
    }

    /// Builds the database. No category is registered until
    /// [`initialize`](GameDatabase::initialize) runs.
    #[must_use]
    pub fn build(self) -> GameDatabase {
        let fallback_providers = self
            .fallback
            .iter()
            .chain(&self.fallback_locations)
            .cloned()
            .collect();
        GameDatabase {
            sources: self.sources,
            fallback: self.fallback,
            fallback_locations: self.fallback_locations,
            state: RwLock::new(Arc::new(DatabaseState::new(Vec::new(), fallback_providers))),
        }
    }
}

impl core::fmt::Debug for GameDatabaseBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameDatabaseBuilder")
            .field("sources", &self.sources.iter().map(|s| s.label()).collect::<Vec<_>>())
            .field("fallback", &self.fallback.len())
            .field("fallback_locations", &self.fallback_locations.len())
            .finish()
    }
}
