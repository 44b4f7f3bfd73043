//! Shared doubles for `gamedb_database` integration tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use async_trait::async_trait;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use core::time::Duration;
use gamedb_core::{AssetType, Lifetime, LoadResult, Provider, Record};
use gamedb_database::{
    Category, CategoryError, CategoryInitResult, CategorySource, CategoryState, StaticCategory,
};
use parking_lot::Mutex;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// CATEGORIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Static category holding one record per id.
pub fn static_category(name: &str, ids: &[&str]) -> StaticCategory {
    StaticCategory::new(name).with_records(ids.iter().copied().map(Record::new))
}

/// Category counting how often it is probed by `find`.
pub struct CountingCategory {
    inner: StaticCategory,
    finds: AtomicUsize,
}

impl CountingCategory {
    pub fn new(inner: StaticCategory) -> Self {
        Self {
            inner,
            finds: AtomicUsize::new(0),
        }
    }

    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Category for CountingCategory {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn provider(&self) -> Option<Arc<dyn Provider>> {
        self.inner.provider()
    }

    fn records(&self) -> Vec<Arc<Record>> {
        self.inner.records()
    }

    fn state(&self) -> CategoryState {
        self.inner.state()
    }

    async fn prepare(&self, lifetime: &Lifetime) -> CategoryInitResult {
        self.inner.prepare(lifetime).await
    }

    fn commit(&self) {
        self.inner.commit();
    }

    fn discard(&self) {
        self.inner.discard();
    }

    fn find(&self, filter: &str) -> Arc<Record> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find(filter)
    }

    fn find_all(&self, filter: &str) -> Vec<Arc<Record>> {
        self.inner.find_all(filter)
    }

    fn get(&self, id: &str) -> Option<Arc<Record>> {
        self.inner.get(id)
    }
}

/// Category whose initialization always fails.
pub struct FailingCategory {
    inner: StaticCategory,
}

impl FailingCategory {
    pub fn new(inner: StaticCategory) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Category for FailingCategory {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn provider(&self) -> Option<Arc<dyn Provider>> {
        None
    }

    fn records(&self) -> Vec<Arc<Record>> {
        self.inner.records()
    }

    fn state(&self) -> CategoryState {
        CategoryState::Failed
    }

    async fn prepare(&self, _lifetime: &Lifetime) -> CategoryInitResult {
        CategoryInitResult::failed(self.inner.name(), "corrupt category asset")
    }

    fn commit(&self) {}

    fn discard(&self) {}

    fn find(&self, filter: &str) -> Arc<Record> {
        self.inner.find(filter)
    }

    fn find_all(&self, filter: &str) -> Vec<Arc<Record>> {
        self.inner.find_all(filter)
    }

    fn get(&self, id: &str) -> Option<Arc<Record>> {
        self.inner.get(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CATEGORY SOURCES
// ═══════════════════════════════════════════════════════════════════════════════

/// Source that cannot locate its category asset.
pub struct MissingSource(pub &'static str);

#[async_trait]
impl CategorySource for MissingSource {
    fn label(&self) -> &str {
        self.0
    }

    async fn acquire(&self, _lifetime: &Lifetime) -> Result<Arc<dyn Category>, CategoryError> {
        Err(CategoryError::acquire(self.0, "asset missing"))
    }
}

/// Source that takes `delay` to produce its category.
pub struct SlowSource {
    pub category: Arc<dyn Category>,
    pub delay: Duration,
}

#[async_trait]
impl CategorySource for SlowSource {
    fn label(&self) -> &str {
        self.category.name()
    }

    async fn acquire(&self, _lifetime: &Lifetime) -> Result<Arc<dyn Category>, CategoryError> {
        tokio::time::sleep(self.delay).await;
        Ok(Arc::clone(&self.category))
    }
}

/// Source that hangs until opened.
pub struct GatedSource {
    pub category: Arc<dyn Category>,
    pub is_open: AtomicBool,
}

impl GatedSource {
    pub fn new(category: Arc<dyn Category>) -> Arc<Self> {
        Arc::new(Self {
            category,
            is_open: AtomicBool::new(true),
        })
    }

    pub fn close(&self) {
        self.is_open.store(false, Ordering::SeqCst);
    }

    pub fn open(&self) {
        self.is_open.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CategorySource for GatedSource {
    fn label(&self) -> &str {
        self.category.name()
    }

    async fn acquire(&self, _lifetime: &Lifetime) -> Result<Arc<dyn Category>, CategoryError> {
        if !self.is_open.load(Ordering::SeqCst) {
            core::future::pending::<()>().await;
        }
        Ok(Arc::clone(&self.category))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROVIDERS
// ═══════════════════════════════════════════════════════════════════════════════

/// How a [`RecordingProvider`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// `supports` is false.
    Unsupported,
    /// Loads fail with "not found".
    Fails,
    /// Loads succeed with the provider name as a `String` asset.
    Succeeds,
}

/// Provider recording every key it is asked to load.
pub struct RecordingProvider {
    name: String,
    behavior: Behavior,
    calls: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn new(name: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _key: &str, _asset_type: AssetType) -> bool {
        self.behavior != Behavior::Unsupported
    }

    async fn load(&self, key: &str, _asset_type: AssetType, _lifetime: &Lifetime) -> LoadResult {
        self.calls.lock().push(key.to_string());
        match self.behavior {
            Behavior::Succeeds => LoadResult::success(key, Arc::new(self.name.clone())),
            Behavior::Fails | Behavior::Unsupported => LoadResult::not_found(key),
        }
    }
}

/// Name of the provider that produced a successful result.
pub fn loaded_by(result: &LoadResult) -> Option<String> {
    result.asset::<String>().map(|name| name.as_ref().clone())
}
