use super::{Category, CategoryInitResult, CategoryState, RecordIndex};
use async_trait::async_trait;
use gamedb_core::{Lifetime, Provider, Record};
use std::sync::Arc;

/// Category whose records are supplied directly.
///
/// ```
/// use gamedb_database::{Category, StaticCategory};
/// use gamedb_core::Record;
///
/// let audio = StaticCategory::new("audio")
///     .with_record(Record::new("click").with_resource_path("sfx/ui/click"))
///     .with_record(Record::new("confirm"));
/// assert_eq!(audio.records().len(), 2);
/// ```
pub struct StaticCategory {
    name: String,
    provider: Option<Arc<dyn Provider>>,
    index: RecordIndex,
}

impl StaticCategory {
    /// Creates an empty category.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: None,
            index: RecordIndex::new(Vec::new()),
        }
    }

    /// Declares a record.
    #[must_use]
    pub fn with_record(self, record: Record) -> Self {
        self.index.push(Arc::new(record));
        self
    }

    /// Declares several records.
    #[must_use]
    pub fn with_records(self, records: impl IntoIterator<Item = Record>) -> Self {
        for record in records {
            self.index.push(Arc::new(record));
        }
        self
    }

    /// Sets the provider records are loaded through.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replaces the declared records. Lookups see them after the next initialize.
    pub fn set_records(&self, records: impl IntoIterator<Item = Record>) {
        self.index
            .set_declared(records.into_iter().map(Arc::new).collect());
    }
}

#[async_trait]
impl Category for StaticCategory {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> Option<Arc<dyn Provider>> {
        self.provider.clone()
    }

    fn records(&self) -> Vec<Arc<Record>> {
        self.index.declared()
    }

    fn state(&self) -> CategoryState {
        self.index.state()
    }

    async fn prepare(&self, lifetime: &Lifetime) -> CategoryInitResult {
        self.index.begin();
        if lifetime.is_terminated() {
            self.index.fail();
            return CategoryInitResult::failed(&self.name, "cancelled");
        }
        let indexed = self.index.prepare();
        tracing::debug!(category = %self.name, records = indexed, "category indexed");
        CategoryInitResult::ready(&self.name)
    }

    fn commit(&self) {
        self.index.commit();
    }

    fn discard(&self) {
        self.index.discard();
    }

    fn find(&self, filter: &str) -> Arc<Record> {
        self.index.find(filter)
    }

    fn find_all(&self, filter: &str) -> Vec<Arc<Record>> {
        self.index.find_all(filter)
    }

    fn get(&self, id: &str) -> Option<Arc<Record>> {
        self.index.get(id)
    }
}

impl core::fmt::Debug for StaticCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticCategory")
            .field("name", &self.name)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("index", &self.index)
            .finish()
    }
}
