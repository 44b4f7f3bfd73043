use super::{Category, CategoryInitResult, CategoryState, RecordIndex};
use crate::error::CategoryError;
use crate::source::{AssetEntry, AssetSource};
use async_trait::async_trait;
use gamedb_core::{Lifetime, Provider, Record, eq_ignore_case};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Selects which scanned assets become records.
///
/// Each list is an independent gate; an empty list accepts everything.
///
/// - `labels`: the asset carries any of these labels (case-insensitive).
/// - `folders`: the asset path lies under any of these folders.
/// - `patterns`: any of these regular expressions matches the asset path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelFilter {
    /// Accepted labels.
    pub labels: Vec<String>,
    /// Accepted folders, `/`-separated.
    pub folders: Vec<String>,
    /// Accepted path patterns.
    pub patterns: Vec<String>,
}

impl LabelFilter {
    /// Adds an accepted label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Adds an accepted folder.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folders.push(folder.into());
        self
    }

    /// Adds an accepted path pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Checks that every pattern compiles.
    pub fn validate(&self) -> Result<(), CategoryError> {
        self.compile().map(drop)
    }

    fn compile(&self) -> Result<Vec<Regex>, CategoryError> {
        self.compile_patterns()
            .map_err(|(pattern, source)| CategoryError::InvalidPattern { pattern, source })
    }

    /// Compiles every pattern, reporting the first that fails.
    pub(crate) fn compile_patterns(&self) -> Result<Vec<Regex>, (String, regex::Error)> {
        self.patterns
            .iter()
            .map(|pattern| Regex::new(pattern).map_err(|source| (pattern.clone(), source)))
            .collect()
    }

    fn accepts(&self, entry: &AssetEntry, patterns: &[Regex]) -> bool {
        let label_ok = self.labels.is_empty()
            || entry.labels.iter().any(|label| {
                self.labels
                    .iter()
                    .any(|wanted| eq_ignore_case(wanted, label))
            });

        let folder_ok = self.folders.is_empty()
            || self.folders.iter().any(|folder| {
                let folder = folder.trim_end_matches('/');
                entry
                    .path
                    .strip_prefix(folder)
                    .is_some_and(|rest| rest.starts_with('/'))
            });

        let pattern_ok =
            patterns.is_empty() || patterns.iter().any(|pattern| pattern.is_match(&entry.path));

        label_ok && folder_ok && pattern_ok
    }
}

fn record_from_entry(entry: AssetEntry) -> Record {
    Record::new(entry.key)
        .with_name(entry.name)
        .with_labels(entry.labels)
}

/// Category populated from an [`AssetSource`] scan filtered by a [`LabelFilter`].
///
/// Records are keyed by the asset key and keep the asset's labels, so a
/// lookup accepts the key, any label, or the asset name.
pub struct LabeledCategory {
    name: String,
    provider: Option<Arc<dyn Provider>>,
    filter: LabelFilter,
    source: Option<Arc<dyn AssetSource>>,
    refresh_on_initialize: bool,
    index: RecordIndex,
}

impl LabeledCategory {
    /// Creates a category with no records and no source.
    #[must_use]
    pub fn new(name: impl Into<String>, filter: LabelFilter) -> Self {
        Self {
            name: name.into(),
            provider: None,
            filter,
            source: None,
            refresh_on_initialize: false,
            index: RecordIndex::new(Vec::new()).with_matcher(|record, filter| {
                record.matches(filter)
                    || (!record.is_empty()
                        && !filter.is_empty()
                        && eq_ignore_case(&record.name, filter))
            }),
        }
    }

    /// Sets the provider records are loaded through.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the source [`fill`](Category::fill) scans.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn AssetSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Rescans the source at every initialize.
    #[must_use]
    pub fn refresh_on_initialize(mut self, refresh: bool) -> Self {
        self.refresh_on_initialize = refresh;
        self
    }

    /// Declares records directly, as left by a previous fill.
    #[must_use]
    pub fn with_records(self, records: impl IntoIterator<Item = Record>) -> Self {
        for record in records {
            self.index.push(Arc::new(record));
        }
        self
    }

    /// The active filter.
    #[must_use]
    pub fn filter(&self) -> &LabelFilter {
        &self.filter
    }

    /// Scans the source and keeps the entries the filter accepts.
    async fn scan(&self, lifetime: &Lifetime) -> Result<Vec<Arc<Record>>, CategoryError> {
        let source = self.source.as_ref().ok_or(CategoryError::NoSource)?;
        let patterns = self.filter.compile()?;
        let entries = lifetime
            .run(source.scan(lifetime))
            .await
            .ok_or(CategoryError::Cancelled)??;

        let scanned = entries.len();
        let records: Vec<_> = entries
            .into_iter()
            .filter(|entry| self.filter.accepts(entry, &patterns))
            .map(|entry| Arc::new(record_from_entry(entry)))
            .collect();

        tracing::debug!(category = %self.name, scanned, accepted = records.len(), "labeled category scanned");
        Ok(records)
    }
}

#[async_trait]
impl Category for LabeledCategory {
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

        let staged = if self.refresh_on_initialize {
            self.scan(lifetime)
                .await
                .map(|records| self.index.prepare_from(records))
        } else {
            self.filter.validate().map(|()| self.index.prepare())
        };
        match staged {
            Ok(indexed) => {
                tracing::debug!(category = %self.name, records = indexed, "labeled category indexed");
                CategoryInitResult::ready(&self.name)
            }
            Err(err) => {
                self.index.fail();
                CategoryInitResult::failed(&self.name, err.to_string())
            }
        }
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

    async fn fill(&self, lifetime: &Lifetime) -> Result<usize, CategoryError> {
        let records = self.scan(lifetime).await?;
        let count = records.len();
        self.index.set_declared(records);
        Ok(count)
    }
}

impl core::fmt::Debug for LabeledCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LabeledCategory")
            .field("name", &self.name)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("filter", &self.filter)
            .field("has_source", &self.source.is_some())
            .field("refresh_on_initialize", &self.refresh_on_initialize)
            .field("index", &self.index)
            .finish()
    }
}
