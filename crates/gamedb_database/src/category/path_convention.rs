use super::{Category, CategoryInitResult, CategoryState, RecordIndex};
use crate::error::CategoryError;
use crate::source::{AssetEntry, AssetSource};
use async_trait::async_trait;
use gamedb_core::{Lifetime, Provider, Record};
use std::path::Path;
use std::sync::Arc;

/// Root segment used when none is configured.
pub const DEFAULT_RESOURCE_ROOT: &str = "Resources/";

/// Category populated from source entries under a conventional root folder.
///
/// Each entry below the root becomes a record whose id is the asset name and
/// whose resource path is the location relative to the root, without the
/// extension:
///
/// | Entry path | Id | Resource path |
/// |------------|----|---------------|
/// | `Assets/Resources/ui/icons/sword.png` | `sword` | `ui/icons/sword` |
/// | `Resources/bgm.ogg` | `bgm` | `bgm` |
/// | `Assets/Textures/wall.png` | skipped | |
///
/// The root is matched as a whole path segment, case-insensitively, at its
/// first occurrence.
pub struct PathConventionCategory {
    name: String,
    provider: Option<Arc<dyn Provider>>,
    root: String,
    source: Option<Arc<dyn AssetSource>>,
    refresh_on_initialize: bool,
    index: RecordIndex,
}

impl PathConventionCategory {
    /// Creates a category rooted at [`DEFAULT_RESOURCE_ROOT`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: None,
            root: DEFAULT_RESOURCE_ROOT.to_string(),
            source: None,
            refresh_on_initialize: false,
            index: RecordIndex::new(Vec::new()),
        }
    }

    /// Overrides the root segment.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
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

    /// The configured root segment.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Part of `path` after the root segment, if the path lies under it.
    fn relative_to_root<'a>(&self, path: &'a str) -> Option<&'a str> {
        let root = self.root.trim_matches('/').to_ascii_lowercase();
        if root.is_empty() {
            return Some(path);
        }
        let lowered = path.to_ascii_lowercase();
        let prefix = format!("{root}/");
        // ASCII lowering keeps byte offsets aligned with `path`.
        let start = if lowered.starts_with(&prefix) {
            prefix.len()
        } else {
            let needle = format!("/{prefix}");
            lowered.find(&needle)? + needle.len()
        };
        Some(&path[start..])
    }

    async fn scan(&self, lifetime: &Lifetime) -> Result<Vec<Arc<Record>>, CategoryError> {
        let source = self.source.as_ref().ok_or(CategoryError::NoSource)?;
        let entries = lifetime
            .run(source.scan(lifetime))
            .await
            .ok_or(CategoryError::Cancelled)??;

        let records: Vec<_> = entries
            .iter()
            .filter_map(|entry| self.record_for(entry))
            .map(Arc::new)
            .collect();

        tracing::debug!(
            category = %self.name,
            scanned = entries.len(),
            accepted = records.len(),
            "path category scanned"
        );
        Ok(records)
    }

    fn record_for(&self, entry: &AssetEntry) -> Option<Record> {
        let relative = self.relative_to_root(&entry.path)?;
        let (directory, file) = match relative.rsplit_once('/') {
            Some((directory, file)) => (Some(directory), file),
            None => (None, relative),
        };
        let stem = Path::new(file).file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        let resource_path = match directory {
            Some(directory) if !directory.is_empty() => format!("{directory}/{stem}"),
            _ => stem.to_string(),
        };
        let id = if entry.name.is_empty() { stem } else { entry.name.as_str() };

        Some(
            Record::new(id)
                .with_resource_path(resource_path)
                .with_labels(entry.labels.iter().cloned()),
        )
    }
}

#[async_trait]
impl Category for PathConventionCategory {
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

        let indexed = if self.refresh_on_initialize {
            match self.scan(lifetime).await {
                Ok(records) => self.index.prepare_from(records),
                Err(err) => {
                    self.index.fail();
                    return CategoryInitResult::failed(&self.name, err.to_string());
                }
            }
        } else {
            self.index.prepare()
        };
        tracing::debug!(category = %self.name, root = %self.root, records = indexed, "path category indexed");
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

    async fn fill(&self, lifetime: &Lifetime) -> Result<usize, CategoryError> {
        let records = self.scan(lifetime).await?;
        let count = records.len();
        self.index.set_declared(records);
        Ok(count)
    }
}

impl core::fmt::Debug for PathConventionCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PathConventionCategory")
            .field("name", &self.name)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("root", &self.root)
            .field("has_source", &self.source.is_some())
            .field("refresh_on_initialize", &self.refresh_on_initialize)
            .field("index", &self.index)
            .finish()
    }
}
