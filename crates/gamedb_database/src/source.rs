//! Asset sources used to fill scanned categories.
//!
//! A scanned category ([`LabeledCategory`](crate::LabeledCategory),
//! [`PathConventionCategory`](crate::PathConventionCategory)) does not know
//! where assets live. It is handed an [`AssetSource`] and derives its records
//! from the entries the source reports.

use crate::error::SourceError;
use async_trait::async_trait;
use gamedb_core::Lifetime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One asset reported by an [`AssetSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Key a provider loads the asset by.
    pub key: String,
    /// Asset name, usually the file stem.
    pub name: String,
    /// Project path with `/` separators, used for folder and pattern filters.
    pub path: String,
    /// Labels attached to the asset.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl AssetEntry {
    /// Creates an entry whose key equals its path and whose name is the file stem.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = Path::new(&path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            key: path.clone(),
            name,
            path,
            labels: Vec::new(),
        }
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }
}

/// Enumerates assets for scanned categories.
#[async_trait]
pub trait AssetSource: Send + Sync + 'static {
    /// Lists every asset the source knows about.
    async fn scan(&self, lifetime: &Lifetime) -> Result<Vec<AssetEntry>, SourceError>;
}

/// Source returning a fixed entry list.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    entries: Vec<AssetEntry>,
}

impl MemoryAssetSource {
    /// Creates a source over `entries`.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = AssetEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AssetSource for MemoryAssetSource {
    async fn scan(&self, _lifetime: &Lifetime) -> Result<Vec<AssetEntry>, SourceError> {
        Ok(self.entries.clone())
    }
}

/// Source listing the files under a directory.
///
/// Entry paths and keys are relative to the directory and use `/`
/// separators. Names are file stems. Hidden files (leading `.`) are skipped.
/// The walk runs on the blocking pool and stops at the next entry once the
/// lifetime ends.
#[derive(Debug, Clone)]
pub struct DirectoryAssetSource {
    root: PathBuf,
}

impl DirectoryAssetSource {
    /// Creates a source over `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn is_hidden(entry: &walkdir::DirEntry) -> bool {
        entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
    }

    fn walk(root: &Path, lifetime: &Lifetime) -> Result<Vec<AssetEntry>, SourceError> {
        if !root.is_dir() {
            return Err(SourceError::MissingRoot(root.display().to_string()));
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_hidden(entry));

        for entry in walker {
            if lifetime.is_terminated() {
                return Err(SourceError::Cancelled);
            }
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let path = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.push(AssetEntry::from_path(path));
        }

        Ok(entries)
    }
}

#[async_trait]
impl AssetSource for DirectoryAssetSource {
    async fn scan(&self, lifetime: &Lifetime) -> Result<Vec<AssetEntry>, SourceError> {
        let root = self.root.clone();
        let walk_lifetime = lifetime.clone();
        let entries = tokio::task::spawn_blocking(move || Self::walk(&root, &walk_lifetime))
            .await
            .map_err(|err| SourceError::Other(err.to_string()))??;
        tracing::debug!(
            root = %self.root.display(),
            entries = entries.len(),
            "directory scan complete"
        );
        Ok(entries)
    }
}
