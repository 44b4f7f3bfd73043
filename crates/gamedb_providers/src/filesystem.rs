//! Filesystem-backed [`Provider`] implementation.

use async_trait::async_trait;
use gamedb_core::{Asset, AssetType, Lifetime, LoadResult, Provider, ProviderFault};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Provider reading resources from a directory.
///
/// Keys are paths relative to the root, using `/` separators. Keys produced
/// by path-convention categories carry no extension, so the provider probes
/// the configured extensions in order after trying the key as given.
///
/// Supported target types:
///
/// | Type | Decoding |
/// |------|----------|
/// | `Vec<u8>` | Raw bytes |
/// | `String` | UTF-8 text |
/// | `serde_json::Value` | JSON document |
///
/// A missing file yields the canonical "not found" result. Other I/O errors
/// and decoding errors are reported as faults.
#[derive(Debug, Clone)]
pub struct FileSystemProvider {
    name: String,
    root: PathBuf,
    extensions: Vec<String>,
}

impl FileSystemProvider {
    /// Creates a provider rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            name: "filesystem".to_string(),
            root: root.into(),
            extensions: Vec::new(),
        }
    }

    /// Overrides the diagnostic name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an extension to probe, without the leading dot.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_supported_type(asset_type: AssetType) -> bool {
        asset_type.is::<Vec<u8>>() || asset_type.is::<String>() || asset_type.is::<serde_json::Value>()
    }

    /// Rejects keys that would escape the root.
    fn is_contained(key: &str) -> bool {
        !key.is_empty()
            && Path::new(key)
                .components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
    }

    fn candidates(&self, key: &str) -> Vec<PathBuf> {
        let base = self.root.join(key);
        let mut candidates = vec![base.clone()];
        for extension in &self.extensions {
            let mut file_name = base.as_os_str().to_owned();
            file_name.push(".");
            file_name.push(extension);
            candidates.push(PathBuf::from(file_name));
        }
        candidates
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        for candidate in self.candidates(key) {
            match tokio::fs::read(&candidate).await {
                Ok(bytes) => return Ok(Some(bytes)),
                // A directory named like the key is skipped in favor of an extension match.
                Err(err) if err.kind() == ErrorKind::NotFound || candidate.is_dir() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    fn decode(key: &str, bytes: Vec<u8>, asset_type: AssetType) -> LoadResult {
        let asset: Asset = if asset_type.is::<Vec<u8>>() {
            Arc::new(bytes)
        } else if asset_type.is::<String>() {
            match String::from_utf8(bytes) {
                Ok(text) => Arc::new(text),
                Err(err) => {
                    return LoadResult::fault(
                        key,
                        ProviderFault::Other(format!("'{key}' is not valid UTF-8: {err}")),
                    );
                }
            }
        } else {
            match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(value) => Arc::new(value),
                Err(err) => return LoadResult::fault(key, err.into()),
            }
        };
        LoadResult::success(key, asset)
    }
}

#[async_trait]
impl Provider for FileSystemProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, key: &str, asset_type: AssetType) -> bool {
        Self::is_contained(key) && Self::is_supported_type(asset_type)
    }

    async fn load(&self, key: &str, asset_type: AssetType, lifetime: &Lifetime) -> LoadResult {
        if !self.supports(key, asset_type) {
            return LoadResult::not_found(key);
        }

        let Some(read) = lifetime.run(self.read(key)).await else {
            return LoadResult::cancelled(key);
        };

        match read {
            Ok(Some(bytes)) => Self::decode(key, bytes, asset_type),
            Ok(None) => LoadResult::not_found(key),
            Err(err) => {
                tracing::warn!(
                    provider = %self.name,
                    key,
                    error = %err,
                    "failed to read resource"
                );
                LoadResult::fault(key, err.into())
            }
        }
    }
}
