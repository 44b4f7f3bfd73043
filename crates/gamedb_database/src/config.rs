//! Declarative database configuration.
//!
//! A [`DatabaseConfig`] names categories and fallback providers; providers
//! are referred to by the names they were registered under in a
//! [`ProviderRegistry`]. Configuration defects (unknown provider names,
//! invalid path patterns, scanned categories without a source) are reported
//! when the database is built, never during lookups.
//!
//! ```json
//! {
//!   "categories": [
//!     { "name": "audio", "provider": "sfx", "kind": "static",
//!       "records": [{ "id": "click", "resource_path": "ui/click" }] },
//!     { "name": "icons", "provider": "files", "kind": "labeled",
//!       "filter": { "labels": ["icons"] }, "refresh_on_initialize": true },
//!     { "name": "resources", "provider": "files", "kind": "path_convention" }
//!   ],
//!   "fallback": ["files"],
//!   "fallback_locations": ["remote"]
//! }
//! ```

use crate::category::{
    Category, DEFAULT_RESOURCE_ROOT, LabelFilter, LabeledCategory, PathConventionCategory,
    StaticCategory,
};
use crate::database::GameDatabase;
use crate::error::ConfigError;
use crate::providers::ProviderRegistry;
use crate::source::AssetSource;
use gamedb_core::Record;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Top-level database configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Categories, in resolution order.
    pub categories: Vec<CategoryConfig>,
    /// Primary fallback provider names.
    pub fallback: Vec<String>,
    /// Secondary fallback provider names, tried after the primary ones.
    pub fallback_locations: Vec<String>,
}

impl DatabaseConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// One configured category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Category name.
    pub name: String,
    /// Name of the registered provider records load through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Variant and its settings.
    #[serde(flatten)]
    pub kind: CategoryKind,
}

/// Category variant settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryKind {
    /// Records listed inline.
    Static {
        /// Declared records.
        #[serde(default)]
        records: Vec<Record>,
    },
    /// Records scanned from the asset source and filtered.
    Labeled {
        /// Records from a previous scan.
        #[serde(default)]
        records: Vec<Record>,
        /// Which scanned assets are kept.
        #[serde(default)]
        filter: LabelFilter,
        /// Rescan at every initialize.
        #[serde(default)]
        refresh_on_initialize: bool,
    },
    /// Records derived from asset paths under a root folder.
    PathConvention {
        /// Records from a previous scan.
        #[serde(default)]
        records: Vec<Record>,
        /// Root segment.
        #[serde(default = "default_root")]
        root: String,
        /// Rescan at every initialize.
        #[serde(default)]
        refresh_on_initialize: bool,
    },
}

fn default_root() -> String {
    DEFAULT_RESOURCE_ROOT.to_string()
}

impl CategoryConfig {
    fn build(
        &self,
        providers: &ProviderRegistry,
        source: Option<&Arc<dyn AssetSource>>,
    ) -> Result<Arc<dyn Category>, ConfigError> {
        let provider = self
            .provider
            .as_deref()
            .map(|name| providers.require(name))
            .transpose()?;

        let category: Arc<dyn Category> = match &self.kind {
            CategoryKind::Static { records } => {
                let mut category =
                    StaticCategory::new(&self.name).with_records(records.iter().cloned());
                if let Some(provider) = provider {
                    category = category.with_provider(provider);
                }
                Arc::new(category)
            }
            CategoryKind::Labeled {
                records,
                filter,
                refresh_on_initialize,
            } => {
                filter
                    .compile_patterns()
                    .map_err(|(pattern, source)| ConfigError::InvalidPattern {
                        category: self.name.clone(),
                        pattern,
                        source,
                    })?;
                self.require_source(*refresh_on_initialize, source)?;

                let mut category = LabeledCategory::new(&self.name, filter.clone())
                    .with_records(records.iter().cloned())
                    .refresh_on_initialize(*refresh_on_initialize);
                if let Some(provider) = provider {
                    category = category.with_provider(provider);
                }
                if let Some(source) = source {
                    category = category.with_source(Arc::clone(source));
                }
                Arc::new(category)
            }
            CategoryKind::PathConvention {
                records,
                root,
                refresh_on_initialize,
            } => {
                self.require_source(*refresh_on_initialize, source)?;

                let mut category = PathConventionCategory::new(&self.name)
                    .with_root(root)
                    .with_records(records.iter().cloned())
                    .refresh_on_initialize(*refresh_on_initialize);
                if let Some(provider) = provider {
                    category = category.with_provider(provider);
                }
                if let Some(source) = source {
                    category = category.with_source(Arc::clone(source));
                }
                Arc::new(category)
            }
        };
        Ok(category)
    }

    fn require_source(
        &self,
        refresh: bool,
        source: Option<&Arc<dyn AssetSource>>,
    ) -> Result<(), ConfigError> {
        if refresh && source.is_none() {
            return Err(ConfigError::MissingAssetSource(self.name.clone()));
        }
        Ok(())
    }
}

impl GameDatabase {
    /// Builds a database from configuration.
    ///
    /// `source` is handed to every scanned category.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a provider name is not registered, a
    /// path pattern does not compile, or a category refreshes on initialize
    /// without a source.
    pub fn from_config(
        config: &DatabaseConfig,
        providers: &ProviderRegistry,
        source: Option<Arc<dyn AssetSource>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        for category in &config.categories {
            builder = builder.with_category(category.build(providers, source.as_ref())?);
        }
        for name in &config.fallback {
            builder = builder.with_fallback(providers.require(name)?);
        }
        for name in &config.fallback_locations {
            builder = builder.with_fallback_location(providers.require(name)?);
        }

        tracing::debug!(
            categories = config.categories.len(),
            fallback = config.fallback.len(),
            fallback_locations = config.fallback_locations.len(),
            "database built from configuration"
        );
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AssetEntry, MemoryAssetSource};
    use gamedb_core::Lifetime;
    use gamedb_providers::MemoryProvider;

    const CONFIG: &str = r#"{
        "categories": [
            { "name": "audio", "provider": "sfx", "kind": "static",
              "records": [{ "id": "click", "resource_path": "ui/click" }] },
            { "name": "icons", "kind": "labeled",
              "filter": { "labels": ["icons"] }, "refresh_on_initialize": true },
            { "name": "resources", "provider": "files", "kind": "path_convention",
              "refresh_on_initialize": true }
        ],
        "fallback": ["files"],
        "fallback_locations": ["sfx"]
    }"#;

    fn providers() -> ProviderRegistry {
        let mut providers = ProviderRegistry::new();
        providers.register_provider("sfx", Arc::new(MemoryProvider::new("sfx")));
        providers.register_provider("files", Arc::new(MemoryProvider::new("files")));
        providers
    }

    fn source() -> Arc<dyn AssetSource> {
        Arc::new(MemoryAssetSource::new([
            AssetEntry::from_path("Assets/UI/sword.png").with_label("icons"),
            AssetEntry::from_path("Assets/Resources/music/theme.ogg"),
        ]))
    }

    #[test]
    fn parses_all_variants() {
        let config = DatabaseConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.categories.len(), 3);
        assert!(matches!(config.categories[0].kind, CategoryKind::Static { .. }));
        assert!(matches!(
            &config.categories[2].kind,
            CategoryKind::PathConvention { root, .. } if root == DEFAULT_RESOURCE_ROOT
        ));
        assert_eq!(config.fallback_locations, ["sfx"]);
    }

    #[tokio::test]
    async fn builds_a_working_database() {
        let config = DatabaseConfig::from_json_str(CONFIG).unwrap();
        let database = GameDatabase::from_config(&config, &providers(), Some(source())).unwrap();
        database.initialize(&Lifetime::new()).await.unwrap();

        let names: Vec<_> = database
            .categories()
            .iter()
            .map(|category| category.name().to_string())
            .collect();
        assert_eq!(names, ["audio", "icons", "resources"]);

        let audio = database.find("click");
        assert_eq!(audio.record.name, "click");
        assert_eq!(audio.record.resolved_path(), "ui/click");
        assert_eq!(database.find("sword").category_name(), Some("icons"));
        assert_eq!(
            database.find("theme").record.resolved_path(),
            "music/theme"
        );

        let fallback: Vec<_> = database
            .fallback_providers()
            .iter()
            .map(|provider| provider.name().to_string())
            .collect();
        assert_eq!(fallback, ["files", "sfx"]);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = DatabaseConfig {
            fallback: vec!["nope".to_string()],
            ..DatabaseConfig::default()
        };
        let err = GameDatabase::from_config(&config, &providers(), None).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(name) if name == "nope"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let json = r#"{ "categories": [
            { "name": "broken", "kind": "labeled", "filter": { "patterns": ["("] } }
        ] }"#;
        let config = DatabaseConfig::from_json_str(json).unwrap();
        let err = GameDatabase::from_config(&config, &providers(), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { category, .. } if category == "broken"));
    }

    #[test]
    fn refresh_without_source_is_rejected() {
        let config = DatabaseConfig::from_json_str(CONFIG).unwrap();
        let err = GameDatabase::from_config(&config, &providers(), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingAssetSource(name) if name == "icons"));
    }

    #[test]
    fn reads_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gamedb.json");
        std::fs::write(&path, CONFIG).unwrap();
        assert_eq!(DatabaseConfig::from_json_file(&path).unwrap().categories.len(), 3);

        let missing = DatabaseConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
