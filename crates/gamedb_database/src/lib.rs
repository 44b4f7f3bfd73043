//! Categories, resolution and loading for gamedb.
//!
//! The [`GameDatabase`] owns an ordered list of [`Category`] instances and an
//! ordered chain of fallback providers. It maps resource ids to the category
//! and record that own them, and loads them through the owning category's
//! provider or, when nothing owns them, through the fallback chain.
//!
//! # Quick Start
//!
//! ```
//! use gamedb_core::{Lifetime, Record};
//! use gamedb_database::{GameDatabase, StaticCategory};
//! use gamedb_providers::MemoryProvider;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let sfx = Arc::new(MemoryProvider::new("sfx").with_asset("ui/click", vec![0u8; 4]));
//!
//! let database = GameDatabase::builder()
//!     .with_category(Arc::new(
//!         StaticCategory::new("audio")
//!             .with_record(Record::new("click").with_resource_path("ui/click"))
//!             .with_provider(sfx),
//!     ))
//!     .build();
//! database.initialize(&Lifetime::new()).await.unwrap();
//!
//! let bytes = database.load_asset::<Vec<u8>>("click", &Lifetime::new()).await;
//! assert_eq!(bytes.map(|b| b.len()), Some(4));
//! # });
//! ```
//!
//! # Modules
//!
//! - [`category`]: the category contract and its built-in variants
//! - [`source`]: asset sources scanned categories are filled from
//! - [`database`]: the registry and its resolution caches
//! - [`config`]: serde configuration and the [`ProviderRegistry`]

pub mod category;
pub mod config;
pub mod database;
pub mod error;
pub mod providers;
pub mod source;

pub use category::{
    Category, CategoryInitResult, CategorySource, CategoryState, DEFAULT_RESOURCE_ROOT,
    LabelFilter, LabeledCategory, Matcher, PathConventionCategory, RecordIndex, StaticCategory,
};
pub use config::{CategoryConfig, CategoryKind, DatabaseConfig};
pub use database::{GameDatabase, GameDatabaseBuilder, ResolvedRecord};
pub use error::{CategoryError, ConfigError, DatabaseError, SourceError};
pub use providers::ProviderRegistry;
pub use source::{AssetEntry, AssetSource, DirectoryAssetSource, MemoryAssetSource};
