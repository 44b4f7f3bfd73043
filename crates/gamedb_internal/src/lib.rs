//! # gamedb Internal Library
//!
//! Re-exports the gamedb layer crates for convenience.

/// Layer 1: records, providers, lifetimes and tracing setup.
pub use gamedb_core;

/// Layer 2: built-in providers.
pub use gamedb_providers;

/// Layer 3: categories, resolution and configuration.
pub use gamedb_database;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use gamedb_core::tracing_setup::{TracingConfig, TracingFormat};
    pub use gamedb_core::{
        Asset, AssetType, EMPTY_RECORD_ID, Lifetime, LoadResult, NOT_FOUND_ERROR, Provider,
        ProviderExt, ProviderFault, Record,
    };
    pub use gamedb_database::{
        AssetEntry, AssetSource, Category, CategoryInitResult, CategorySource, CategoryState,
        DatabaseConfig, DirectoryAssetSource, GameDatabase, LabelFilter, LabeledCategory,
        MemoryAssetSource, PathConventionCategory, ProviderRegistry, ResolvedRecord,
        StaticCategory,
    };
    #[cfg(feature = "filesystem")]
    pub use gamedb_providers::FileSystemProvider;
    pub use gamedb_providers::{CachePolicy, CachingProvider, MemoryProvider};
}
