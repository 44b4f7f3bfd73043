//! A runtime resource-resolution database for games.
//!
//! Maps string identifiers to typed assets through ordered categories of
//! records, each loaded by a pluggable provider, with an ordered chain of
//! fallback providers for ids no category owns.
//!
//! ```
//! use gamedb::prelude::*;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! TracingConfig::new().with_env_filter("gamedb=warn").init();
//!
//! let strings = Arc::new(MemoryProvider::new("strings").with_asset("title", "gamedb".to_string()));
//! let database = GameDatabase::builder()
//!     .with_category(Arc::new(StaticCategory::new("text").with_record(Record::new("title"))))
//!     .with_fallback(strings)
//!     .build();
//! database.initialize(&Lifetime::new()).await.unwrap();
//!
//! let title = database.load_asset::<String>("title", &Lifetime::new()).await;
//! assert_eq!(title.as_deref().map(String::as_str), Some("gamedb"));
//! # });
//! ```

pub use gamedb_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use gamedb_internal::prelude::*;
}
