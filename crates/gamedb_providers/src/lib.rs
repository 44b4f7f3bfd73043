//! Built-in [`Provider`](gamedb_core::Provider) implementations.
//!
//! Providers are the pluggable loading strategies behind categories and the
//! database fallback chain. The database only calls `supports` and `load`; how
//! a provider finds its bytes is its own business.
//!
//! # Supported Providers
//!
//! | Provider | Feature Flag | Description |
//! |----------|--------------|-------------|
//! | [`MemoryProvider`] | always | Assets stored in an in-process map |
//! | [`FileSystemProvider`] | `filesystem` (default) | Files under a root directory |
//! | [`CachingProvider`] | always | Process-wide memoizing decorator |
//!
//! # Usage
//!
//! ```no_run
//! # #[cfg(feature = "filesystem")]
//! # {
//! use gamedb_providers::{CachingProvider, FileSystemProvider};
//!
//! // Drop entries cached by a previous session before building the database.
//! gamedb_providers::reset_shared_cache();
//!
//! let provider = CachingProvider::new(
//!     FileSystemProvider::new("assets/Resources")
//!         .with_extension("json")
//!         .with_extension("txt"),
//! );
//! # let _ = provider;
//! # }
//! ```

mod caching;
mod memory;

#[cfg(feature = "filesystem")]
mod filesystem;

pub use caching::{CachePolicy, CachingProvider, reset_shared_cache};
pub use memory::MemoryProvider;

#[cfg(feature = "filesystem")]
pub use filesystem::FileSystemProvider;
