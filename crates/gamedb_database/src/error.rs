//! Error types for the database.
//!
//! Lookups and loads never return these: misses, unsupported types and
//! provider failures are reported as values ([`ResolvedRecord`](crate::ResolvedRecord),
//! [`LoadResult`](gamedb_core::LoadResult)). Errors are reserved for
//! category setup, cancelled initialization and configuration defects.

/// Error raised while acquiring or populating a category.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// The category asset could not be acquired.
    #[error("failed to acquire category '{name}': {message}")]
    Acquire {
        /// Configured category name.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// Scanning the asset source failed.
    #[error("asset scan failed: {0}")]
    Source(#[from] SourceError),

    /// A path pattern in the label filter is not a valid regular expression.
    #[error("invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The category needs an asset source but none was provided.
    #[error("no asset source configured")]
    NoSource,

    /// The operation was interrupted because its lifetime ended.
    #[error("cancelled")]
    Cancelled,
}

impl CategoryError {
    /// Creates an [`Acquire`](Self::Acquire) error.
    pub fn acquire(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Acquire {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Error raised by an [`AssetSource`](crate::AssetSource) scan.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Walking the directory failed.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// The scan root does not exist or is not a directory.
    #[error("scan root '{0}' is not a directory")]
    MissingRoot(String),

    /// The scan stopped because its lifetime ended.
    #[error("scan cancelled")]
    Cancelled,

    /// Any other source-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Error in a declarative database configuration.
///
/// These are configuration defects: they are raised when the database is
/// built, not when resources are looked up.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A category or fallback entry names a provider that is not registered.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// A label filter pattern does not compile.
    #[error("category '{category}' has an invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Category name.
        category: String,
        /// The offending pattern.
        pattern: String,
        /// The regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// A category refreshes from a source but no source was supplied.
    #[error("category '{0}' refreshes on initialize but no asset source was supplied")]
    MissingAssetSource(String),

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by [`GameDatabase::initialize`](crate::GameDatabase::initialize).
///
/// Individual category failures are not errors: failed categories are logged
/// and left out of the database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The lifetime ended before every category settled. The previously
    /// published state is left untouched.
    #[error("database initialization cancelled")]
    Cancelled,
}
