//! Categories: named partitions of the resource space.
//!
//! A category owns an ordered record list and, optionally, the provider its
//! records are loaded through. Every variant shares the same lookup contract:
//!
//! - [`Category::find`] returns the **last** declared record accepting the
//!   filter, or the [`Record::empty`] sentinel. Later records override
//!   earlier ones.
//! - [`Category::find_all`] returns every accepting record in declaration
//!   order.
//! - Both are memoized until the next [`Category::initialize`], which rebuilds
//!   the index from scratch.
//!
//! Initialization is two-phase. [`Category::prepare`] builds the new index
//! off to the side; [`Category::commit`] publishes it and
//! [`Category::discard`] throws it away. The database commits every category
//! only once all of them have settled, so a cancelled initialization leaves
//! every published index untouched.
//!
//! Variants only differ in how records are populated:
//!
//! | Variant | Population |
//! |---------|------------|
//! | [`StaticCategory`] | Records supplied directly |
//! | [`LabeledCategory`] | [`AssetSource`](crate::AssetSource) scan filtered by labels, folders and path patterns |
//! | [`PathConventionCategory`] | Source entries under a conventional root directory |

mod index;
mod labeled;
mod path_convention;
mod static_list;

pub use index::{Matcher, RecordIndex};
pub use labeled::{LabelFilter, LabeledCategory};
pub use path_convention::{DEFAULT_RESOURCE_ROOT, PathConventionCategory};
pub use static_list::StaticCategory;

use crate::error::CategoryError;
use async_trait::async_trait;
use gamedb_core::{Lifetime, Provider, Record};
use std::sync::Arc;

/// Lifecycle of a category within one database initialization.
///
/// `Unconfigured -> Initializing -> Ready | Failed`. The only way back to
/// `Initializing` is another initialization, which rebuilds the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CategoryState {
    /// Never initialized.
    #[default]
    Unconfigured,
    /// Initialization in progress.
    Initializing,
    /// Index published; the category serves lookups.
    Ready,
    /// Initialization failed; the database excludes the category.
    Failed,
}

/// Outcome of [`Category::initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInitResult {
    /// Whether the category is ready to serve lookups.
    pub complete: bool,
    /// Name of the category that produced this result.
    pub category_name: String,
    /// Human-readable failure description when `complete` is `false`.
    pub error: Option<String>,
}

impl CategoryInitResult {
    /// A successful result.
    #[must_use]
    pub fn ready(category_name: impl Into<String>) -> Self {
        Self {
            complete: true,
            category_name: category_name.into(),
            error: None,
        }
    }

    /// A failed result.
    #[must_use]
    pub fn failed(category_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            complete: false,
            category_name: category_name.into(),
            error: Some(error.into()),
        }
    }
}

/// A named, provider-backed collection of records.
#[async_trait]
pub trait Category: Send + Sync + 'static {
    /// Unique name within a database.
    fn name(&self) -> &str;

    /// Provider used to load this category's records, if any.
    ///
    /// Loads resolved to a category without a provider go through the
    /// database fallback chain.
    fn provider(&self) -> Option<Arc<dyn Provider>>;

    /// Declared records, in declaration order.
    fn records(&self) -> Vec<Arc<Record>>;

    /// Current lifecycle state.
    fn state(&self) -> CategoryState;

    /// Builds the next lookup index without publishing it.
    ///
    /// Failure is reported through the result, never as an error. Lookups
    /// keep answering from the published index until [`commit`](Self::commit).
    async fn prepare(&self, lifetime: &Lifetime) -> CategoryInitResult;

    /// Publishes what [`prepare`](Self::prepare) staged and clears memoized lookups.
    fn commit(&self);

    /// Drops what [`prepare`](Self::prepare) staged.
    fn discard(&self);

    /// Prepares and immediately commits.
    async fn initialize(&self, lifetime: &Lifetime) -> CategoryInitResult {
        let result = self.prepare(lifetime).await;
        self.commit();
        result
    }

    /// Last record accepting `filter`, or the empty sentinel.
    fn find(&self, filter: &str) -> Arc<Record>;

    /// All records accepting `filter`, in declaration order.
    fn find_all(&self, filter: &str) -> Vec<Arc<Record>>;

    /// Record indexed under exactly `id`.
    fn get(&self, id: &str) -> Option<Arc<Record>>;

    /// Returns `true` if `find(id)` yields a real record.
    fn has(&self, id: &str) -> bool {
        !self.find(id).is_empty()
    }

    /// Records whose id, name or labels contain `text`, for interactive filtering.
    ///
    /// This is not resolution: it matches substrings and never affects
    /// [`find`](Self::find).
    fn search(&self, text: &str) -> Vec<Arc<Record>> {
        self.records()
            .into_iter()
            .filter(|record| record.is_match(text))
            .collect()
    }

    /// Re-populates declared records from the category's asset source.
    ///
    /// Returns the number of declared records. Categories without a source
    /// keep their records.
    async fn fill(&self, _lifetime: &Lifetime) -> Result<usize, CategoryError> {
        Ok(self.records().len())
    }
}

/// Supplies an instantiated category to the database.
///
/// This is where a host plugs in whatever locates and deserializes category
/// assets. An already-built `Arc<dyn Category>` is its own source.
#[async_trait]
pub trait CategorySource: Send + Sync + 'static {
    /// Name used in diagnostics when acquisition fails.
    fn label(&self) -> &str;

    /// Produces the category.
    async fn acquire(&self, lifetime: &Lifetime) -> Result<Arc<dyn Category>, CategoryError>;
}

#[async_trait]
impl CategorySource for Arc<dyn Category> {
    fn label(&self) -> &str {
        Category::name(self.as_ref())
    }

    async fn acquire(&self, _lifetime: &Lifetime) -> Result<Arc<dyn Category>, CategoryError> {
        Ok(Arc::clone(self))
    }
}
