//! Resource records and the empty-record sentinel.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

/// Case-insensitive string equality using Unicode lowercase mapping.
///
/// Matches `"épée"` against `"ÉPÉE"`, which an ASCII-only comparison does not.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Identifier reserved for the [empty record](Record::empty).
pub const EMPTY_RECORD_ID: &str = "EmptyRecord";

static EMPTY_RECORD: LazyLock<Arc<Record>> = LazyLock::new(|| {
    Arc::new(Record {
        id: EMPTY_RECORD_ID.to_string(),
        name: String::new(),
        resource_path: None,
        labels: Vec::new(),
    })
});

/// A single loadable entry owned by a category.
///
/// The `id` is the stable key used by category indices and resolution caches.
/// `resource_path` is an optional provider-specific key; when absent the
/// provider is handed the `id` instead (see [`resolved_path`](Self::resolved_path)).
///
/// # Matching
///
/// Two predicates exist and must not be confused:
///
/// - [`matches`](Self::matches) drives resolution. It is a case-insensitive
///   exact comparison against the id, the resource path, or any label. Case
///   folding is Unicode-aware (see [`eq_ignore_case`]).
/// - [`is_match`](Self::is_match) drives interactive search. It is a
///   case-insensitive substring test and accepts an empty query.
///
/// # Example
///
/// ```
/// use gamedb_core::Record;
///
/// let record = Record::new("sword")
///     .with_resource_path("weapons/sword")
///     .with_label("melee");
///
/// assert!(record.matches("SWORD"));
/// assert!(record.matches("melee"));
/// assert!(!record.matches("swo"));
/// assert!(record.is_match("swo"));
/// assert_eq!(record.resolved_path(), "weapons/sword");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordDef")]
pub struct Record {
    /// Stable identifier.
    pub id: String,
    /// Display name. Defaults to the id.
    pub name: String,
    /// Provider key, when it differs from the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    /// Labels the record can also be resolved by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// Serialized form; an omitted or empty name takes the id.
#[derive(Deserialize)]
struct RecordDef {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    resource_path: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

impl From<RecordDef> for Record {
    fn from(def: RecordDef) -> Self {
        let name = if def.name.is_empty() {
            def.id.clone()
        } else {
            def.name
        };
        Self {
            id: def.id,
            name,
            resource_path: def.resource_path,
            labels: def.labels,
        }
    }
}

impl Record {
    /// Creates a record whose display name equals its id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            resource_path: None,
            labels: Vec::new(),
        }
    }

    /// Returns the shared empty-record sentinel.
    ///
    /// Lookups return this instead of an absent value. It never matches any
    /// filter and reports [`is_empty`](Self::is_empty).
    #[must_use]
    pub fn empty() -> Arc<Record> {
        Arc::clone(&EMPTY_RECORD)
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the provider-specific resource path.
    #[must_use]
    pub fn with_resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = Some(path.into());
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Adds several labels.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Returns `true` for the sentinel and for records without an id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() || self.id == EMPTY_RECORD_ID
    }

    /// Key handed to a provider when loading this record.
    #[must_use]
    pub fn resolved_path(&self) -> &str {
        match self.resource_path.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => &self.id,
        }
    }

    /// Resolution predicate.
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        if filter.is_empty() || self.is_empty() {
            return false;
        }
        if eq_ignore_case(&self.id, filter) {
            return true;
        }
        if self
            .resource_path
            .as_deref()
            .is_some_and(|path| eq_ignore_case(path, filter))
        {
            return true;
        }
        self.labels.iter().any(|label| eq_ignore_case(label, filter))
    }

    /// Search predicate used for interactive filtering.
    #[must_use]
    pub fn is_match(&self, search: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        if search.is_empty() {
            return true;
        }
        let needle = search.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        contains(&self.id)
            || contains(&self.name)
            || self.labels.iter().any(|label| contains(label.as_str()))
    }
}
