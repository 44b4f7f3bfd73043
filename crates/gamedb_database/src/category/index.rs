use super::CategoryState;
use gamedb_core::Record;
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Predicate deciding whether a record answers a filter.
pub type Matcher = fn(&Record, &str) -> bool;

/// Published, read-only view of a category's records.
///
/// Memoized lookups live next to the records they were computed from, so
/// publishing a new snapshot drops them in the same swap.
#[derive(Default)]
struct IndexSnapshot {
    records: Vec<Arc<Record>>,
    by_id: HashMap<String, Arc<Record>>,
    find_cache: Mutex<HashMap<String, Arc<Record>>>,
    find_all_cache: Mutex<HashMap<String, Vec<Arc<Record>>>>,
}

/// Outcome of an initialization waiting to be committed.
enum Staged {
    Ready {
        snapshot: Arc<IndexSnapshot>,
        redeclare: bool,
    },
    Failed,
}

/// Record storage and lookup index shared by the built-in categories.
///
/// Declared records can change at any time; lookups only see them once a
/// snapshot staged by [`prepare`](Self::prepare) is published by
/// [`commit`](Self::commit) under one write. A reader never observes a
/// half-built index, and [`discard`](Self::discard) drops a staged snapshot
/// without touching the published one.
pub struct RecordIndex {
    declared: RwLock<Vec<Arc<Record>>>,
    published: RwLock<Arc<IndexSnapshot>>,
    staged: Mutex<Option<Staged>>,
    state: RwLock<CategoryState>,
    settled: RwLock<CategoryState>,
    matcher: Matcher,
}

impl RecordIndex {
    /// Creates an index over `records` using [`Record::matches`].
    #[must_use]
    pub fn new(records: Vec<Arc<Record>>) -> Self {
        Self {
            declared: RwLock::new(records),
            published: RwLock::new(Arc::default()),
            staged: Mutex::new(None),
            state: RwLock::new(CategoryState::Unconfigured),
            settled: RwLock::new(CategoryState::Unconfigured),
            matcher: |record, filter| record.matches(filter),
        }
    }

    /// Replaces the match predicate.
    #[must_use]
    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Declared records, in declaration order.
    #[must_use]
    pub fn declared(&self) -> Vec<Arc<Record>> {
        self.declared.read().clone()
    }

    /// Replaces the declared records. Takes effect at the next rebuild.
    pub fn set_declared(&self, records: Vec<Arc<Record>>) {
        *self.declared.write() = records;
    }

    /// Appends a declared record. Takes effect at the next rebuild.
    pub fn push(&self, record: Arc<Record>) {
        self.declared.write().push(record);
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CategoryState {
        *self.state.read()
    }

    /// Marks the start of an initialization.
    pub fn begin(&self) {
        self.staged.lock().take();
        *self.state.write() = CategoryState::Initializing;
    }

    /// Stages a failed initialization. The published snapshot is kept.
    pub fn fail(&self) {
        *self.staged.lock() = Some(Staged::Failed);
    }

    /// Builds a snapshot from the declared records and stages it.
    ///
    /// Duplicate ids resolve to the last declared record. Nothing is visible
    /// to lookups until [`commit`](Self::commit). Returns the number of
    /// indexed ids.
    pub fn prepare(&self) -> usize {
        self.stage(self.declared(), false)
    }

    /// Stages a snapshot of `records`, which also become the declared
    /// records on [`commit`](Self::commit).
    pub fn prepare_from(&self, records: Vec<Arc<Record>>) -> usize {
        self.stage(records, true)
    }

    fn stage(&self, records: Vec<Arc<Record>>, redeclare: bool) -> usize {
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records.iter().filter(|record| !record.is_empty()) {
            by_id.insert(record.id.clone(), Arc::clone(record));
        }
        let indexed = by_id.len();

        let snapshot = IndexSnapshot {
            records,
            by_id,
            ..IndexSnapshot::default()
        };
        *self.staged.lock() = Some(Staged::Ready {
            snapshot: Arc::new(snapshot),
            redeclare,
        });
        indexed
    }

    /// Applies the staged outcome.
    ///
    /// A staged snapshot replaces the published one, dropping memoized
    /// lookups; a staged failure only changes the state. No-op when nothing
    /// is staged.
    pub fn commit(&self) {
        let Some(staged) = self.staged.lock().take() else {
            return;
        };
        let state = match staged {
            Staged::Ready {
                snapshot,
                redeclare,
            } => {
                if redeclare {
                    *self.declared.write() = snapshot.records.clone();
                }
                *self.published.write() = snapshot;
                CategoryState::Ready
            }
            Staged::Failed => CategoryState::Failed,
        };
        *self.state.write() = state;
        *self.settled.write() = state;
    }

    /// Drops the staged outcome and restores the last committed state.
    pub fn discard(&self) {
        self.staged.lock().take();
        *self.state.write() = *self.settled.read();
    }

    /// Stages and commits in one step. Returns the number of indexed ids.
    pub fn rebuild(&self) -> usize {
        let indexed = self.prepare();
        self.commit();
        indexed
    }

    fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.published.read())
    }

    /// Last published record accepting `filter`, or the empty sentinel.
    #[must_use]
    pub fn find(&self, filter: &str) -> Arc<Record> {
        let snapshot = self.snapshot();
        if let Some(hit) = snapshot.find_cache.lock().get(filter) {
            return Arc::clone(hit);
        }

        let found = snapshot
            .records
            .iter()
            .rev()
            .find(|record| (self.matcher)(record, filter))
            .cloned()
            .unwrap_or_else(Record::empty);

        snapshot
            .find_cache
            .lock()
            .insert(filter.to_string(), Arc::clone(&found));
        found
    }

    /// Every published record accepting `filter`, in declaration order.
    #[must_use]
    pub fn find_all(&self, filter: &str) -> Vec<Arc<Record>> {
        let snapshot = self.snapshot();
        if let Some(hit) = snapshot.find_all_cache.lock().get(filter) {
            return hit.clone();
        }

        let found: Vec<_> = snapshot
            .records
            .iter()
            .filter(|record| (self.matcher)(record, filter))
            .cloned()
            .collect();

        snapshot
            .find_all_cache
            .lock()
            .insert(filter.to_string(), found.clone());
        found
    }

    /// Published record indexed under exactly `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Record>> {
        self.snapshot().by_id.get(id).cloned()
    }

    /// Number of published records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().records.len()
    }

    /// Returns `true` if no records are published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Debug for RecordIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordIndex")
            .field("declared", &self.declared.read().len())
            .field("published", &self.len())
            .field("state", &self.state())
            .field("staged", &self.staged.lock().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn index(records: impl IntoIterator<Item = Record>) -> RecordIndex {
        RecordIndex::new(records.into_iter().map(Arc::new).collect())
    }

    #[test]
    fn lookups_are_empty_before_rebuild() {
        let index = index([Record::new("a")]);
        assert!(index.find("a").is_empty());
        assert!(index.get("a").is_none());
        assert_eq!(index.state(), CategoryState::Unconfigured);
    }

    #[test]
    fn rebuild_publishes_declared_records() {
        let index = index([Record::new("a"), Record::new("b")]);
        assert_eq!(index.rebuild(), 2);
        assert_eq!(index.state(), CategoryState::Ready);
        assert_eq!(index.find("B").id, "b");
        assert_eq!(index.get("a").map(|record| record.id.clone()).as_deref(), Some("a"));
    }

    #[test]
    fn duplicate_ids_keep_the_last_record() {
        let index = index([
            Record::new("a").with_name("first"),
            Record::new("a").with_name("second"),
        ]);
        assert_eq!(index.rebuild(), 1);
        assert_eq!(index.get("a").unwrap().name, "second");
    }

    #[test]
    fn find_is_memoized_until_rebuild() {
        let index = index([Record::new("a")]);
        index.rebuild();
        let first = index.find("a");
        let second = index.find("a");
        assert!(Arc::ptr_eq(&first, &second));

        index.set_declared(vec![Arc::new(Record::new("a").with_name("replaced"))]);
        assert!(Arc::ptr_eq(&index.find("a"), &first));

        index.rebuild();
        assert_eq!(index.find("a").name, "replaced");
    }

    #[test]
    fn find_all_keeps_declaration_order() {
        let index = index([
            Record::new("one").with_label("ui"),
            Record::new("two"),
            Record::new("three").with_label("UI"),
        ]);
        index.rebuild();
        let ids: Vec<_> = index.find_all("ui").iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, ["one", "three"]);
    }

    #[test]
    fn fail_keeps_published_snapshot() {
        let index = index([Record::new("a")]);
        index.rebuild();
        index.begin();
        index.set_declared(Vec::new());
        index.fail();
        assert_eq!(index.state(), CategoryState::Initializing);
        index.commit();
        assert_eq!(index.state(), CategoryState::Failed);
        assert_eq!(index.find("a").id, "a");
    }

    #[test]
    fn prepared_snapshot_is_invisible_until_commit() {
        let index = index([Record::new("a")]);
        index.rebuild();
        assert_eq!(index.find("a").id, "a");

        index.begin();
        index.set_declared(vec![Arc::new(Record::new("b"))]);
        assert_eq!(index.prepare(), 1);
        assert_eq!(index.find("a").id, "a");
        assert!(index.find("b").is_empty());
        assert!(index.get("b").is_none());

        index.commit();
        assert!(index.find("a").is_empty());
        assert_eq!(index.find("b").id, "b");
        assert_eq!(index.state(), CategoryState::Ready);
    }

    #[test]
    fn discard_restores_committed_state() {
        let index = index([Record::new("a")]);
        index.rebuild();

        index.begin();
        index.set_declared(vec![Arc::new(Record::new("b"))]);
        index.prepare();
        index.discard();
        assert_eq!(index.state(), CategoryState::Ready);
        assert_eq!(index.find("a").id, "a");

        // Nothing staged any more: a later commit changes nothing.
        index.commit();
        assert!(index.find("b").is_empty());
    }

    #[test]
    fn prepare_from_redeclares_on_commit() {
        let index = index([Record::new("a")]);
        index.rebuild();

        index.prepare_from(vec![Arc::new(Record::new("scanned"))]);
        assert_eq!(index.declared().len(), 1);
        assert_eq!(index.declared()[0].id, "a");
        index.discard();
        assert_eq!(index.declared()[0].id, "a");

        index.prepare_from(vec![Arc::new(Record::new("scanned"))]);
        index.commit();
        assert_eq!(index.declared()[0].id, "scanned");
        assert_eq!(index.find("scanned").id, "scanned");
    }

    #[test]
    fn custom_matcher_widens_lookup() {
        let index = index([Record::new("id-1").with_name("Sword")])
            .with_matcher(|record, filter| record.name == filter);
        index.rebuild();
        assert_eq!(index.find("Sword").id, "id-1");
        assert!(index.find("id-1").is_empty());
    }

    proptest! {
        #[test]
        fn find_returns_last_matching_record(count in 1usize..16, tagged in prop::collection::vec(any::<bool>(), 16)) {
            let records: Vec<_> = (0..count)
                .map(|i| {
                    let record = Record::new(format!("r{i}"));
                    if tagged[i] { record.with_label("shared") } else { record }
                })
                .collect();
            let expected = records
                .iter()
                .rev()
                .find(|record| !record.labels.is_empty())
                .map(|record| record.id.clone());

            let index = index(records);
            index.rebuild();
            let found = index.find("shared");
            match expected {
                Some(id) => prop_assert_eq!(&found.id, &id),
                None => prop_assert!(found.is_empty()),
            }
        }
    }
}
