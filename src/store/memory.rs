//! In-memory object store
//!
//! Records live in a `BTreeMap` keyed by primary key. Each declared index is a
//! `BTreeMap<Key, BTreeSet<Key>>` from field value to primary keys, so scans
//! return keys ordered by (index value, primary key).
//!
//! # Behavior
//!
//! - Index name is also the indexed field name
//! - Records missing an indexed field (or holding a non-key value there)
//!   are not indexed for it
//! - Every asynchronous call yields to the scheduler once before answering
//! - Every call is appended to a call log for sequencing checks
//! - Faults can be injected per key (`get`) and per index (scans)

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use super::errors::{StoreError, StoreResult};
use super::key::Key;
use super::range::KeyRange;
use super::{IndexHandle, ObjectStore, Record, StoreFuture};

/// A store call observed by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// Index range scan
    IndexScan {
        index: String,
        range: Option<KeyRange>,
    },
    /// Record fetch by primary key
    Get { key: Key },
}

/// Value-to-primary-keys mapping for one index.
#[derive(Debug, Default)]
struct IndexTree {
    tree: BTreeMap<Key, BTreeSet<Key>>,
}

impl IndexTree {
    fn insert(&mut self, value: Key, primary: Key) {
        self.tree.entry(value).or_default().insert(primary);
    }

    fn remove(&mut self, value: &Key, primary: &Key) {
        if let Some(primaries) = self.tree.get_mut(value) {
            primaries.remove(primary);
            if primaries.is_empty() {
                self.tree.remove(value);
            }
        }
    }

    fn scan(&self, range: Option<&KeyRange>) -> Vec<Key> {
        match range {
            Some(range) if range.is_empty() => Vec::new(),
            Some(range) => self
                .tree
                .range::<Key, _>(range.as_bounds())
                .flat_map(|(_, primaries)| primaries.iter().cloned())
                .collect(),
            None => self
                .tree
                .values()
                .flat_map(|primaries| primaries.iter().cloned())
                .collect(),
        }
    }

    fn entry_count(&self) -> usize {
        self.tree.values().map(|v| v.len()).sum()
    }
}

#[derive(Debug, Default)]
struct Contents {
    records: BTreeMap<Key, Record>,
    indexes: BTreeMap<String, IndexTree>,
}

#[derive(Debug, Default)]
struct Faults {
    gets: HashSet<Key>,
    indexes: HashSet<String>,
}

/// In-memory implementation of [`ObjectStore`].
#[derive(Debug)]
pub struct MemoryStore {
    key_path: String,
    contents: RwLock<Contents>,
    calls: Mutex<Vec<StoreCall>>,
    faults: Mutex<Faults>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    /// Creates an empty store whose primary key is read from `key_path`,
    /// with one index per name in `indexes`.
    pub fn new(key_path: impl Into<String>, indexes: &[&str]) -> Self {
        let contents = Contents {
            records: BTreeMap::new(),
            indexes: indexes
                .iter()
                .map(|name| (name.to_string(), IndexTree::default()))
                .collect(),
        };
        Self {
            key_path: key_path.into(),
            contents: RwLock::new(contents),
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
        }
    }

    /// Key path the primary key is read from
    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    /// Insert or replace a record. Returns its primary key.
    pub fn put(&self, record: Record) -> StoreResult<Key> {
        let raw = record
            .get(&self.key_path)
            .ok_or_else(|| StoreError::MissingKeyPath(self.key_path.clone()))?;
        let primary = Key::from_json(raw)
            .ok_or_else(|| StoreError::InvalidKey(format!("{} = {}", self.key_path, raw)))?;

        let mut contents = self
            .contents
            .write()
            .map_err(|_| StoreError::Io("store lock poisoned".into()))?;
        let Contents { records, indexes } = &mut *contents;

        if let Some(previous) = records.get(&primary) {
            for (field, tree) in indexes.iter_mut() {
                if let Some(value) = previous.get(field).and_then(Key::from_json) {
                    tree.remove(&value, &primary);
                }
            }
        }

        for (field, tree) in indexes.iter_mut() {
            if let Some(value) = record.get(field).and_then(Key::from_json) {
                tree.insert(value, primary.clone());
            }
        }

        records.insert(primary.clone(), record);
        Ok(primary)
    }

    /// Insert every record, stopping at the first failure
    pub fn put_all(&self, records: impl IntoIterator<Item = Record>) -> StoreResult<Vec<Key>> {
        records.into_iter().map(|r| self.put(r)).collect()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.contents.read().map(|c| c.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared index names, sorted
    pub fn index_names(&self) -> Vec<String> {
        self.contents
            .read()
            .map(|c| c.indexes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entries held by an index
    pub fn index_entry_count(&self, name: &str) -> Option<usize> {
        self.contents
            .read()
            .ok()
            .and_then(|c| c.indexes.get(name).map(IndexTree::entry_count))
    }

    /// Calls observed so far, in issue order
    pub fn calls(&self) -> Vec<StoreCall> {
        locked(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        locked(&self.calls).clear();
    }

    /// Make every subsequent `get` for `key` fail
    pub fn fail_get(&self, key: impl Into<Key>) {
        locked(&self.faults).gets.insert(key.into());
    }

    /// Make every subsequent scan of index `name` fail
    pub fn fail_index(&self, name: impl Into<String>) {
        locked(&self.faults).indexes.insert(name.into());
    }

    /// Remove all injected faults
    pub fn clear_faults(&self) {
        let mut faults = locked(&self.faults);
        faults.gets.clear();
        faults.indexes.clear();
    }

    fn record_call(&self, call: StoreCall) {
        locked(&self.calls).push(call);
    }

    fn scan(&self, name: &str, range: Option<&KeyRange>) -> StoreResult<Vec<Key>> {
        if locked(&self.faults).indexes.contains(name) {
            return Err(StoreError::Io(format!("scan of index '{}' failed", name)));
        }
        let contents = self
            .contents
            .read()
            .map_err(|_| StoreError::Io("store lock poisoned".into()))?;
        let tree = contents
            .indexes
            .get(name)
            .ok_or_else(|| StoreError::UnknownIndex(name.to_string()))?;
        Ok(tree.scan(range))
    }

    fn fetch(&self, key: &Key) -> StoreResult<Option<Record>> {
        if locked(&self.faults).gets.contains(key) {
            return Err(StoreError::Io(format!("get of {} failed", key)));
        }
        let contents = self
            .contents
            .read()
            .map_err(|_| StoreError::Io("store lock poisoned".into()))?;
        Ok(contents.records.get(key).cloned())
    }
}

/// Index handle borrowed from a [`MemoryStore`]
struct MemoryIndex<'a> {
    store: &'a MemoryStore,
    name: String,
}

impl IndexHandle for MemoryIndex<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_all_keys(&self, range: Option<KeyRange>) -> StoreFuture<'_, Vec<Key>> {
        self.store.record_call(StoreCall::IndexScan {
            index: self.name.clone(),
            range: range.clone(),
        });
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.store.scan(&self.name, range.as_ref())
        })
    }
}

impl ObjectStore for MemoryStore {
    fn index(&self, name: &str) -> StoreResult<Box<dyn IndexHandle + '_>> {
        let known = self
            .contents
            .read()
            .map(|c| c.indexes.contains_key(name))
            .unwrap_or(false);
        if !known {
            return Err(StoreError::UnknownIndex(name.to_string()));
        }
        Ok(Box::new(MemoryIndex {
            store: self,
            name: name.to_string(),
        }))
    }

    fn get(&self, key: &Key) -> StoreFuture<'_, Option<Record>> {
        let key = key.clone();
        self.record_call(StoreCall::Get { key: key.clone() });
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.fetch(&key)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cars() -> MemoryStore {
        let store = MemoryStore::new("name", &["make", "year"]);
        store
            .put_all(vec![
                json!({"name": "ECTO-1", "make": "BMW", "year": 1989}),
                json!({"name": "Cheesy", "make": "BMW", "year": 1984}),
                json!({"name": "Ferdinand the Bug", "make": "Volkswagen", "year": 1971}),
                json!({"name": "Nameless"}),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_put_extracts_primary_key() {
        let store = MemoryStore::new("name", &["make"]);
        let key = store.put(json!({"name": "ECTO-2", "make": "BMW"})).unwrap();
        assert_eq!(key, Key::from("ECTO-2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_rejects_missing_key_path() {
        let store = MemoryStore::new("name", &["make"]);
        let err = store.put(json!({"make": "BMW"})).unwrap_err();
        assert_eq!(err, StoreError::MissingKeyPath("name".into()));

        let err = store.put(json!({"name": ["a"]})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn test_records_without_field_not_indexed() {
        let store = cars();
        assert_eq!(store.len(), 4);
        assert_eq!(store.index_entry_count("make"), Some(3));
        assert_eq!(store.index_entry_count("year"), Some(3));
    }

    #[test]
    fn test_replace_reindexes() {
        let store = cars();
        store
            .put(json!({"name": "Cheesy", "make": "Subaru", "year": 1984}))
            .unwrap();

        let contents = store.contents.read().unwrap();
        let make = &contents.indexes["make"];
        assert_eq!(make.scan(Some(&KeyRange::only(Key::from("BMW")))), vec![Key::from("ECTO-1")]);
        assert_eq!(make.scan(Some(&KeyRange::only(Key::from("Subaru")))), vec![Key::from("Cheesy")]);
        assert_eq!(make.entry_count(), 3);
    }

    #[test]
    fn test_scan_orders_by_value_then_primary_key() {
        let store = cars();
        let keys = store.scan("make", None).unwrap();
        assert_eq!(
            keys,
            vec![Key::from("Cheesy"), Key::from("ECTO-1"), Key::from("Ferdinand the Bug")]
        );

        let keys = store.scan("year", Some(&KeyRange::upper_bound(Key::from(1989), true))).unwrap();
        assert_eq!(keys, vec![Key::from("Ferdinand the Bug"), Key::from("Cheesy")]);
    }

    #[test]
    fn test_scan_empty_range() {
        let store = cars();
        let range = KeyRange::bound(Key::from(1989), Key::from(1971), false, false);
        assert!(store.scan("year", Some(&range)).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_index_rejected() {
        let store = cars();
        assert!(matches!(
            store.index("colour"),
            Err(StoreError::UnknownIndex(name)) if name == "colour"
        ));
        assert_eq!(store.index_names(), vec!["make".to_string(), "year".to_string()]);
    }

    #[tokio::test]
    async fn test_async_calls_are_logged() {
        let store = cars();
        let index = store.index("make").unwrap();
        let keys = index
            .get_all_keys(Some(KeyRange::only(Key::from("Volkswagen"))))
            .await
            .unwrap();
        assert_eq!(keys, vec![Key::from("Ferdinand the Bug")]);

        let record = store.get(&Key::from("Cheesy")).await.unwrap();
        assert_eq!(record.unwrap()["year"], 1984);
        assert!(store.get(&Key::from("Missing")).await.unwrap().is_none());

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::IndexScan {
                    index: "make".into(),
                    range: Some(KeyRange::only(Key::from("Volkswagen"))),
                },
                StoreCall::Get { key: Key::from("Cheesy") },
                StoreCall::Get { key: Key::from("Missing") },
            ]
        );

        store.clear_calls();
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let store = cars();
        store.fail_get("Cheesy");
        store.fail_index("year");

        assert!(matches!(
            store.get(&Key::from("Cheesy")).await,
            Err(StoreError::Io(_))
        ));
        assert!(store.get(&Key::from("ECTO-1")).await.unwrap().is_some());

        let year = store.index("year").unwrap();
        assert!(matches!(year.get_all_keys(None).await, Err(StoreError::Io(_))));

        store.clear_faults();
        assert!(store.get(&Key::from("Cheesy")).await.is_ok());
    }
}
