//! Shared fixtures: the five sample cars, keyed by name.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use keyquery::{Cursor, Key, MemoryStore, Query, QueryResult, Request};
use serde_json::{json, Value};

pub fn sample_records() -> Vec<Value> {
    vec![
        json!({"name": "ECTO-1", "year": 1989, "make": "BMW", "model": "325i", "races": 1}),
        json!({"name": "ECTO-2", "year": "1984ish", "make": "BMW", "model": "325e", "races": 3}),
        json!({"name": "Cheesy", "year": 1984, "make": "BMW", "model": "325e", "races": 9}),
        json!({"name": "Pikachubaru", "year": 2001, "make": "Subaru", "model": "Legacy Outback", "races": 5}),
        json!({"name": "Ferdinand the Bug", "year": 1971, "make": "Volkswagen", "model": "Super Beetle", "races": 0}),
    ]
}

pub fn car_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new("name", &["year", "make", "model", "races"]);
    store.put_all(sample_records()).unwrap();
    store.clear_calls();
    Arc::new(store)
}

pub fn names(names: &[&str]) -> BTreeSet<Key> {
    names.iter().map(|n| Key::from(*n)).collect()
}

pub fn key_set(keys: Vec<Key>) -> BTreeSet<Key> {
    keys.into_iter().collect()
}

pub async fn all_keys(query: &Query, store: &Arc<MemoryStore>) -> QueryResult<Vec<Key>> {
    query.get_all_keys(store).completion().await
}

/// Drive a cursor request to exhaustion, collecting each step's key.
pub async fn drain_keys(request: &Request<Option<Cursor<MemoryStore>>>) -> QueryResult<Vec<Key>> {
    let mut keys = Vec::new();
    while let Some(cursor) = request.completion().await? {
        keys.push(cursor.key().cloned().expect("positioned cursor has a key"));
        cursor.advance();
    }
    Ok(keys)
}

/// Drive a record cursor to exhaustion, collecting (key, record) pairs.
pub async fn drain_records(
    request: &Request<Option<Cursor<MemoryStore>>>,
) -> QueryResult<Vec<(Key, Option<Value>)>> {
    let mut rows = Vec::new();
    while let Some(cursor) = request.completion().await? {
        rows.push((cursor.key().cloned().unwrap(), cursor.value().cloned()));
        cursor.advance();
    }
    Ok(rows)
}
