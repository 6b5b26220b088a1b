//! Object store contract
//!
//! The query layer never owns a store. It borrows one per call through the
//! [`ObjectStore`] and [`IndexHandle`] traits and performs no writes.
//!
//! # Contract
//!
//! - `index(name)` is synchronous and fails for undeclared index names
//! - `IndexHandle::get_all_keys(range)` returns primary keys for the index
//!   entries within `range`; `None` returns every key in the index
//! - `get(key)` returns the record stored under `key`, or `None`
//!
//! Every asynchronous call is a suspension point for the evaluation engine.
//!
//! [`MemoryStore`] is a complete in-memory implementation of the contract.

mod errors;
mod key;
mod memory;
mod range;

pub use errors::{StoreError, StoreResult};
pub use key::Key;
pub use memory::{MemoryStore, StoreCall};
pub use range::KeyRange;

use futures_util::future::BoxFuture;

/// A stored document
pub type Record = serde_json::Value;

/// Future returned by asynchronous store calls
pub type StoreFuture<'a, T> = BoxFuture<'a, StoreResult<T>>;

/// Handle to one named index of an object store
pub trait IndexHandle: Send + Sync {
    /// Index name
    fn name(&self) -> &str;

    /// Fetch the primary keys of all entries within `range`.
    ///
    /// Omitting the range returns every key in the index.
    fn get_all_keys(&self, range: Option<KeyRange>) -> StoreFuture<'_, Vec<Key>>;
}

/// An ordered, indexed key-value store
pub trait ObjectStore: Send + Sync {
    /// Open a named index. Fails with `StoreError::UnknownIndex` if the
    /// name is not declared.
    fn index(&self, name: &str) -> StoreResult<Box<dyn IndexHandle + '_>>;

    /// Fetch the record stored under `key`
    fn get(&self, key: &Key) -> StoreFuture<'_, Option<Record>>;
}
