//! keyquery - composable index queries over an ordered key-value store
//!
//! Predicates over named secondary indexes (`eq`, `neq`, `lt`, `lteq`, `gt`,
//! `gteq`, `between`, `between_eq`, `one_of`) combine with `and` / `or` into
//! immutable expression trees. Trees are evaluated against an externally
//! supplied [`store::ObjectStore`] and results are delivered through
//! asynchronous [`request::Request`] handles, either fully materialized or
//! one [`request::Cursor`] step at a time.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use keyquery::{Index, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new("name", &["make", "model"]));
//! let query = Index::new("make").eq("BMW").and(&Index::new("model").eq("325e"));
//! let keys = query.get_all_keys(&store).completion().await?;
//! ```

pub mod config;
pub mod observability;
pub mod query;
pub mod request;
pub mod store;

pub use config::QueryConfig;
pub use query::{Index, Query, QueryError, QueryErrorCode, QueryNode, QueryResult};
pub use request::{Cursor, ReadyState, Request};
pub use store::{Key, KeyRange, MemoryStore, ObjectStore, Record};
