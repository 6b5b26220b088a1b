//! Query algebra
//!
//! Predicates over named indexes, combined with AND / OR into immutable
//! trees and evaluated lazily against an [`ObjectStore`].
//!
//! # Building
//!
//! ```ignore
//! let bmw = Index::new("make").eq("BMW");
//! let query = bmw.and(&Index::new("model").eq("325e"));
//! let keys = query.get_all_keys(&store).completion().await?;
//! ```
//!
//! # Evaluation
//!
//! - Predicates become one index range scan (see `bounds`)
//! - `neq` scans the equality range, then the whole index, and subtracts
//! - AND / OR evaluate left then right and intersect / unite the key sets
//! - `one_of` is a left fold of `eq` predicates with OR

mod ast;
mod bounds;
mod errors;
mod evaluate;
mod set_ops;

pub use ast::{Operator, QueryNode};
pub use bounds::{key_range, ScanPlan};
pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity as ErrorSeverity};
pub use evaluate::Evaluator;
pub use set_ops::{difference, intersection, union};

use std::fmt;
use std::sync::Arc;

use crate::config::QueryConfig;
use crate::request::{terminal, Cursor, Request};
use crate::store::{Key, ObjectStore, Record};

/// Predicate builder for one named index
#[derive(Debug, Clone)]
pub struct Index {
    name: String,
}

impl Index {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn predicate(&self, op: Operator) -> Query {
        Query::from_node(QueryNode::predicate(self.name.clone(), op))
    }

    /// index = value
    pub fn eq(&self, value: impl Into<Key>) -> Query {
        self.predicate(Operator::Eq(value.into()))
    }

    /// index != value
    pub fn neq(&self, value: impl Into<Key>) -> Query {
        self.predicate(Operator::NotEq(value.into()))
    }

    /// index < value
    pub fn lt(&self, value: impl Into<Key>) -> Query {
        self.predicate(Operator::Lt(value.into()))
    }

    /// index <= value
    pub fn lteq(&self, value: impl Into<Key>) -> Query {
        self.predicate(Operator::LtEq(value.into()))
    }

    /// index > value
    pub fn gt(&self, value: impl Into<Key>) -> Query {
        self.predicate(Operator::Gt(value.into()))
    }

    /// index >= value
    pub fn gteq(&self, value: impl Into<Key>) -> Query {
        self.predicate(Operator::GtEq(value.into()))
    }

    /// lower < index < upper
    pub fn between(&self, lower: impl Into<Key>, upper: impl Into<Key>) -> Query {
        self.predicate(Operator::Between(lower.into(), upper.into()))
    }

    /// lower <= index <= upper
    pub fn between_eq(&self, lower: impl Into<Key>, upper: impl Into<Key>) -> Query {
        self.predicate(Operator::BetweenEq(lower.into(), upper.into()))
    }

    /// index equal to any of `values`.
    ///
    /// Builds `eq(v0) OR eq(v1) OR ...`, folded from the left. An empty list
    /// is rejected.
    pub fn one_of<I, K>(&self, values: I) -> QueryResult<Query>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let mut values = values.into_iter();
        let first = values.next().ok_or_else(|| {
            QueryError::invalid_query(format!(
                "one_of on index '{}' requires at least one value",
                self.name
            ))
        })?;
        Ok(values.fold(self.eq(first), |query, value| query.or(&self.eq(value))))
    }
}

/// An immutable query expression.
///
/// Cloning is cheap: the tree and config are shared.
#[derive(Debug, Clone)]
pub struct Query {
    node: Arc<QueryNode>,
    config: Arc<QueryConfig>,
}

impl Query {
    /// Wrap an expression tree with the default config
    pub fn from_node(node: QueryNode) -> Self {
        Self {
            node: Arc::new(node),
            config: Arc::new(QueryConfig::default()),
        }
    }

    /// Replace the config used when this query is evaluated
    pub fn with_config(self, config: QueryConfig) -> Self {
        Self {
            node: self.node,
            config: Arc::new(config),
        }
    }

    pub fn node(&self) -> &QueryNode {
        &self.node
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub(crate) fn shared_node(&self) -> Arc<QueryNode> {
        Arc::clone(&self.node)
    }

    pub(crate) fn shared_config(&self) -> Arc<QueryConfig> {
        Arc::clone(&self.config)
    }

    /// Keys matched by both queries. Keeps this query's config.
    pub fn and(&self, other: &Query) -> Query {
        Query {
            node: Arc::new(QueryNode::Intersection(
                Arc::clone(&self.node),
                Arc::clone(&other.node),
            )),
            config: Arc::clone(&self.config),
        }
    }

    /// Keys matched by either query. Keeps this query's config.
    pub fn or(&self, other: &Query) -> Query {
        Query {
            node: Arc::new(QueryNode::Union(
                Arc::clone(&self.node),
                Arc::clone(&other.node),
            )),
            config: Arc::clone(&self.config),
        }
    }

    /// Evaluate directly, without the request protocol
    pub async fn evaluate(&self, store: &dyn ObjectStore) -> QueryResult<Vec<Key>> {
        let evaluator = Evaluator::new(store, &self.config);
        if self.config.validate_indexes {
            evaluator.validate(&self.node)?;
        }
        evaluator.keys(&self.node).await
    }

    /// Cursor over matching records
    pub fn open_cursor<S>(&self, store: &Arc<S>) -> Request<Option<Cursor<S>>>
    where
        S: ObjectStore + 'static,
    {
        terminal::open_cursor(self, store, false)
    }

    /// Cursor over matching keys only
    pub fn open_key_cursor<S>(&self, store: &Arc<S>) -> Request<Option<Cursor<S>>>
    where
        S: ObjectStore + 'static,
    {
        terminal::open_cursor(self, store, true)
    }

    /// All matching records, in evaluation order
    pub fn get_all<S>(&self, store: &Arc<S>) -> Request<Vec<Record>>
    where
        S: ObjectStore + 'static,
    {
        terminal::get_all(self, store)
    }

    /// All matching keys
    pub fn get_all_keys<S>(&self, store: &Arc<S>) -> Request<Vec<Key>>
    where
        S: ObjectStore + 'static,
    {
        terminal::get_all_keys(self, store)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node)
    }
}
