//! Evaluation of query trees against an object store
//!
//! # Sequencing (strict)
//!
//! 1. Predicate: one range scan on the named index
//! 2. Negated predicate: equality scan first, full index scan second,
//!    result is `all - matching`
//! 3. Intersection / Union: left subtree fully evaluated before right
//!
//! Every store call is awaited before the next is issued, so a single
//! evaluation never has more than one store call in flight. The first store
//! failure aborts the evaluation.

use futures_util::future::BoxFuture;

use super::ast::QueryNode;
use super::bounds::ScanPlan;
use super::errors::{QueryError, QueryResult};
use super::set_ops;
use crate::config::QueryConfig;
use crate::observability::Event;
use crate::store::{IndexHandle, Key, KeyRange, ObjectStore};

/// Walks a query tree, issuing store calls and combining key sets.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    store: &'a dyn ObjectStore,
    config: &'a QueryConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &'a QueryConfig) -> Self {
        Self { store, config }
    }

    /// Check that every index referenced by `node` exists on the store
    pub fn validate(&self, node: &QueryNode) -> QueryResult<()> {
        for name in node.index_names() {
            self.store
                .index(name)
                .map_err(|e| QueryError::from_store(Some(name), e))?;
        }
        Ok(())
    }

    /// Evaluate `node` into the set of matching primary keys
    pub fn keys(self, node: &'a QueryNode) -> BoxFuture<'a, QueryResult<Vec<Key>>> {
        Box::pin(async move {
            match node {
                QueryNode::IndexPredicate { index, op } => {
                    let handle = self
                        .store
                        .index(index)
                        .map_err(|e| QueryError::from_store(Some(index.as_str()), e))?;
                    match ScanPlan::for_operator(op) {
                        ScanPlan::Range(range) => self.scan(handle.as_ref(), Some(range)).await,
                        ScanPlan::Complement(range) => {
                            let matching = self.scan(handle.as_ref(), Some(range)).await?;
                            let all = self.scan(handle.as_ref(), None).await?;
                            Ok(set_ops::difference(all, matching))
                        }
                    }
                }
                QueryNode::Intersection(left, right) => {
                    let left_keys = self.keys(left).await?;
                    let right_keys = self.keys(right).await?;
                    Ok(set_ops::intersection(left_keys, right_keys))
                }
                QueryNode::Union(left, right) => {
                    let left_keys = self.keys(left).await?;
                    let right_keys = self.keys(right).await?;
                    Ok(set_ops::union(left_keys, right_keys))
                }
            }
        })
    }

    async fn scan(
        &self,
        handle: &dyn IndexHandle,
        range: Option<KeyRange>,
    ) -> QueryResult<Vec<Key>> {
        let range_desc = range
            .as_ref()
            .map(KeyRange::to_string)
            .unwrap_or_else(|| "ALL".to_string());
        self.config
            .log(Event::IndexScan, &[("index", handle.name()), ("range", range_desc.as_str())]);

        handle
            .get_all_keys(range)
            .await
            .map_err(|e| QueryError::from_store(Some(handle.name()), e))
    }
}
