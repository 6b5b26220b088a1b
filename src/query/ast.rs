//! Query expression tree
//!
//! A query is an immutable tree: leaves are predicates over one named index,
//! internal nodes intersect or unite two subtrees. Subtrees are shared through
//! `Arc`, so one predicate can take part in any number of combinations.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::store::Key;

/// Comparison applied to the values of one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// index = value
    Eq(Key),
    /// index != value (complement of `Eq` within the index)
    NotEq(Key),
    /// index < value
    Lt(Key),
    /// index <= value
    LtEq(Key),
    /// index > value
    Gt(Key),
    /// index >= value
    GtEq(Key),
    /// lower < index < upper
    Between(Key, Key),
    /// lower <= index <= upper
    BetweenEq(Key, Key),
}

impl Operator {
    /// Returns the operation name
    pub fn op_name(&self) -> &'static str {
        match self {
            Operator::Eq(_) => "eq",
            Operator::NotEq(_) => "neq",
            Operator::Lt(_) => "lt",
            Operator::LtEq(_) => "lteq",
            Operator::Gt(_) => "gt",
            Operator::GtEq(_) => "gteq",
            Operator::Between(..) => "between",
            Operator::BetweenEq(..) => "between_eq",
        }
    }

    /// Operands in declaration order
    pub fn operands(&self) -> Vec<&Key> {
        match self {
            Operator::Eq(v)
            | Operator::NotEq(v)
            | Operator::Lt(v)
            | Operator::LtEq(v)
            | Operator::Gt(v)
            | Operator::GtEq(v) => vec![v],
            Operator::Between(lower, upper) | Operator::BetweenEq(lower, upper) => {
                vec![lower, upper]
            }
        }
    }

    /// Returns true if evaluation needs the index complement
    pub fn is_negation(&self) -> bool {
        matches!(self, Operator::NotEq(_))
    }

    fn describe(&self, index: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Eq(v) => write!(f, "{} = {}", index, v),
            Operator::NotEq(v) => write!(f, "{} != {}", index, v),
            Operator::Lt(v) => write!(f, "{} < {}", index, v),
            Operator::LtEq(v) => write!(f, "{} <= {}", index, v),
            Operator::Gt(v) => write!(f, "{} > {}", index, v),
            Operator::GtEq(v) => write!(f, "{} >= {}", index, v),
            Operator::Between(lower, upper) => write!(f, "{} < {} < {}", lower, index, upper),
            Operator::BetweenEq(lower, upper) => {
                write!(f, "{} <= {} <= {}", lower, index, upper)
            }
        }
    }
}

/// A node of the query expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    /// Predicate over a single index
    IndexPredicate { index: String, op: Operator },
    /// Keys matched by both sides
    Intersection(Arc<QueryNode>, Arc<QueryNode>),
    /// Keys matched by either side
    Union(Arc<QueryNode>, Arc<QueryNode>),
}

impl QueryNode {
    /// Create a predicate leaf
    pub fn predicate(index: impl Into<String>, op: Operator) -> Self {
        QueryNode::IndexPredicate {
            index: index.into(),
            op,
        }
    }

    /// Every index name referenced by the tree, sorted
    pub fn index_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_index_names(&mut names);
        names
    }

    fn collect_index_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            QueryNode::IndexPredicate { index, .. } => {
                names.insert(index.as_str());
            }
            QueryNode::Intersection(left, right) | QueryNode::Union(left, right) => {
                left.collect_index_names(names);
                right.collect_index_names(names);
            }
        }
    }

    /// Number of predicate leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            QueryNode::IndexPredicate { .. } => 1,
            QueryNode::Intersection(left, right) | QueryNode::Union(left, right) => {
                left.leaf_count() + right.leaf_count()
            }
        }
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::IndexPredicate { index, op } => op.describe(index, f),
            QueryNode::Intersection(left, right) => write!(f, "({} AND {})", left, right),
            QueryNode::Union(left, right) => write!(f, "({} OR {})", left, right),
        }
    }
}
