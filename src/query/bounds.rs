//! Translation of predicate operators into index scans
//!
//! | operator  | lower         | upper         |
//! |-----------|---------------|---------------|
//! | Eq        | value, closed | value, closed |
//! | Lt        | -             | value, open   |
//! | LtEq      | -             | value, closed |
//! | Gt        | value, open   | -             |
//! | GtEq      | value, closed | -             |
//! | Between   | v0, open      | v1, open      |
//! | BetweenEq | v0, closed    | v1, closed    |
//!
//! `NotEq` has no single range: it scans the equality range and subtracts it
//! from a full scan of the index.

use super::ast::Operator;
use crate::store::KeyRange;

/// How a predicate is answered by the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPlan {
    /// One range scan; its keys are the result
    Range(KeyRange),
    /// Scan the range, then the whole index, and return the difference
    Complement(KeyRange),
}

impl ScanPlan {
    /// Plan the scans for an operator
    pub fn for_operator(op: &Operator) -> Self {
        match op {
            Operator::Eq(v) => ScanPlan::Range(KeyRange::only(v.clone())),
            Operator::NotEq(v) => ScanPlan::Complement(KeyRange::only(v.clone())),
            Operator::Lt(v) => ScanPlan::Range(KeyRange::upper_bound(v.clone(), true)),
            Operator::LtEq(v) => ScanPlan::Range(KeyRange::upper_bound(v.clone(), false)),
            Operator::Gt(v) => ScanPlan::Range(KeyRange::lower_bound(v.clone(), true)),
            Operator::GtEq(v) => ScanPlan::Range(KeyRange::lower_bound(v.clone(), false)),
            Operator::Between(lower, upper) => {
                ScanPlan::Range(KeyRange::bound(lower.clone(), upper.clone(), true, true))
            }
            Operator::BetweenEq(lower, upper) => {
                ScanPlan::Range(KeyRange::bound(lower.clone(), upper.clone(), false, false))
            }
        }
    }
}

/// The single range answering `op`, or `None` for `NotEq`
pub fn key_range(op: &Operator) -> Option<KeyRange> {
    match ScanPlan::for_operator(op) {
        ScanPlan::Range(range) => Some(range),
        ScanPlan::Complement(_) => None,
    }
}
