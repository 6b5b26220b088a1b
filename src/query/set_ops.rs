//! Set algebra over key collections
//!
//! Inputs are unordered collections compared by value. Results keep the
//! order of the first operand, but callers must not rely on result order.

use std::collections::HashSet;

use crate::store::Key;

/// All keys of `a`, then the keys of `b` not already in `a`.
pub fn union(a: Vec<Key>, b: Vec<Key>) -> Vec<Key> {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    let mut seen: HashSet<Key> = a.iter().cloned().collect();
    let mut result = a;
    for key in b {
        if seen.insert(key.clone()) {
            result.push(key);
        }
    }
    result
}

/// Keys present in both `a` and `b`.
pub fn intersection(a: Vec<Key>, b: Vec<Key>) -> Vec<Key> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let other: HashSet<Key> = b.into_iter().collect();
    a.into_iter().filter(|key| other.contains(key)).collect()
}

/// Keys of `minuend` absent from `subtrahend`.
pub fn difference(minuend: Vec<Key>, subtrahend: Vec<Key>) -> Vec<Key> {
    if minuend.is_empty() || subtrahend.is_empty() {
        return minuend;
    }
    let removed: HashSet<Key> = subtrahend.into_iter().collect();
    minuend.into_iter().filter(|key| !removed.contains(key)).collect()
}
