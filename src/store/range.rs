//! Key ranges for index scans
//!
//! A range has an optional lower and upper bound. Each bound is either
//! closed (inclusive) or open (exclusive). A missing bound is unbounded.

use std::fmt;
use std::ops::Bound;

use super::key::Key;

/// Bounded interval passed to an index scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    lower: Option<Key>,
    upper: Option<Key>,
    lower_open: bool,
    upper_open: bool,
}

impl KeyRange {
    /// Range matching exactly one key
    pub fn only(key: Key) -> Self {
        Self {
            lower: Some(key.clone()),
            upper: Some(key),
            lower_open: false,
            upper_open: false,
        }
    }

    /// Range with only a lower bound
    pub fn lower_bound(key: Key, open: bool) -> Self {
        Self {
            lower: Some(key),
            upper: None,
            lower_open: open,
            upper_open: false,
        }
    }

    /// Range with only an upper bound
    pub fn upper_bound(key: Key, open: bool) -> Self {
        Self {
            lower: None,
            upper: Some(key),
            lower_open: false,
            upper_open: open,
        }
    }

    /// Range with both bounds
    pub fn bound(lower: Key, upper: Key, lower_open: bool, upper_open: bool) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            lower_open,
            upper_open,
        }
    }

    pub fn lower(&self) -> Option<&Key> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Key> {
        self.upper.as_ref()
    }

    pub fn lower_open(&self) -> bool {
        self.lower_open
    }

    pub fn upper_open(&self) -> bool {
        self.upper_open
    }

    /// Returns true if the key lies within the range
    pub fn contains(&self, key: &Key) -> bool {
        let above_lower = match &self.lower {
            Some(lower) if self.lower_open => key > lower,
            Some(lower) => key >= lower,
            None => true,
        };
        let below_upper = match &self.upper {
            Some(upper) if self.upper_open => key < upper,
            Some(upper) => key <= upper,
            None => true,
        };
        above_lower && below_upper
    }

    /// Returns true if no key can satisfy the range
    /// (lower above upper, or equal bounds with either side open).
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => {
                lower > upper || (lower == upper && (self.lower_open || self.upper_open))
            }
            _ => false,
        }
    }

    /// Converts to std bounds for `BTreeMap::range`.
    ///
    /// Callers must check `is_empty` first; `BTreeMap::range` panics on
    /// inverted bounds.
    pub fn as_bounds(&self) -> (Bound<&Key>, Bound<&Key>) {
        let lower = match &self.lower {
            Some(k) if self.lower_open => Bound::Excluded(k),
            Some(k) => Bound::Included(k),
            None => Bound::Unbounded,
        };
        let upper = match &self.upper {
            Some(k) if self.upper_open => Bound::Excluded(k),
            Some(k) => Bound::Included(k),
            None => Bound::Unbounded,
        };
        (lower, upper)
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Some(k) => write!(f, "{}{}", if self.lower_open { "(" } else { "[" }, k)?,
            None => write!(f, "(-inf")?,
        }
        write!(f, ", ")?;
        match &self.upper {
            Some(k) => write!(f, "{}{}", k, if self.upper_open { ")" } else { "]" }),
            None => write!(f, "+inf)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_contains_single_key() {
        let range = KeyRange::only(Key::from("BMW"));
        assert!(range.contains(&Key::from("BMW")));
        assert!(!range.contains(&Key::from("BMX")));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_open_and_closed_bounds() {
        let open = KeyRange::bound(Key::from(1), Key::from(3), true, true);
        assert!(!open.contains(&Key::from(1)));
        assert!(open.contains(&Key::from(2)));
        assert!(!open.contains(&Key::from(3)));

        let closed = KeyRange::bound(Key::from(1), Key::from(3), false, false);
        assert!(closed.contains(&Key::from(1)));
        assert!(closed.contains(&Key::from(3)));
    }

    #[test]
    fn test_half_open_ranges() {
        let below = KeyRange::upper_bound(Key::from(1984), true);
        assert!(below.contains(&Key::from(1971)));
        assert!(!below.contains(&Key::from(1984)));

        let above = KeyRange::lower_bound(Key::from(1984), false);
        assert!(above.contains(&Key::from(1984)));
        assert!(above.contains(&Key::from(2001)));
    }

    #[test]
    fn test_empty_ranges() {
        assert!(KeyRange::bound(Key::from(5), Key::from(1), false, false).is_empty());
        assert!(KeyRange::bound(Key::from(5), Key::from(5), true, false).is_empty());
        assert!(!KeyRange::bound(Key::from(5), Key::from(5), false, false).is_empty());
        assert!(!KeyRange::upper_bound(Key::from(5), true).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyRange::only(Key::from(1)).to_string(), "[1, 1]");
        assert_eq!(KeyRange::upper_bound(Key::from(2), true).to_string(), "(-inf, 2)");
        assert_eq!(
            KeyRange::lower_bound(Key::from("a"), true).to_string(),
            "(\"a\", +inf)"
        );
    }
}
