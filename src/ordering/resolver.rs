//! Head-extraction total-order resolver.

use crate::error::{ConversionError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Display;
use std::hash::Hash;
use tracing::trace;

/// Merges partial orders (rows) into one total order.
///
/// Each row is a duplicate-free list whose relative order must be kept.
/// The result contains every item exactly once and preserves each row as a
/// subsequence. When several items could come next, the one heading the
/// earliest row wins, so identical input always yields identical output.
///
/// # Examples
///
/// ```
/// use u_unitconv::ordering::TotalOrderResolver;
///
/// let order = TotalOrderResolver::new()
///     .with_row(["meter", "second"])
///     .with_row(["kilogram", "meter"])
///     .resolve()
///     .unwrap();
/// assert_eq!(order, vec!["kilogram", "meter", "second"]);
///
/// let conflict = TotalOrderResolver::new()
///     .with_row(["a", "b"])
///     .with_row(["b", "a"])
///     .resolve();
/// assert!(conflict.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct TotalOrderResolver<T> {
    rows: Vec<Vec<T>>,
}

impl<T> Default for TotalOrderResolver<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T> TotalOrderResolver<T>
where
    T: Clone + Eq + Hash + Display,
{
    /// Creates a resolver with no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row.
    pub fn with_row(mut self, row: impl IntoIterator<Item = T>) -> Self {
        self.add_row(row);
        self
    }

    /// Adds a row in place.
    pub fn add_row(&mut self, row: impl IntoIterator<Item = T>) {
        self.rows.push(row.into_iter().collect());
    }

    /// Number of rows added so far.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Computes the total order.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::DuplicateOrderingItem`] if a row repeats an item.
    /// - [`ConversionError::IncompatibleOrdering`] if the rows contradict
    ///   each other; the error names the items of one contradicting cycle.
    pub fn resolve(&self) -> Result<Vec<T>> {
        for row in &self.rows {
            let mut seen = FxHashSet::default();
            if let Some(repeated) = row.iter().find(|item| !seen.insert(*item)) {
                return Err(ConversionError::DuplicateOrderingItem {
                    item: repeated.to_string(),
                });
            }
        }

        let mut remaining: Vec<Vec<T>> =
            self.rows.iter().filter(|r| !r.is_empty()).cloned().collect();
        let mut order = Vec::new();
        while !remaining.is_empty() {
            let Some((head, rest)) = extract_head(&remaining) else {
                let items = conflicting_cycle(&remaining);
                trace!(?items, "ordering conflict");
                return Err(ConversionError::IncompatibleOrdering { items });
            };
            trace!(item = %head, left = rest.len(), "ordering emit");
            order.push(head);
            remaining = rest;
        }
        Ok(order)
    }
}

/// One reduction step: the first row head that is not preceded by anything
/// in any row, paired with the rows left after removing it.
///
/// Returns `None` when every head is blocked, which means the rows contain
/// a cycle. Rows that become empty are dropped.
pub fn extract_head<T: Clone + Eq + Hash>(rows: &[Vec<T>]) -> Option<(T, Vec<Vec<T>>)> {
    let blocked: FxHashSet<&T> = rows.iter().flat_map(|row| row.iter().skip(1)).collect();
    let head = rows
        .iter()
        .filter_map(|row| row.first())
        .find(|head| !blocked.contains(head))?
        .clone();
    let rest = rows
        .iter()
        .map(|row| row.iter().filter(|item| **item != head).cloned().collect::<Vec<T>>())
        .filter(|row| !row.is_empty())
        .collect();
    Some((head, rest))
}

/// Whether `row` appears in `order` as a subsequence.
pub fn has_consistent_order<T: PartialEq>(order: &[T], row: &[T]) -> bool {
    let mut cursor = order.iter();
    row.iter().all(|item| cursor.any(|o| o == item))
}

/// Walks immediate predecessors from a blocked head until an item repeats.
///
/// When no head is free every remaining item has a predecessor, so the walk
/// always closes a cycle.
fn conflicting_cycle<T: Clone + Eq + Hash + Display>(rows: &[Vec<T>]) -> Vec<String> {
    let mut predecessor: FxHashMap<&T, &T> = FxHashMap::default();
    for row in rows {
        for pair in row.windows(2) {
            predecessor.entry(&pair[1]).or_insert(&pair[0]);
        }
    }

    let mut walk: Vec<&T> = Vec::new();
    let mut current = match rows.first().and_then(|row| row.first()) {
        Some(item) => item,
        None => return Vec::new(),
    };
    loop {
        if let Some(start) = walk.iter().position(|item| *item == current) {
            return walk[start..].iter().rev().map(|item| item.to_string()).collect();
        }
        walk.push(current);
        match predecessor.get(current) {
            Some(&previous) => current = previous,
            None => return walk.iter().rev().map(|item| item.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_row() {
        let order = TotalOrderResolver::new().with_row(["c", "a", "b"]).resolve().unwrap();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_merges_overlapping_rows() {
        let order = TotalOrderResolver::new()
            .with_row(["a", "c"])
            .with_row(["b", "c", "d"])
            .with_row(["a", "b"])
            .resolve()
            .unwrap();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_ties_follow_row_order() {
        let order = TotalOrderResolver::new()
            .with_row(["x"])
            .with_row(["y"])
            .with_row(["w"])
            .resolve()
            .unwrap();
        assert_eq!(order, vec!["x", "y", "w"]);
    }

    #[test]
    fn test_two_way_conflict() {
        let err = TotalOrderResolver::new()
            .with_row(["a", "b"])
            .with_row(["b", "a"])
            .resolve()
            .unwrap_err();
        match err {
            ConversionError::IncompatibleOrdering { mut items } => {
                items.sort();
                assert_eq!(items, vec!["a", "b"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_conflict_names_only_the_cycle() {
        let err = TotalOrderResolver::new()
            .with_row(["z", "q"])
            .with_row(["a", "b"])
            .with_row(["b", "c"])
            .with_row(["c", "a"])
            .resolve()
            .unwrap_err();
        match err {
            ConversionError::IncompatibleOrdering { mut items } => {
                items.sort();
                assert_eq!(items, vec!["a", "b", "c"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_in_row() {
        let err = TotalOrderResolver::new().with_row(["a", "b", "a"]).resolve().unwrap_err();
        assert_eq!(err, ConversionError::DuplicateOrderingItem { item: "a".into() });
    }

    #[test]
    fn test_empty_input() {
        let resolver: TotalOrderResolver<String> = TotalOrderResolver::new();
        assert!(resolver.resolve().unwrap().is_empty());
        assert_eq!(resolver.row_count(), 0);
    }

    #[test]
    fn test_extract_head_is_pure() {
        let rows = vec![vec!["b", "c"], vec!["a", "b"]];
        let (head, rest) = extract_head(&rows).unwrap();
        assert_eq!(head, "a");
        assert_eq!(rest, vec![vec!["b", "c"], vec!["b"]]);
        assert_eq!(rows.len(), 2, "input rows are untouched");
        assert!(extract_head(&[vec!["a", "b"], vec!["b", "a"]]).is_none());
    }

    #[test]
    fn test_has_consistent_order() {
        assert!(has_consistent_order(&["a", "b", "c"], &["a", "c"]));
        assert!(!has_consistent_order(&["a", "b", "c"], &["c", "a"]));
        assert!(has_consistent_order::<&str>(&["a"], &[]));
    }

    proptest! {
        #[test]
        fn prop_rows_from_a_hidden_order_resolve(
            len in 1usize..12,
            picks in prop::collection::vec(prop::collection::vec(any::<bool>(), 12), 1..6),
        ) {
            // Every row is a subsequence of 0..len, so the rows are consistent.
            let rows: Vec<Vec<usize>> = picks
                .iter()
                .map(|mask| (0..len).filter(|&i| mask[i]).collect())
                .collect();
            let mut resolver = TotalOrderResolver::new();
            for row in &rows {
                resolver.add_row(row.iter().copied());
            }
            let order = resolver.resolve().unwrap();

            let mut expected: Vec<usize> = rows.iter().flatten().copied().collect();
            expected.sort_unstable();
            expected.dedup();
            let mut sorted = order.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, expected, "every item exactly once");
            for row in &rows {
                prop_assert!(has_consistent_order(&order, row));
            }
        }
    }
}
