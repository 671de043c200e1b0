//! Axis ordering: which axis varies slowest and which varies fastest.
//!
//! The first id in the order is the outermost loop of the scan, the last id
//! the innermost. The order is always a permutation of the attached axes;
//! anything else is rejected before it can be stored.

use crate::error::{ScanError, ScanResult};
use std::collections::HashSet;

/// User-selected permutation of the attached axis ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingPolicy {
    order: Vec<String>,
}

impl OrderingPolicy {
    /// Empty ordering (no axes attached).
    pub fn new() -> Self {
        Self::default()
    }

    /// Current order, outermost axis first.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Number of axes in the ordering.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no axis is attached.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `id` is part of the ordering.
    pub fn contains(&self, id: &str) -> bool {
        self.order.iter().any(|o| o == id)
    }

    /// Append `id` at the end (innermost) unless already present.
    pub fn attach(&mut self, id: &str) {
        if !self.contains(id) {
            self.order.push(id.to_string());
        }
    }

    /// Remove `id`, keeping the relative order of the others.
    pub fn detach(&mut self, id: &str) {
        self.order.retain(|o| o != id);
    }

    /// Replace the order with `new_order`.
    ///
    /// Accepted only when `new_order` is a permutation of the current ids.
    /// On rejection the previous order is left untouched.
    pub fn set_order(&mut self, new_order: Vec<String>) -> ScanResult<()> {
        if !is_permutation_of(&new_order, &self.order) {
            return Err(ScanError::InvalidOrdering {
                expected: self.order.clone(),
                got: new_order,
            });
        }
        self.order = new_order;
        Ok(())
    }

    /// Make the ordering a bijection onto `ids` again.
    ///
    /// If the stored order already is one, nothing changes. Otherwise it is
    /// reset to `ids` as given (natural/insertion order). Returns whether a
    /// reset happened.
    pub fn normalize(&mut self, ids: &[String]) -> bool {
        if is_permutation_of(&self.order, ids) {
            return false;
        }
        self.order = ids.to_vec();
        true
    }
}

/// True when `candidate` holds exactly the ids of `ids`, each once.
fn is_permutation_of(candidate: &[String], ids: &[String]) -> bool {
    if candidate.len() != ids.len() {
        return false;
    }
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut seen = HashSet::with_capacity(candidate.len());
    candidate
        .iter()
        .all(|c| wanted.contains(c.as_str()) && seen.insert(c.as_str()))
}

/// Every ordering of `ids`, `n!` of them.
///
/// Enumeration is lexicographic in the positions of `ids` (the first
/// permutation is `ids` itself, the last its reverse), so the output is fully
/// determined by the input order. Use [`Permutations`] to walk them without
/// holding all of them at once.
pub fn enumerate_permutations(ids: &[String]) -> Vec<Vec<String>> {
    Permutations::new(ids).collect()
}

/// Lazy counterpart of [`enumerate_permutations`], same order.
#[derive(Debug, Clone)]
pub struct Permutations<'a> {
    ids: &'a [String],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Permutations<'a> {
    /// Iterator over the orderings of `ids`.
    pub fn new(ids: &'a [String]) -> Self {
        Self {
            ids,
            indices: (0..ids.len()).collect(),
            done: false,
        }
    }
}

impl Iterator for Permutations<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.ids[i].clone()).collect();
        self.done = !next_permutation(&mut self.indices);
        Some(current)
    }
}

/// Advance `indices` to the next lexicographic permutation in place.
/// Returns false once the last permutation has been reached.
fn next_permutation(indices: &mut [usize]) -> bool {
    if indices.len() < 2 {
        return false;
    }
    let Some(pivot) = (0..indices.len() - 1).rev().find(|&i| indices[i] < indices[i + 1]) else {
        return false;
    };
    let Some(successor) = (pivot + 1..indices.len())
        .rev()
        .find(|&j| indices[j] > indices[pivot])
    else {
        return false;
    };
    indices.swap(pivot, successor);
    indices[pivot + 1..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn policy(names: &[&str]) -> OrderingPolicy {
        let mut p = OrderingPolicy::new();
        for n in names {
            p.attach(n);
        }
        p
    }

    #[test]
    fn test_attach_appends_once() {
        let mut p = policy(&["x", "y"]);
        p.attach("x");
        p.attach("z");
        assert_eq!(p.order(), ids(&["x", "y", "z"]).as_slice());
    }

    #[test]
    fn test_detach_closes_gap() {
        let mut p = policy(&["x", "y", "z"]);
        p.detach("y");
        assert_eq!(p.order(), ids(&["x", "z"]).as_slice());
        p.detach("missing");
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_set_order_accepts_permutation() {
        let mut p = policy(&["x", "y", "z"]);
        p.set_order(ids(&["z", "x", "y"])).unwrap();
        assert_eq!(p.order(), ids(&["z", "x", "y"]).as_slice());
    }

    #[test]
    fn test_set_order_rejects_duplicate() {
        let mut p = policy(&["x", "y"]);
        let err = p.set_order(ids(&["x", "x"])).unwrap_err();
        assert!(matches!(err, ScanError::InvalidOrdering { .. }));
        assert_eq!(p.order(), ids(&["x", "y"]).as_slice());
    }

    #[test]
    fn test_set_order_rejects_missing_and_foreign() {
        let mut p = policy(&["x", "y"]);
        assert!(p.set_order(ids(&["x"])).is_err());
        assert!(p.set_order(ids(&["x", "q"])).is_err());
        assert!(p.set_order(ids(&["x", "y", "z"])).is_err());
        assert_eq!(p.order(), ids(&["x", "y"]).as_slice());
    }

    #[test]
    fn test_normalize_resets_stale_order() {
        let mut p = policy(&["x", "y"]);
        assert!(!p.normalize(&ids(&["y", "x"])));
        assert_eq!(p.order(), ids(&["x", "y"]).as_slice());

        assert!(p.normalize(&ids(&["x", "w"])));
        assert_eq!(p.order(), ids(&["x", "w"]).as_slice());
    }

    #[test]
    fn test_enumerate_three_ids() {
        let perms = enumerate_permutations(&ids(&["a", "b", "c"]));
        let expected: Vec<Vec<String>> = vec![
            ids(&["a", "b", "c"]),
            ids(&["a", "c", "b"]),
            ids(&["b", "a", "c"]),
            ids(&["b", "c", "a"]),
            ids(&["c", "a", "b"]),
            ids(&["c", "b", "a"]),
        ];
        assert_eq!(perms, expected);
    }

    #[test]
    fn test_enumerate_counts_factorial_distinct() {
        let names = ids(&["a", "b", "c", "d", "e"]);
        let perms = enumerate_permutations(&names);
        assert_eq!(perms.len(), 120);
        let unique: HashSet<_> = perms.iter().collect();
        assert_eq!(unique.len(), 120);
        assert_eq!(perms, enumerate_permutations(&names));
    }

    #[test]
    fn test_permutations_iterator_is_lazy() {
        let names = ids(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"]);
        let mut iter = Permutations::new(&names);
        assert_eq!(iter.next(), Some(names.clone()));
        let second = iter.next().unwrap();
        assert_eq!(second[10..], ids(&["l", "k"])[..]);
        let third: Vec<Vec<String>> = Permutations::new(&names[..3]).collect();
        assert_eq!(third, enumerate_permutations(&names[..3]));
    }

    #[test]
    fn test_enumerate_degenerate_sets() {
        assert_eq!(enumerate_permutations(&[]), vec![Vec::<String>::new()]);
        assert_eq!(enumerate_permutations(&ids(&["a"])), vec![ids(&["a"])]);
    }
}
