//! Labeled drug-pair triples.
//!
//! A [`LabeledTriples`] table is an ordered list of
//! `(left, right, context, label)` rows: two entities combined in a
//! biological context together with the observed outcome.
//!
//! # Example
//!
//! ```
//! use drugpair_data::triples::{LabeledTriple, LabeledTriples};
//!
//! let triples: LabeledTriples = (0..7)
//!     .map(|i| LabeledTriple::new(format!("d{i}"), "d0", "c1", (i % 2) as f32))
//!     .collect();
//!
//! let sizes: Vec<usize> = triples.partition(3).unwrap().map(|g| g.len()).collect();
//! assert_eq!(sizes, vec![3, 3, 1]);
//! ```

use std::collections::HashSet;
use std::iter::FusedIterator;
use std::ops::Add;

use drugpair_core::{DrugPairError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One labeled record: two entities in a context with an outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTriple {
    /// Key of the left entity (a drug).
    pub left: String,
    /// Key of the right entity.
    pub right: String,
    /// Key of the context.
    pub context: String,
    /// Outcome: 0/1 for binary tasks or a real-valued score.
    pub label: f32,
}

impl LabeledTriple {
    /// Creates a new labeled triple.
    pub fn new(
        left: impl Into<String>,
        right: impl Into<String>,
        context: impl Into<String>,
        label: f32,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            context: context.into(),
            label,
        }
    }

    /// Returns `true` if the label is positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.label > 0.0
    }
}

/// An ordered table of labeled triples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledTriples {
    rows: Vec<LabeledTriple>,
}

impl LabeledTriples {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from existing rows.
    pub fn from_triples(rows: Vec<LabeledTriple>) -> Self {
        Self { rows }
    }

    /// Appends a row.
    pub fn push(&mut self, triple: LabeledTriple) {
        self.rows.push(triple);
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row at `index`.
    pub fn get(&self, index: usize) -> Option<&LabeledTriple> {
        self.rows.get(index)
    }

    /// Returns all rows in order.
    pub fn rows(&self) -> &[LabeledTriple] {
        &self.rows
    }

    /// Iterates over the rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, LabeledTriple> {
        self.rows.iter()
    }

    /// Consumes the table and returns its rows.
    pub fn into_rows(self) -> Vec<LabeledTriple> {
        self.rows
    }

    /// Returns a copy of the table with rows in a random order.
    ///
    /// The permutation depends only on `seed` and the current row order.
    pub fn shuffle(&self, seed: u64) -> LabeledTriples {
        let mut rows = self.rows.clone();
        let mut rng = StdRng::seed_from_u64(seed);
        rows.shuffle(&mut rng);
        Self { rows }
    }

    /// Splits the rows into consecutive groups of `batch_size`.
    ///
    /// Every group has `batch_size` rows except possibly the last one, which
    /// holds the remainder. Call again to start over.
    ///
    /// # Errors
    ///
    /// [`DrugPairError::ConfigError`] if `batch_size` is 0.
    pub fn partition(&self, batch_size: usize) -> Result<Partition<'_>> {
        if batch_size == 0 {
            return Err(DrugPairError::ConfigError {
                message: "batch_size must be positive".to_string(),
            });
        }
        Ok(Partition {
            rows: &self.rows,
            batch_size,
        })
    }

    /// Removes repeated rows, keeping the first occurrence.
    ///
    /// Returns the number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(before);
        let mut kept = Vec::with_capacity(before);
        for triple in self.rows.drain(..) {
            let identity = (
                triple.left.clone(),
                triple.right.clone(),
                triple.context.clone(),
                triple.label.to_bits(),
            );
            if seen.insert(identity) {
                kept.push(triple);
            }
        }
        self.rows = kept;

        let removed = before - self.rows.len();
        if removed > 0 {
            warn!(removed, remaining = self.rows.len(), "dropped duplicate triples");
        }
        removed
    }

    /// Appends all rows of `other` after the rows of `self`.
    pub fn merge(mut self, other: LabeledTriples) -> LabeledTriples {
        self.rows.extend(other.rows);
        self
    }

    /// Shuffles with `seed` and splits into a train and a test table.
    ///
    /// The train table receives `floor(train_fraction * len)` rows.
    ///
    /// # Errors
    ///
    /// [`DrugPairError::ConfigError`] if `train_fraction` is outside `[0, 1]`.
    pub fn train_test_split(
        &self,
        train_fraction: f64,
        seed: u64,
    ) -> Result<(LabeledTriples, LabeledTriples)> {
        if !(0.0..=1.0).contains(&train_fraction) {
            return Err(DrugPairError::ConfigError {
                message: format!("train_fraction must be in [0, 1], got {train_fraction}"),
            });
        }
        let mut rows = self.shuffle(seed).rows;
        let train_len = (train_fraction * rows.len() as f64).floor() as usize;
        let test_rows = rows.split_off(train_len);
        Ok((Self { rows }, Self { rows: test_rows }))
    }

    /// Number of distinct entity keys on either side of the pairs.
    pub fn drug_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|t| [t.left.as_str(), t.right.as_str()])
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of distinct context keys.
    pub fn context_count(&self) -> usize {
        self.rows
            .iter()
            .map(|t| t.context.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of distinct ordered `(left, right)` pairs.
    pub fn combination_count(&self) -> usize {
        self.rows
            .iter()
            .map(|t| (t.left.as_str(), t.right.as_str()))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of rows with a positive label.
    pub fn positive_count(&self) -> usize {
        self.rows.iter().filter(|t| t.is_positive()).count()
    }

    /// Number of rows without a positive label.
    pub fn negative_count(&self) -> usize {
        self.rows.len() - self.positive_count()
    }

    /// Fraction of positive rows, `None` when empty.
    pub fn positive_rate(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        Some(self.positive_count() as f64 / self.rows.len() as f64)
    }

    /// Fraction of non-positive rows, `None` when empty.
    pub fn negative_rate(&self) -> Option<f64> {
        self.positive_rate().map(|rate| 1.0 - rate)
    }
}

impl Add for LabeledTriples {
    type Output = LabeledTriples;

    fn add(self, other: LabeledTriples) -> LabeledTriples {
        self.merge(other)
    }
}

impl FromIterator<LabeledTriple> for LabeledTriples {
    fn from_iter<I: IntoIterator<Item = LabeledTriple>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Extend<LabeledTriple> for LabeledTriples {
    fn extend<I: IntoIterator<Item = LabeledTriple>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl IntoIterator for LabeledTriples {
    type Item = LabeledTriple;
    type IntoIter = std::vec::IntoIter<LabeledTriple>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a LabeledTriples {
    type Item = &'a LabeledTriple;
    type IntoIter = std::slice::Iter<'a, LabeledTriple>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Lazy sequence of row groups produced by [`LabeledTriples::partition`].
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    rows: &'a [LabeledTriple],
    batch_size: usize,
}

impl<'a> Partition<'a> {
    /// Returns the group size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<'a> Iterator for Partition<'a> {
    type Item = &'a [LabeledTriple];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rows.is_empty() {
            return None;
        }
        let (group, rest) = self.rows.split_at(self.batch_size.min(self.rows.len()));
        self.rows = rest;
        Some(group)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let skip = n.saturating_mul(self.batch_size).min(self.rows.len());
        self.rows = &self.rows[skip..];
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let groups = self.rows.len().div_ceil(self.batch_size);
        (groups, Some(groups))
    }
}

impl ExactSizeIterator for Partition<'_> {}

impl FusedIterator for Partition<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_triples(count: usize) -> LabeledTriples {
        (0..count)
            .map(|i| {
                LabeledTriple::new(
                    format!("d{}", i % 5),
                    format!("d{}", (i + 1) % 5),
                    format!("c{}", i % 3),
                    (i % 2) as f32,
                )
            })
            .collect()
    }

    #[test]
    fn test_partition_sizes() {
        for (n, b) in [(0, 3), (1, 3), (7, 3), (9, 3), (10, 1), (4, 10)] {
            let triples = make_triples(n);
            let groups: Vec<_> = triples.partition(b).unwrap().collect();

            assert_eq!(groups.len(), n.div_ceil(b), "n={n} b={b}");
            let total: usize = groups.iter().map(|g| g.len()).sum();
            assert_eq!(total, n);

            for group in groups.iter().take(n / b) {
                assert_eq!(group.len(), b);
            }
            if let Some(last) = groups.last() {
                let expected = if n % b == 0 { b } else { n % b };
                assert_eq!(last.len(), expected);
            }
        }
    }

    #[test]
    fn test_partition_preserves_order() {
        let triples = make_triples(5);
        let flattened: Vec<&LabeledTriple> = triples.partition(2).unwrap().flatten().collect();
        let original: Vec<&LabeledTriple> = triples.iter().collect();
        assert_eq!(flattened, original);
    }

    #[test]
    fn test_partition_exact_size() {
        let triples = make_triples(7);
        let mut partition = triples.partition(3).unwrap();
        assert_eq!(partition.len(), 3);
        partition.next();
        assert_eq!(partition.len(), 2);
    }

    #[test]
    fn test_partition_restartable() {
        let triples = make_triples(4);
        assert_eq!(triples.partition(3).unwrap().count(), 2);
        assert_eq!(triples.partition(3).unwrap().count(), 2);
    }

    #[test]
    fn test_partition_nth_skips_whole_groups() {
        let triples = make_triples(7);
        let mut partition = triples.partition(3).unwrap();
        assert_eq!(partition.nth(2).unwrap(), &triples.rows()[6..]);
        assert!(partition.next().is_none());

        assert_eq!(triples.partition(3).unwrap().nth(1).unwrap(), &triples.rows()[3..6]);
        assert!(triples.partition(3).unwrap().nth(3).is_none());
        assert!(triples.partition(3).unwrap().nth(usize::MAX).is_none());
    }

    #[test]
    fn test_partition_zero_batch_size() {
        let triples = make_triples(4);
        assert!(matches!(
            triples.partition(0),
            Err(DrugPairError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_shuffle_deterministic() {
        let triples = make_triples(50);
        let a = triples.shuffle(42);
        let b = triples.shuffle(42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
    }

    #[test]
    fn test_shuffle_does_not_mutate() {
        let triples = make_triples(50);
        let snapshot = triples.clone();
        let shuffled = triples.shuffle(1);

        assert_eq!(triples, snapshot);
        assert_ne!(shuffled, snapshot);

        let mut sorted = shuffled.into_rows();
        sorted.sort_by(|a, b| {
            (&a.left, &a.right, &a.context)
                .cmp(&(&b.left, &b.right, &b.context))
                .then(a.label.total_cmp(&b.label))
        });
        let mut expected = snapshot.into_rows();
        expected.sort_by(|a, b| {
            (&a.left, &a.right, &a.context)
                .cmp(&(&b.left, &b.right, &b.context))
                .then(a.label.total_cmp(&b.label))
        });
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_drop_duplicates() {
        let mut triples = LabeledTriples::from_triples(vec![
            LabeledTriple::new("a", "b", "c", 1.0),
            LabeledTriple::new("a", "b", "c", 1.0),
            LabeledTriple::new("a", "b", "c", 0.0),
            LabeledTriple::new("b", "a", "c", 1.0),
        ]);

        assert_eq!(triples.drop_duplicates(), 1);
        assert_eq!(triples.len(), 3);
        assert_eq!(triples.get(1).unwrap().label, 0.0);
        assert_eq!(triples.drop_duplicates(), 0);
    }

    #[test]
    fn test_merge_and_add() {
        let a = make_triples(3);
        let b = make_triples(2);
        let merged = a.clone() + b.clone();
        assert_eq!(merged.len(), 5);
        assert_eq!(&merged.rows()[3..], b.rows());
        assert_eq!(a.merge(b), merged);
    }

    #[test]
    fn test_train_test_split() {
        let triples = make_triples(10);
        let (train, test) = triples.train_test_split(0.75, 7).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);

        let (train_again, _) = triples.train_test_split(0.75, 7).unwrap();
        assert_eq!(train, train_again);

        assert!(triples.train_test_split(1.5, 7).is_err());
    }

    #[test]
    fn test_statistics() {
        let triples = LabeledTriples::from_triples(vec![
            LabeledTriple::new("d1", "d2", "c1", 1.0),
            LabeledTriple::new("d1", "d2", "c2", 0.0),
            LabeledTriple::new("d2", "d3", "c1", 1.0),
            LabeledTriple::new("d2", "d1", "c1", 0.0),
        ]);

        assert_eq!(triples.drug_count(), 3);
        assert_eq!(triples.context_count(), 2);
        assert_eq!(triples.combination_count(), 3);
        assert_eq!(triples.positive_count(), 2);
        assert_eq!(triples.negative_count(), 2);
        assert_eq!(triples.positive_rate(), Some(0.5));
        assert_eq!(triples.negative_rate(), Some(0.5));
    }

    #[test]
    fn test_empty_rates() {
        let triples = LabeledTriples::new();
        assert_eq!(triples.positive_rate(), None);
        assert_eq!(triples.negative_rate(), None);
        assert_eq!(triples.partition(4).unwrap().count(), 0);
    }
}
