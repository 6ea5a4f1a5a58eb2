//! Batch generation over feature sets and labeled triples.
//!
//! A [`BatchGenerator`] borrows a context feature set, a drug feature set and
//! a labeled-triple table, and turns the triples into [`DrugPairBatch`]es:
//!
//! 1. each pass optionally shuffles the triples (pass `k` uses `seed + k`),
//! 2. the (shuffled) rows are cut into groups of `batch_size`,
//! 3. each group is resolved against the feature sets on demand.
//!
//! # Example
//!
//! ```
//! use drugpair_core::{BatchConfig, RightEntitySource};
//! use drugpair_data::feature_set::{ContextFeatureSet, DrugFeatureSet, FeatureStore};
//! use drugpair_data::generator::BatchGenerator;
//! use drugpair_data::triples::{LabeledTriple, LabeledTriples};
//!
//! let mut contexts = ContextFeatureSet::new();
//! contexts.set("c1", vec![1.0, 0.0, 0.0]);
//! let mut drugs = DrugFeatureSet::new();
//! drugs.set("d1", vec![0.0, 1.0]);
//! drugs.set("d2", vec![1.0, 1.0]);
//! let triples = LabeledTriples::from_triples(vec![LabeledTriple::new("d1", "d2", "c1", 1.0)]);
//!
//! let config = BatchConfig::builder().batch_size(1).shuffle(false).build().unwrap();
//! let generator = BatchGenerator::new(&contexts, &drugs, &triples, config).unwrap();
//!
//! for batch in generator.generate() {
//!     let batch = batch.unwrap();
//!     assert_eq!(batch.left_features().unwrap().dim(), (1, 2));
//!     assert_eq!(batch.context_features().unwrap().dim(), (1, 3));
//! }
//! ```

use std::borrow::Cow;
use std::iter::FusedIterator;

use drugpair_core::{BatchConfig, RightEntitySource, Result};
use ndarray::{Array1, Array2};
use tracing::debug;

use crate::batch::DrugPairBatch;
use crate::feature_set::{ContextFeatureSet, DrugFeatureSet, FeatureStore};
use crate::triples::{LabeledTriple, LabeledTriples};

/// Assembles batches from borrowed feature sets and triples.
///
/// The generator itself is stateless; iteration state lives in the
/// [`BatchStream`] returned by [`BatchGenerator::generate`], so several
/// streams can read the same tables at once.
#[derive(Debug, Clone)]
pub struct BatchGenerator<'a> {
    contexts: &'a ContextFeatureSet,
    drugs: &'a DrugFeatureSet,
    triples: &'a LabeledTriples,
    config: BatchConfig,
}

impl<'a> BatchGenerator<'a> {
    /// Creates a generator over the given tables.
    ///
    /// # Errors
    ///
    /// [`drugpair_core::DrugPairError::ConfigError`] if `config` is invalid.
    pub fn new(
        contexts: &'a ContextFeatureSet,
        drugs: &'a DrugFeatureSet,
        triples: &'a LabeledTriples,
        config: BatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            contexts,
            drugs,
            triples,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Returns the number of batches in one pass.
    pub fn num_batches(&self) -> usize {
        let rows = self.triples.len();
        let batch_size = self.config.batch_size();
        if self.config.drop_remainder() {
            rows / batch_size
        } else {
            rows.div_ceil(batch_size)
        }
    }

    /// Starts the first pass over the triples.
    pub fn generate(&self) -> BatchStream<'a> {
        BatchStream::new(self.clone())
    }

    /// Resolves one group of triples into a batch.
    ///
    /// Left keys are looked up in the drug set, right keys in the set chosen
    /// by [`BatchConfig::right_source`], context keys in the context set.
    ///
    /// # Errors
    ///
    /// [`drugpair_core::DrugPairError::KeyNotFound`] for the first key that
    /// does not resolve.
    pub fn assemble(&self, group: &[LabeledTriple]) -> Result<DrugPairBatch> {
        let (left_features, right_features) = if self.config.drug_features() {
            let left = self.drugs.gather(&keys(group, |t| &t.left))?;
            let right_keys = keys(group, |t| &t.right);
            let right = match self.config.right_source() {
                RightEntitySource::Drug => self.drugs.gather(&right_keys)?,
                RightEntitySource::Context => self.contexts.gather(&right_keys)?,
            };
            (Some(left), Some(right))
        } else {
            (None, None)
        };

        let context_features: Option<Array2<f32>> = if self.config.context_features() {
            Some(self.contexts.gather(&keys(group, |t| &t.context))?)
        } else {
            None
        };

        let labels = self
            .config
            .labels()
            .then(|| group.iter().map(|t| t.label).collect::<Array1<f32>>());

        debug!(rows = group.len(), "assembled drug pair batch");
        DrugPairBatch::new(
            group.to_vec(),
            left_features,
            right_features,
            context_features,
            labels,
        )
    }

    fn ordering(&self, pass: u64) -> Cow<'a, LabeledTriples> {
        if self.config.shuffle() {
            Cow::Owned(self.triples.shuffle(self.config.seed().wrapping_add(pass)))
        } else {
            Cow::Borrowed(self.triples)
        }
    }
}

fn keys<'t>(group: &'t [LabeledTriple], key: impl Fn(&'t LabeledTriple) -> &'t String) -> Vec<&'t str> {
    group.iter().map(|t| key(t).as_str()).collect()
}

/// A lazy, finite sequence of batches for one pass at a time.
///
/// Batches are assembled only when requested. A failed batch ends the pass;
/// afterwards, and after the last batch, [`Iterator::next`] returns `None`
/// until [`BatchStream::restart`] is called.
#[derive(Debug)]
pub struct BatchStream<'a> {
    generator: BatchGenerator<'a>,
    order: Cow<'a, LabeledTriples>,
    group: usize,
    pass: u64,
    done: bool,
}

impl<'a> BatchStream<'a> {
    fn new(generator: BatchGenerator<'a>) -> Self {
        let order = generator.ordering(0);
        Self {
            generator,
            order,
            group: 0,
            pass: 0,
            done: false,
        }
    }

    /// Returns the 0-based index of the current pass.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Returns the number of batches still to come in this pass.
    pub fn remaining(&self) -> usize {
        if self.done {
            return 0;
        }
        let batch_size = self.generator.config.batch_size();
        let rows = self
            .order
            .len()
            .saturating_sub(self.group.saturating_mul(batch_size));
        if self.generator.config.drop_remainder() {
            rows / batch_size
        } else {
            rows.div_ceil(batch_size)
        }
    }

    /// Begins the next pass: reshuffles (if configured) and starts again from
    /// the first group.
    pub fn restart(&mut self) {
        self.pass += 1;
        self.order = self.generator.ordering(self.pass);
        self.group = 0;
        self.done = false;
        debug!(pass = self.pass, batches = self.remaining(), "restarted batch stream");
    }
}

impl Iterator for BatchStream<'_> {
    type Item = Result<DrugPairBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // The stream owns its pass ordering, so each pull re-partitions it and
        // jumps straight to the next group.
        let batch_size = self.generator.config.batch_size();
        let group = match self.order.partition(batch_size) {
            Ok(mut groups) => groups.nth(self.group),
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        let group = match group {
            Some(group) if !(self.generator.config.drop_remainder() && group.len() < batch_size) => {
                group
            }
            _ => {
                self.done = true;
                return None;
            }
        };
        self.group += 1;

        let result = self.generator.assemble(group);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl FusedIterator for BatchStream<'_> {}
