//! Model-ready drug-pair batches.
//!
//! A [`DrugPairBatch`] bundles a group of labeled triples with the feature
//! matrices and label vector resolved for them. Row `i` of every component
//! belongs to triple `i` of the group.

use drugpair_core::{DrugPairError, Result};
use ndarray::{Array1, Array2};

use crate::triples::LabeledTriple;

/// A batch of labeled triples with their resolved features.
///
/// Components switched off in the generator configuration are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugPairBatch {
    /// The triples in this batch, in row order.
    triples: Vec<LabeledTriple>,
    /// `(rows, D_drug)` features of the left entities.
    left_features: Option<Array2<f32>>,
    /// `(rows, D)` features of the right entities.
    right_features: Option<Array2<f32>>,
    /// `(rows, D_context)` features of the contexts.
    context_features: Option<Array2<f32>>,
    /// `(rows,)` labels.
    labels: Option<Array1<f32>>,
}

impl DrugPairBatch {
    /// Creates a batch from its components.
    ///
    /// # Errors
    ///
    /// [`DrugPairError::InvalidDimension`] if a present component does not
    /// have one row per triple (`expected` is the triple count).
    pub fn new(
        triples: Vec<LabeledTriple>,
        left_features: Option<Array2<f32>>,
        right_features: Option<Array2<f32>>,
        context_features: Option<Array2<f32>>,
        labels: Option<Array1<f32>>,
    ) -> Result<Self> {
        let rows = triples.len();
        let component_rows = [&left_features, &right_features, &context_features]
            .into_iter()
            .flatten()
            .map(|matrix| matrix.nrows())
            .chain(labels.as_ref().map(|labels| labels.len()));
        for actual in component_rows {
            if actual != rows {
                return Err(DrugPairError::InvalidDimension {
                    expected: rows,
                    actual,
                });
            }
        }

        Ok(Self {
            triples,
            left_features,
            right_features,
            context_features,
            labels,
        })
    }

    /// Returns the number of triples in this batch.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns `true` if this batch holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Returns the triples in row order.
    pub fn triples(&self) -> &[LabeledTriple] {
        &self.triples
    }

    /// Returns the left entity feature matrix.
    pub fn left_features(&self) -> Option<&Array2<f32>> {
        self.left_features.as_ref()
    }

    /// Returns the right entity feature matrix.
    pub fn right_features(&self) -> Option<&Array2<f32>> {
        self.right_features.as_ref()
    }

    /// Returns the context feature matrix.
    pub fn context_features(&self) -> Option<&Array2<f32>> {
        self.context_features.as_ref()
    }

    /// Returns the label vector.
    pub fn labels(&self) -> Option<&Array1<f32>> {
        self.labels.as_ref()
    }

    /// Returns an iterator over the triples in this batch.
    pub fn iter(&self) -> impl Iterator<Item = &LabeledTriple> {
        self.triples.iter()
    }

    /// Consumes the batch and returns its components.
    pub fn into_parts(self) -> DrugPairBatchParts {
        DrugPairBatchParts {
            triples: self.triples,
            left_features: self.left_features,
            right_features: self.right_features,
            context_features: self.context_features,
            labels: self.labels,
        }
    }
}

/// The owned components of a [`DrugPairBatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrugPairBatchParts {
    /// The triples in row order.
    pub triples: Vec<LabeledTriple>,
    /// Left entity features.
    pub left_features: Option<Array2<f32>>,
    /// Right entity features.
    pub right_features: Option<Array2<f32>>,
    /// Context features.
    pub context_features: Option<Array2<f32>>,
    /// Labels.
    pub labels: Option<Array1<f32>>,
}

impl<'a> IntoIterator for &'a DrugPairBatch {
    type Item = &'a LabeledTriple;
    type IntoIter = std::slice::Iter<'a, LabeledTriple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}
