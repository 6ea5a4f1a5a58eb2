//! Named bundles of feature sets and labeled triples.
//!
//! A [`DatasetLoader`] owns everything a batch generator needs for one
//! dataset: the context features, the drug features and the labeled triples.
//! Populating it is the job of the readers in [`crate::io`] or of a factory
//! registered in [`crate::registry`].

use drugpair_core::{BatchConfig, Result, RightEntitySource};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::feature_set::{ContextFeatureSet, DrugFeatureSet, FeatureStore};
use crate::generator::BatchGenerator;
use crate::triples::LabeledTriples;

/// A named dataset: context features, drug features and labeled triples.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    name: String,
    contexts: ContextFeatureSet,
    drugs: DrugFeatureSet,
    triples: LabeledTriples,
}

impl DatasetLoader {
    /// Creates a dataset from its three tables.
    pub fn new(
        name: impl Into<String>,
        contexts: ContextFeatureSet,
        drugs: DrugFeatureSet,
        triples: LabeledTriples,
    ) -> Self {
        Self {
            name: name.into(),
            contexts,
            drugs,
            triples,
        }
    }

    /// Returns the dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the context feature set.
    pub fn context_features(&self) -> &ContextFeatureSet {
        &self.contexts
    }

    /// Returns the drug feature set.
    pub fn drug_features(&self) -> &DrugFeatureSet {
        &self.drugs
    }

    /// Returns the labeled triples.
    pub fn labeled_triples(&self) -> &LabeledTriples {
        &self.triples
    }

    /// Consumes the dataset and returns its tables.
    pub fn into_parts(self) -> (ContextFeatureSet, DrugFeatureSet, LabeledTriples) {
        (self.contexts, self.drugs, self.triples)
    }

    /// Creates a batch generator over this dataset.
    ///
    /// The tables stay borrowed, and therefore unmodifiable, while the
    /// generator and its streams are alive.
    pub fn batch_generator(&self, config: BatchConfig) -> Result<BatchGenerator<'_>> {
        BatchGenerator::new(&self.contexts, &self.drugs, &self.triples, config)
    }

    /// Checks that every key used by the triples resolves.
    ///
    /// Batch generation does not call this; missing keys otherwise surface
    /// when the batch holding them is assembled.
    ///
    /// # Errors
    ///
    /// [`drugpair_core::DrugPairError::KeyNotFound`] for the first dangling key
    /// in row order.
    pub fn validate_references(&self, right_source: RightEntitySource) -> Result<()> {
        for triple in &self.triples {
            self.drugs.get(&triple.left)?;
            match right_source {
                RightEntitySource::Drug => self.drugs.get(&triple.right)?,
                RightEntitySource::Context => self.contexts.get(&triple.right)?,
            };
            self.contexts.get(&triple.context)?;
        }
        Ok(())
    }

    /// Returns summary statistics of the dataset.
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            name: self.name.clone(),
            context_count: self.contexts.len(),
            drug_count: self.drugs.len(),
            triple_count: self.triples.len(),
            context_channels: self.contexts.feature_dimension(),
            drug_channels: self.drugs.feature_dimension(),
            context_density: self.contexts.density(),
            drug_density: self.drugs.density(),
            positive_rate: self.triples.positive_rate(),
        }
    }

    /// Logs the summary statistics and returns them.
    pub fn summarize(&self) -> DatasetSummary {
        let summary = self.summary();
        info!(
            dataset = %summary.name,
            contexts = summary.context_count,
            drugs = summary.drug_count,
            triples = summary.triple_count,
            context_channels = summary.context_channels,
            drug_channels = summary.drug_channels,
            context_density = ?summary.context_density,
            drug_density = ?summary.drug_density,
            positive_rate = ?summary.positive_rate,
            "dataset summary"
        );
        summary
    }
}

/// Summary statistics of a [`DatasetLoader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Dataset name.
    pub name: String,
    /// Number of contexts with features.
    pub context_count: usize,
    /// Number of drugs with features.
    pub drug_count: usize,
    /// Number of labeled triples.
    pub triple_count: usize,
    /// Context feature width.
    pub context_channels: usize,
    /// Drug feature width.
    pub drug_channels: usize,
    /// Non-zero fraction of the context features.
    pub context_density: Option<f64>,
    /// Non-zero fraction of the drug features.
    pub drug_density: Option<f64>,
    /// Fraction of positive labels.
    pub positive_rate: Option<f64>,
}
