//! Feature sets, labeled triples and batch assembly for drug-pair scoring.
//!
//! This crate holds the data side of a drug-combination scoring pipeline:
//! per-entity feature vectors for contexts (cell lines, tissues) and drugs,
//! labeled drug-pair records, and the batch generator that joins them into
//! model-ready matrices.
//!
//! # Overview
//!
//! The core abstraction is the [`FeatureStore`] trait, implemented by
//! [`FeatureSet`] for both entity roles. A [`DatasetLoader`] bundles one
//! [`ContextFeatureSet`], one [`DrugFeatureSet`] and one [`LabeledTriples`]
//! table; its [`BatchGenerator`] yields [`DrugPairBatch`]es on demand:
//!
//! ```
//! use drugpair_data::prelude::*;
//!
//! let mut contexts = ContextFeatureSet::new();
//! contexts.set("c1", vec![1.0, 0.0, 0.0]);
//! let mut drugs = DrugFeatureSet::new();
//! drugs.set("d1", vec![0.0, 1.0]);
//! let triples = LabeledTriples::from_triples(vec![LabeledTriple::new("d1", "c1", "c1", 1.0)]);
//! let loader = DatasetLoader::new("example", contexts, drugs, triples);
//!
//! let config = BatchConfig::builder()
//!     .batch_size(1)
//!     .right_source(RightEntitySource::Context)
//!     .build()
//!     .unwrap();
//! let generator = loader.batch_generator(config).unwrap();
//! for batch in generator.generate() {
//!     let batch = batch.unwrap();
//!     assert_eq!(batch.labels().unwrap().to_vec(), vec![1.0]);
//! }
//! ```
//!
//! # Modules
//!
//! - [`feature_set`] - Keyed `(1, D)` feature vector stores
//! - [`triples`] - Labeled drug-pair triples, shuffling and partitioning
//! - [`loader`] - Named datasets and their summaries
//! - [`batch`] - The assembled batch type
//! - [`generator`] - Lazy batch generation
//! - [`io`] - Local dataset files (JSON feature sets, CSV triples)
//! - [`registry`] - Name to dataset factory table

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod feature_set;
pub mod generator;
pub mod io;
pub mod loader;
pub mod registry;
pub mod triples;

// Re-export main types for convenience
pub use batch::{DrugPairBatch, DrugPairBatchParts};
pub use drugpair_core::{BatchConfig, DrugPairError, Result, RightEntitySource};
pub use feature_set::{
    Context, ContextFeatureSet, Drug, DrugFeatureSet, EntityRole, FeatureSet, FeatureStore,
    IntoFeatureRow,
};
pub use generator::{BatchGenerator, BatchStream};
pub use io::{load_dataset, save_dataset};
pub use loader::{DatasetLoader, DatasetSummary};
pub use registry::{normalize_name, DatasetFactory, DatasetRegistry};
pub use triples::{LabeledTriple, LabeledTriples, Partition};

/// Prelude module for convenient imports.
///
/// ```
/// use drugpair_data::prelude::*;
///
/// let drugs = DrugFeatureSet::new();
/// assert!(drugs.is_empty());
/// ```
pub mod prelude {
    pub use crate::batch::DrugPairBatch;
    pub use crate::feature_set::{ContextFeatureSet, DrugFeatureSet, FeatureStore};
    pub use crate::generator::{BatchGenerator, BatchStream};
    pub use crate::loader::DatasetLoader;
    pub use crate::registry::DatasetRegistry;
    pub use crate::triples::{LabeledTriple, LabeledTriples};
    pub use drugpair_core::{BatchConfig, RightEntitySource};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let mut contexts = ContextFeatureSet::new();
        contexts.set("c1", vec![1.0]);
        assert!(contexts.contains("c1"));
    }

    #[test]
    fn test_batch_pipeline() {
        use crate::prelude::*;

        let contexts = ContextFeatureSet::from_rows(vec![("c1", vec![1.0, 0.0])]);
        let drugs: DrugFeatureSet = (0..5).map(|i| (format!("d{i}"), vec![i as f32])).collect();
        let triples: LabeledTriples = (0..25)
            .map(|i| LabeledTriple::new(format!("d{}", i % 5), format!("d{}", (i + 2) % 5), "c1", 1.0))
            .collect();
        let loader = DatasetLoader::new("pipeline", contexts, drugs, triples);

        let config = BatchConfig::builder().batch_size(10).build().unwrap();
        let generator = loader.batch_generator(config).unwrap();
        let sizes: Vec<usize> = generator.generate().map(|b| b.unwrap().len()).collect();

        assert_eq!(sizes, vec![10, 10, 5]);
    }
}
