//! Dataset registry mapping names to loader factories.
//!
//! The registry is a plain value built at startup and passed to whoever
//! needs to resolve datasets by name. Names are normalized before lookup, so
//! `"DrugComb"`, `"drug_comb"` and `"drug-comb"` all refer to the same entry.
//!
//! # Example
//!
//! ```
//! use drugpair_data::registry::DatasetRegistry;
//! use drugpair_data::{ContextFeatureSet, DatasetLoader, DrugFeatureSet, LabeledTriples};
//!
//! let mut registry = DatasetRegistry::new();
//! registry
//!     .register("Empty-Set", || {
//!         Ok(DatasetLoader::new(
//!             "empty",
//!             ContextFeatureSet::new(),
//!             DrugFeatureSet::new(),
//!             LabeledTriples::new(),
//!         ))
//!     })
//!     .unwrap();
//!
//! let loader = registry.resolve("empty_set").unwrap();
//! assert_eq!(loader.name(), "empty");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use drugpair_core::{DrugPairError, Result};
use tracing::{debug, warn};

use crate::io;
use crate::loader::DatasetLoader;

/// A function producing a populated dataset.
pub type DatasetFactory = Box<dyn Fn() -> Result<DatasetLoader> + Send + Sync>;

/// Normalizes a dataset name: lowercase, without `-`, `_` or spaces.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A table of dataset factories keyed by normalized name.
#[derive(Default)]
pub struct DatasetRegistry {
    factories: BTreeMap<String, DatasetFactory>,
}

impl DatasetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry with one local dataset per subdirectory of `root`
    /// that holds the dataset files.
    ///
    /// Each dataset is registered under its directory name. Directories that
    /// are not datasets, or whose names collide after normalization, are
    /// skipped.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let mut registry = Self::new();

        let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        dirs.sort();

        for dir in dirs {
            if !dir.is_dir() {
                continue;
            }
            let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };
            if !io::is_dataset_dir(&dir) {
                debug!(dir = %dir.display(), "skipping directory without dataset files");
                continue;
            }
            if let Err(err) = registry.register_local(&name, &dir) {
                warn!(dir = %dir.display(), error = %err, "skipping dataset directory");
            }
        }

        debug!(root = %root.display(), datasets = registry.len(), "discovered datasets");
        Ok(registry)
    }

    /// Registers a factory under `name`.
    ///
    /// # Errors
    ///
    /// [`DrugPairError::DuplicateDataset`] if the normalized name is taken.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Result<DatasetLoader> + Send + Sync + 'static,
    {
        let key = normalize_name(name);
        if self.factories.contains_key(&key) {
            return Err(DrugPairError::DuplicateDataset { name: key });
        }
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Registers a dataset read from `dir` in the local layout.
    pub fn register_local(&mut self, name: &str, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = dir.into();
        let dataset = name.to_string();
        self.register(name, move || io::load_dataset(dataset.clone(), &dir))
    }

    /// Creates the dataset registered under `name`.
    ///
    /// # Errors
    ///
    /// [`DrugPairError::DatasetNotFound`] for unknown names, or whatever the
    /// factory returns.
    pub fn resolve(&self, name: &str) -> Result<DatasetLoader> {
        let key = normalize_name(name);
        let factory = self
            .factories
            .get(&key)
            .ok_or(DrugPairError::DatasetNotFound { name: key })?;
        factory()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&normalize_name(name))
    }

    /// Returns the registered (normalized) names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered datasets.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_set::{ContextFeatureSet, DrugFeatureSet};
    use crate::triples::{LabeledTriple, LabeledTriples};

    fn empty_loader(name: &str) -> DatasetLoader {
        DatasetLoader::new(
            name,
            ContextFeatureSet::new(),
            DrugFeatureSet::new(),
            LabeledTriples::new(),
        )
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("DrugComb"), "drugcomb");
        assert_eq!(normalize_name("drug_comb"), "drugcomb");
        assert_eq!(normalize_name("Drug-Comb DB"), "drugcombdb");
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = DatasetRegistry::new();
        registry.register("TwoSides", || Ok(empty_loader("twosides"))).unwrap();

        assert!(registry.contains("two_sides"));
        assert_eq!(registry.names(), vec!["twosides"]);
        assert_eq!(registry.resolve("TWO-SIDES").unwrap().name(), "twosides");
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = DatasetRegistry::new();
        registry.register("drugcomb", || Ok(empty_loader("a"))).unwrap();

        let err = registry
            .register("Drug_Comb", || Ok(empty_loader("b")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate dataset registered for key drugcomb"
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = DatasetRegistry::new();
        assert!(registry.is_empty());
        let err = registry.resolve("missing").unwrap_err();
        assert_eq!(err.to_string(), "Dataset missing not found in registry");
    }

    #[test]
    fn test_factory_errors_propagate() {
        let mut registry = DatasetRegistry::new();
        registry
            .register("broken", || {
                Err(DrugPairError::ConfigError {
                    message: "unavailable".to_string(),
                })
            })
            .unwrap();
        assert!(matches!(
            registry.resolve("broken"),
            Err(DrugPairError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_discover() {
        let root = tempfile::tempdir().unwrap();
        let loader = DatasetLoader::new(
            "ignored",
            ContextFeatureSet::from_rows(vec![("c1", vec![1.0])]),
            DrugFeatureSet::from_rows(vec![("d1", vec![1.0])]),
            LabeledTriples::from_triples(vec![LabeledTriple::new("d1", "d1", "c1", 1.0)]),
        );
        io::save_dataset(&loader, root.path().join("Drug_Comb")).unwrap();
        std::fs::create_dir(root.path().join("not_a_dataset")).unwrap();
        std::fs::write(root.path().join("README"), "x").unwrap();

        let registry = DatasetRegistry::discover(root.path()).unwrap();
        assert_eq!(registry.names(), vec!["drugcomb"]);

        let resolved = registry.resolve("drugcomb").unwrap();
        assert_eq!(resolved.name(), "Drug_Comb");
        assert_eq!(resolved.labeled_triples().len(), 1);
    }

    #[test]
    fn test_discover_missing_root() {
        assert!(matches!(
            DatasetRegistry::discover("/definitely/not/a/root"),
            Err(DrugPairError::Io(_))
        ));
    }
}
