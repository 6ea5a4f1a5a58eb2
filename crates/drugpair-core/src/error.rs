//! Error types for the drugpair libraries.
//!
//! This module defines the error type shared by the feature store, the
//! labeled-triple table, the dataset readers and the batch generator.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for drugpair operations.
#[derive(Debug, Error)]
pub enum DrugPairError {
    /// A key was requested from a feature set that does not hold it.
    ///
    /// Raised by lookups, deletions and matrix assembly, and propagated
    /// unchanged when a labeled triple references a missing entity.
    #[error("Key not found in {role} feature set: {key}")]
    KeyNotFound {
        /// The entity role of the feature set ("context" or "drug").
        role: &'static str,
        /// The missing key.
        key: String,
    },

    /// Stacked feature rows do not share one width.
    #[error("Invalid feature dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// The width of the first row.
        expected: usize,
        /// The width of the offending row.
        actual: usize,
    },

    /// Error during configuration parsing or validation.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// A description of the configuration error.
        message: String,
    },

    /// A dataset file could not be parsed.
    #[error("Parse error in {}:{line}: {message}", path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// 1-based line number, 0 when the whole file is affected.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// No dataset is registered under the requested name.
    #[error("Dataset {name} not found in registry")]
    DatasetNotFound {
        /// The normalized dataset name.
        name: String,
    },

    /// A dataset name was registered twice.
    #[error("Duplicate dataset registered for key {name}")]
    DuplicateDataset {
        /// The normalized dataset name.
        name: String,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DrugPairError {
    /// Returns the missing key if this is a [`DrugPairError::KeyNotFound`].
    pub fn missing_key(&self) -> Option<&str> {
        match self {
            DrugPairError::KeyNotFound { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// A specialized Result type for drugpair operations.
pub type Result<T> = std::result::Result<T, DrugPairError>;
