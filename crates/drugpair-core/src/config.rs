//! Batch generation configuration.
//!
//! This module provides [`BatchConfig`], the settings a batch generator runs
//! with, together with a validating builder.
//!
//! # Example
//!
//! ```
//! use drugpair_core::config::{BatchConfig, RightEntitySource};
//!
//! let config = BatchConfig::builder()
//!     .batch_size(64)
//!     .shuffle(true)
//!     .seed(7)
//!     .right_source(RightEntitySource::Drug)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.batch_size(), 64);
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DrugPairError, Result};

/// Which feature set resolves the right-hand key of a labeled triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightEntitySource {
    /// The right key is a second drug (drug-pair scoring).
    #[default]
    Drug,
    /// The right key is looked up in the context feature set.
    Context,
}

impl fmt::Display for RightEntitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RightEntitySource::Drug => write!(f, "drug"),
            RightEntitySource::Context => write!(f, "context"),
        }
    }
}

/// Configuration for a batch generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of triples per batch.
    batch_size: usize,

    /// Whether each pass shuffles the triples first.
    shuffle: bool,

    /// Base seed for shuffling.
    seed: u64,

    /// Whether to drop a final batch shorter than `batch_size`.
    drop_remainder: bool,

    /// Whether batches carry the context feature matrix.
    context_features: bool,

    /// Whether batches carry the left/right feature matrices.
    drug_features: bool,

    /// Whether batches carry the label vector.
    labels: bool,

    /// Feature set used for the right key.
    right_source: RightEntitySource,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1024,
            shuffle: true,
            seed: 42,
            drop_remainder: false,
            context_features: true,
            drug_features: true,
            labels: true,
            right_source: RightEntitySource::default(),
        }
    }
}

impl BatchConfig {
    /// Creates a configuration with the given batch size and defaults elsewhere.
    ///
    /// # Examples
    ///
    /// ```
    /// use drugpair_core::config::BatchConfig;
    ///
    /// let config = BatchConfig::new(32);
    /// assert_eq!(config.batch_size(), 32);
    /// assert!(config.shuffle());
    /// ```
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }

    /// Creates a builder starting from the defaults.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::new()
    }

    /// Creates a builder starting from this configuration.
    pub fn to_builder(&self) -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: self.clone(),
        }
    }

    /// Parses and validates a configuration from a JSON string.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Returns the batch size.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns whether passes are shuffled.
    #[inline]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Returns the base shuffle seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns whether a short final batch is dropped.
    #[inline]
    pub fn drop_remainder(&self) -> bool {
        self.drop_remainder
    }

    /// Returns whether batches carry context features.
    #[inline]
    pub fn context_features(&self) -> bool {
        self.context_features
    }

    /// Returns whether batches carry drug features.
    #[inline]
    pub fn drug_features(&self) -> bool {
        self.drug_features
    }

    /// Returns whether batches carry labels.
    #[inline]
    pub fn labels(&self) -> bool {
        self.labels
    }

    /// Returns the feature set used for right keys.
    #[inline]
    pub fn right_source(&self) -> RightEntitySource {
        self.right_source
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DrugPairError::ConfigError {
                message: "batch_size must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug, Clone, Default)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Enables or disables shuffling.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.config.shuffle = shuffle;
        self
    }

    /// Sets the base shuffle seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Sets whether a short final batch is dropped.
    pub fn drop_remainder(mut self, drop: bool) -> Self {
        self.config.drop_remainder = drop;
        self
    }

    /// Sets whether batches carry context features.
    pub fn context_features(mut self, enabled: bool) -> Self {
        self.config.context_features = enabled;
        self
    }

    /// Sets whether batches carry drug features.
    pub fn drug_features(mut self, enabled: bool) -> Self {
        self.config.drug_features = enabled;
        self
    }

    /// Sets whether batches carry labels.
    pub fn labels(mut self, enabled: bool) -> Self {
        self.config.labels = enabled;
        self
    }

    /// Sets the feature set used for right keys.
    pub fn right_source(mut self, source: RightEntitySource) -> Self {
        self.config.right_source = source;
        self
    }

    /// Builds the configuration, validating it first.
    pub fn build(self) -> Result<BatchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.batch_size(), 1024);
        assert!(config.shuffle());
        assert_eq!(config.seed(), 42);
        assert!(!config.drop_remainder());
        assert!(config.context_features());
        assert!(config.drug_features());
        assert!(config.labels());
        assert_eq!(config.right_source(), RightEntitySource::Drug);
    }

    #[test]
    fn test_builder() {
        let config = BatchConfig::builder()
            .batch_size(8)
            .shuffle(false)
            .seed(3)
            .drop_remainder(true)
            .labels(false)
            .right_source(RightEntitySource::Context)
            .build()
            .unwrap();

        assert_eq!(config.batch_size(), 8);
        assert!(!config.shuffle());
        assert_eq!(config.seed(), 3);
        assert!(config.drop_remainder());
        assert!(!config.labels());
        assert_eq!(config.right_source(), RightEntitySource::Context);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = BatchConfig::builder().batch_size(0).build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: batch_size must be positive"
        );
    }

    #[test]
    fn test_to_builder_keeps_fields() {
        let base = BatchConfig::builder().seed(99).build().unwrap();
        let config = base.to_builder().batch_size(2).build().unwrap();
        assert_eq!(config.seed(), 99);
        assert_eq!(config.batch_size(), 2);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            BatchConfig::from_json_str(r#"{"batch_size": 16, "right_source": "context"}"#)
                .unwrap();
        assert_eq!(config.batch_size(), 16);
        assert_eq!(config.right_source(), RightEntitySource::Context);
        assert!(config.shuffle());
    }

    #[test]
    fn test_from_json_rejects_zero() {
        assert!(BatchConfig::from_json_str(r#"{"batch_size": 0}"#).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, r#"{"batch_size": 5, "shuffle": false}"#).unwrap();

        let config = BatchConfig::from_json_file(&path).unwrap();
        assert_eq!(config.batch_size(), 5);
        assert!(!config.shuffle());
    }

    #[test]
    fn test_right_source_display() {
        assert_eq!(RightEntitySource::Drug.to_string(), "drug");
        assert_eq!(RightEntitySource::Context.to_string(), "context");
    }
}
