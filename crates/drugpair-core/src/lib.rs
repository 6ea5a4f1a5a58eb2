//! Core types shared across the drugpair crates.
//!
//! This crate holds the pieces every other drugpair crate depends on:
//!
//! - **Error types**: [`DrugPairError`] and the [`Result`] alias.
//! - **Configuration**: [`BatchConfig`], the settings of a batch generator,
//!   and [`RightEntitySource`], which selects the feature set used for the
//!   right-hand key of a labeled triple.
//!
//! # Example
//!
//! ```
//! use drugpair_core::{BatchConfig, DrugPairError};
//!
//! let err = BatchConfig::builder().batch_size(0).build().unwrap_err();
//! assert!(matches!(err, DrugPairError::ConfigError { .. }));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::{BatchConfig, BatchConfigBuilder, RightEntitySource};
pub use error::{DrugPairError, Result};
