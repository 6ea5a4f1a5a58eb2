//! Drugpair CLI Library
//!
//! This crate provides the command-line interface for drug-pair datasets:
//!
//! - **Summary**: Entity counts, feature widths, densities and label balance
//! - **Validate**: Referential consistency between triples and feature sets
//! - **Batches**: Runs the batch generator and reports each batch
//!
//! Datasets are looked up by name in a registry discovered under the data
//! directory; every subdirectory holding `context_set.json`, `drug_set.json`
//! and `labeled_triples.csv` is a dataset.
//!
//! # Example
//!
//! ```bash
//! # Summarize a dataset
//! drugpair --data-dir /data --dataset drugcomb summary --json
//!
//! # Check that every triple resolves
//! drugpair --data-dir /data --dataset drugcomb validate --right-source drug
//!
//! # Inspect the first ten batches of 256 rows
//! drugpair --data-dir /data --dataset drugcomb batches --batch-size 256 --limit 10
//! ```

pub mod commands;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use drugpair_data::{DatasetLoader, DatasetRegistry};
use tracing::info;

pub use commands::{BatchesCommand, RightSourceArg, SummaryCommand, ValidateCommand};

/// Drugpair - feature sets and batches for drug-pair scoring
///
/// Loads datasets of context features, drug features and labeled drug-pair
/// triples, and exercises the batch generator over them.
#[derive(Parser, Debug)]
#[command(name = "drugpair")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Dataset selection shared by every command
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print summary statistics of a dataset
    Summary(SummaryCommand),

    /// Check that every triple references known feature keys
    Validate(ValidateCommand),

    /// Generate batches and report their shapes
    Batches(BatchesCommand),
}

impl Commands {
    /// Runs the selected command against the dataset chosen by `dataset`.
    pub fn run(&self, dataset: &DatasetArgs) -> CliResult<()> {
        match self {
            Commands::Summary(cmd) => cmd.run(dataset),
            Commands::Validate(cmd) => cmd.run(dataset),
            Commands::Batches(cmd) => cmd.run(dataset),
        }
    }
}

/// Where to find datasets and which one to load.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Directory whose subdirectories are datasets
    #[arg(long, short = 'd', env = "DRUGPAIR_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Dataset name (case, '-', '_' and spaces are ignored); may be omitted
    /// when the data directory holds a single dataset
    #[arg(long, short = 'n', env = "DRUGPAIR_DATASET", global = true)]
    pub dataset: Option<String>,
}

impl DatasetArgs {
    /// Discovers the datasets under the data directory.
    pub fn registry(&self) -> CliResult<DatasetRegistry> {
        DatasetRegistry::discover(&self.data_dir).with_context(|| {
            format!("Failed to scan data directory {}", self.data_dir.display())
        })
    }

    /// Loads the selected dataset.
    pub fn load(&self) -> CliResult<DatasetLoader> {
        let registry = self.registry()?;
        let name = match &self.dataset {
            Some(name) => name.clone(),
            None => match registry.names().as_slice() {
                [only] => only.to_string(),
                [] => bail!("No datasets found under {}", self.data_dir.display()),
                names => bail!(
                    "Found {} datasets ({}); choose one with --dataset",
                    names.len(),
                    names.join(", ")
                ),
            },
        };

        info!("Loading dataset {} from {:?}", name, self.data_dir);
        registry
            .resolve(&name)
            .with_context(|| format!("Failed to load dataset {name}"))
    }
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;
