//! Batches Command Implementation
//!
//! Runs the batch generator over a dataset and prints one line per batch.
//! The batch configuration comes from an optional JSON file; explicit flags
//! override the values it holds.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use drugpair_core::BatchConfig;
use drugpair_data::{DatasetLoader, DrugPairBatch};
use tracing::info;

use super::RightSourceArg;
use crate::DatasetArgs;

/// Generate batches and report their shapes
///
/// # Example
///
/// ```bash
/// drugpair --dataset drugcomb batches \
///     --config batching.json \
///     --batch-size 512 \
///     --no-shuffle \
///     --limit 5
/// ```
#[derive(Args, Debug, Clone, Default)]
pub struct BatchesCommand {
    /// JSON file with a batch configuration
    #[arg(long, short = 'c', env = "DRUGPAIR_BATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Rows per batch
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,

    /// Shuffle the triples before batching
    #[arg(long, conflicts_with = "no_shuffle")]
    pub shuffle: bool,

    /// Keep the triples in their stored order
    #[arg(long)]
    pub no_shuffle: bool,

    /// Shuffle seed
    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    /// Drop the final batch when it is shorter than the batch size
    #[arg(long)]
    pub drop_remainder: bool,

    /// Feature set holding the right-hand keys
    #[arg(long, short = 'r', value_enum)]
    pub right_source: Option<RightSourceArg>,

    /// Stop after this many batches
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

impl BatchesCommand {
    /// Execute the batches command
    pub fn run(&self, dataset: &DatasetArgs) -> Result<()> {
        let loader = dataset.load()?;
        let stdout = std::io::stdout();
        self.write_report(&loader, &mut stdout.lock())
    }

    /// Resolves the batch configuration from the config file and the flags.
    pub fn batch_config(&self) -> Result<BatchConfig> {
        let base = match &self.config {
            Some(path) => BatchConfig::from_json_file(path)
                .with_context(|| format!("Failed to read batch config {}", path.display()))?,
            None => BatchConfig::default(),
        };

        let mut builder = base.to_builder();
        if let Some(batch_size) = self.batch_size {
            builder = builder.batch_size(batch_size);
        }
        if self.shuffle {
            builder = builder.shuffle(true);
        }
        if self.no_shuffle {
            builder = builder.shuffle(false);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if self.drop_remainder {
            builder = builder.drop_remainder(true);
        }
        if let Some(source) = self.right_source {
            builder = builder.right_source(source.into());
        }
        builder.build().context("Invalid batch configuration")
    }

    /// Generates batches over `loader` and writes one line per batch to `out`.
    pub fn write_report<W: Write>(&self, loader: &DatasetLoader, out: &mut W) -> Result<()> {
        let config = self.batch_config()?;
        info!(
            "Batching dataset {}: batch_size={} shuffle={} seed={} drop_remainder={} right_source={}",
            loader.name(),
            config.batch_size(),
            config.shuffle(),
            config.seed(),
            config.drop_remainder(),
            config.right_source()
        );

        let generator = loader.batch_generator(config)?;
        let total = generator.num_batches();
        let limit = self.limit.unwrap_or(total);

        let mut emitted = 0;
        for (index, batch) in generator.generate().take(limit).enumerate() {
            let batch = batch.with_context(|| format!("Failed to assemble batch {index}"))?;
            writeln!(out, "{}", describe(index, &batch))?;
            emitted += 1;
        }

        info!("Generated {} of {} batches", emitted, total);
        Ok(())
    }
}

fn describe(index: usize, batch: &DrugPairBatch) -> String {
    let positives = batch.iter().filter(|t| t.is_positive()).count();
    format!(
        "batch {index}: rows={} left={} right={} context={} positives={positives}",
        batch.len(),
        shape(batch.left_features().map(|m| m.dim())),
        shape(batch.right_features().map(|m| m.dim())),
        shape(batch.context_features().map(|m| m.dim())),
    )
}

fn shape(dim: Option<(usize, usize)>) -> String {
    match dim {
        Some((rows, cols)) => format!("{rows}x{cols}"),
        None => "-".to_string(),
    }
}
