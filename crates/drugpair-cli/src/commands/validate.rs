//! Validate Command Implementation

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use drugpair_core::RightEntitySource;
use drugpair_data::DatasetLoader;
use tracing::{info, warn};

use super::RightSourceArg;
use crate::DatasetArgs;

/// Check that every triple references known feature keys
///
/// Resolves the left key against the drugs, the right key against the
/// feature set chosen by `--right-source`, and the context key against the
/// contexts. Fails on the first dangling key.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateCommand {
    /// Feature set holding the right-hand keys
    #[arg(long, short = 'r', value_enum, default_value = "drug")]
    pub right_source: RightSourceArg,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn run(&self, dataset: &DatasetArgs) -> Result<()> {
        let loader = dataset.load()?;
        let stdout = std::io::stdout();
        self.write_report(&loader, &mut stdout.lock())
    }

    /// Validates `loader` and writes the outcome to `out`.
    pub fn write_report<W: Write>(&self, loader: &DatasetLoader, out: &mut W) -> Result<()> {
        let right_source = RightEntitySource::from(self.right_source);
        info!(
            "Validating dataset {} with right source {}",
            loader.name(),
            right_source
        );

        loader
            .validate_references(right_source)
            .with_context(|| format!("Dataset {} failed validation", loader.name()))?;

        let mut deduplicated = loader.labeled_triples().clone();
        let duplicates = deduplicated.drop_duplicates();
        if duplicates > 0 {
            warn!("Dataset {} holds {} duplicate triples", loader.name(), duplicates);
        }

        writeln!(
            out,
            "{}: {} triples reference known keys ({} duplicates)",
            loader.name(),
            loader.labeled_triples().len(),
            duplicates
        )?;
        Ok(())
    }
}
