//! Summary Command Implementation
//!
//! Prints the statistics of a dataset, either as aligned text or as JSON.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use drugpair_data::DatasetLoader;

use crate::DatasetArgs;

/// Print summary statistics of a dataset
///
/// # Example
///
/// ```bash
/// drugpair --dataset drugcomb summary
/// drugpair --dataset drugcomb summary --json
/// ```
#[derive(Args, Debug, Clone, Default)]
pub struct SummaryCommand {
    /// Emit the summary as a JSON object
    #[arg(long)]
    pub json: bool,
}

impl SummaryCommand {
    /// Execute the summary command
    pub fn run(&self, dataset: &DatasetArgs) -> Result<()> {
        let loader = dataset.load()?;
        let stdout = std::io::stdout();
        self.write_report(&loader, &mut stdout.lock())
    }

    /// Writes the summary of `loader` to `out`.
    pub fn write_report<W: Write>(&self, loader: &DatasetLoader, out: &mut W) -> Result<()> {
        let summary = loader.summarize();

        if self.json {
            serde_json::to_writer_pretty(&mut *out, &summary)?;
            writeln!(out)?;
            return Ok(());
        }

        let triples = loader.labeled_triples();
        writeln!(out, "dataset:           {}", summary.name)?;
        writeln!(out, "contexts:          {}", summary.context_count)?;
        writeln!(out, "drugs:             {}", summary.drug_count)?;
        writeln!(out, "triples:           {}", summary.triple_count)?;
        writeln!(out, "context channels:  {}", summary.context_channels)?;
        writeln!(out, "drug channels:     {}", summary.drug_channels)?;
        writeln!(out, "context density:   {}", format_ratio(summary.context_density))?;
        writeln!(out, "drug density:      {}", format_ratio(summary.drug_density))?;
        writeln!(out, "triple drugs:      {}", triples.drug_count())?;
        writeln!(out, "triple contexts:   {}", triples.context_count())?;
        writeln!(out, "combinations:      {}", triples.combination_count())?;
        writeln!(out, "positives:         {}", triples.positive_count())?;
        writeln!(out, "negatives:         {}", triples.negative_count())?;
        writeln!(out, "positive rate:     {}", format_ratio(summary.positive_rate))?;
        Ok(())
    }
}

fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}
