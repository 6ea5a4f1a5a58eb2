//! Readers and writers for the local dataset layout.
//!
//! A dataset directory holds three files:
//!
//! - `context_set.json`: `{"<context>": [f32, ...], ...}`
//! - `drug_set.json`: `{"<drug>": {"smiles": "...", "features": [f32, ...]}, ...}`
//! - `labeled_triples.csv`: comma-separated with a header naming the columns
//!   `drug_1`, `drug_2`, `context` and `label`
//!
//! # Example
//!
//! ```no_run
//! use drugpair_data::io::load_dataset;
//!
//! let loader = load_dataset("drugcomb", "data/drugcomb").unwrap();
//! println!("{} triples", loader.labeled_triples().len());
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use drugpair_core::{DrugPairError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::feature_set::{ContextFeatureSet, DrugFeatureSet, FeatureStore};
use crate::loader::DatasetLoader;
use crate::triples::{LabeledTriple, LabeledTriples};

/// File name of the context feature set.
pub const CONTEXT_SET_FILE: &str = "context_set.json";

/// File name of the drug feature set.
pub const DRUG_SET_FILE: &str = "drug_set.json";

/// File name of the labeled triples.
pub const LABELED_TRIPLES_FILE: &str = "labeled_triples.csv";

const TRIPLE_COLUMNS: [&str; 4] = ["drug_1", "drug_2", "context", "label"];

#[derive(Debug, Serialize, Deserialize)]
struct DrugRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    smiles: Option<String>,
    features: Vec<f32>,
}

/// Returns `true` if `dir` holds all three dataset files.
pub fn is_dataset_dir(dir: impl AsRef<Path>) -> bool {
    let dir = dir.as_ref();
    [CONTEXT_SET_FILE, DRUG_SET_FILE, LABELED_TRIPLES_FILE]
        .iter()
        .all(|file| dir.join(file).is_file())
}

/// Reads a context feature set from a JSON object of feature arrays.
pub fn read_context_features(path: impl AsRef<Path>) -> Result<ContextFeatureSet> {
    let path = path.as_ref();
    let rows: BTreeMap<String, Vec<f32>> =
        serde_json::from_reader(BufReader::new(File::open(path)?))?;
    Ok(ContextFeatureSet::from_rows(rows))
}

/// Reads a drug feature set from a JSON object of drug records.
///
/// SMILES strings are accepted but not kept.
pub fn read_drug_features(path: impl AsRef<Path>) -> Result<DrugFeatureSet> {
    let path = path.as_ref();
    let records: BTreeMap<String, DrugRecord> =
        serde_json::from_reader(BufReader::new(File::open(path)?))?;
    Ok(records
        .into_iter()
        .map(|(drug, record)| (drug, record.features))
        .collect())
}

/// Reads labeled triples from a CSV file with a header row.
///
/// Columns are located by name; extra columns are ignored and blank lines
/// skipped. Fields may be quoted, so keys can hold commas and quotes.
pub fn read_labeled_triples(path: impl AsRef<Path>) -> Result<LabeledTriples> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(BufReader::new(File::open(path)?));

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    if headers.is_empty() {
        return Ok(LabeledTriples::new());
    }
    let columns = locate_columns(path, &headers)?;
    let width = columns.iter().copied().max().unwrap_or(0) + 1;

    let mut triples = LabeledTriples::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let line_no = record.position().map_or(0, |pos| pos.line() as usize);
        if record.len() < width {
            return Err(parse_error(
                path,
                line_no,
                format!("expected at least {width} columns, got {}", record.len()),
            ));
        }
        let label = record[columns[3]].trim().parse::<f32>().map_err(|e| {
            parse_error(
                path,
                line_no,
                format!("invalid label {:?}: {e}", &record[columns[3]]),
            )
        })?;
        triples.push(LabeledTriple::new(
            &record[columns[0]],
            &record[columns[1]],
            &record[columns[2]],
            label,
        ));
    }
    Ok(triples)
}

/// Writes a context feature set as a JSON object.
pub fn write_context_features(path: impl AsRef<Path>, contexts: &ContextFeatureSet) -> Result<()> {
    let rows: BTreeMap<&str, Vec<f32>> = contexts
        .iter()
        .map(|(key, features)| (key, features.iter().copied().collect()))
        .collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &rows)?;
    writer.flush()?;
    Ok(())
}

/// Writes a drug feature set as a JSON object of drug records.
pub fn write_drug_features(path: impl AsRef<Path>, drugs: &DrugFeatureSet) -> Result<()> {
    let records: BTreeMap<&str, DrugRecord> = drugs
        .iter()
        .map(|(key, features)| {
            (
                key,
                DrugRecord {
                    smiles: None,
                    features: features.iter().copied().collect(),
                },
            )
        })
        .collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &records)?;
    writer.flush()?;
    Ok(())
}

/// Writes labeled triples as CSV with a `drug_1,drug_2,context,label` header.
///
/// Keys holding commas, quotes or line breaks are quoted.
pub fn write_labeled_triples(path: impl AsRef<Path>, triples: &LabeledTriples) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    writer
        .write_record(TRIPLE_COLUMNS)
        .map_err(|e| csv_error(path, e))?;
    for triple in triples {
        let label = triple.label.to_string();
        writer
            .write_record([
                triple.left.as_str(),
                triple.right.as_str(),
                triple.context.as_str(),
                label.as_str(),
            ])
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

/// Loads a dataset from a directory in the local layout.
pub fn load_dataset(name: impl Into<String>, dir: impl AsRef<Path>) -> Result<DatasetLoader> {
    let name = name.into();
    let dir = dir.as_ref();

    let contexts = read_context_features(dir.join(CONTEXT_SET_FILE))?;
    let drugs = read_drug_features(dir.join(DRUG_SET_FILE))?;
    let triples = read_labeled_triples(dir.join(LABELED_TRIPLES_FILE))?;

    info!(
        dataset = %name,
        dir = %dir.display(),
        contexts = contexts.len(),
        drugs = drugs.len(),
        triples = triples.len(),
        "loaded dataset"
    );
    Ok(DatasetLoader::new(name, contexts, drugs, triples))
}

/// Saves a dataset to a directory in the local layout, creating it if needed.
pub fn save_dataset(loader: &DatasetLoader, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    write_context_features(dir.join(CONTEXT_SET_FILE), loader.context_features())?;
    write_drug_features(dir.join(DRUG_SET_FILE), loader.drug_features())?;
    write_labeled_triples(dir.join(LABELED_TRIPLES_FILE), loader.labeled_triples())?;
    info!(dataset = loader.name(), dir = %dir.display(), "saved dataset");
    Ok(())
}

fn locate_columns(path: &Path, headers: &csv::StringRecord) -> Result<[usize; 4]> {
    let names: Vec<String> = headers.iter().map(str::to_ascii_lowercase).collect();

    let mut columns = [0usize; 4];
    for (slot, wanted) in columns.iter_mut().zip(TRIPLE_COLUMNS) {
        *slot = names.iter().position(|name| name == wanted).ok_or_else(|| {
            parse_error(path, 1, format!("missing column {wanted:?} in header"))
        })?;
    }
    Ok(columns)
}

fn csv_error(path: &Path, err: csv::Error) -> DrugPairError {
    let line = err.position().map_or(0, |pos| pos.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => DrugPairError::Io(io),
        _ => parse_error(path, line, message),
    }
}

fn parse_error(path: &Path, line: usize, message: String) -> DrugPairError {
    DrugPairError::Parse {
        path: PathBuf::from(path),
        line,
        message,
    }
}
