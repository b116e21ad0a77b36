//! Dataset Module - Training data ingestion and labelling
//!
//! Reads the tabular dataset, derives a Performance Level from each CGPA via
//! the fixed bins, and splits the labelled rows for training and evaluation.

pub mod label;
pub mod reader;
pub mod split;


use std::path::PathBuf;

pub use label::{BinError, CgpaBins, PerformanceLevel, BINS_VERSION};
pub use reader::{read_csv, read_csv_from, RawRow};
pub use split::{stratified_split, SplitIndices};

use crate::logic::features::FeatureRow;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("line {line}: column {column} has non-numeric value '{value}'")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },
    #[error("dataset contains no rows")]
    Empty,
    #[error("{row}: CGPA is missing")]
    MissingTarget { row: String },
    #[error("{row}: {source}")]
    Unlabelable {
        row: String,
        #[source]
        source: BinError,
    },
    #[error("{count} row(s) have a CGPA outside the labelled range; first: {first}")]
    OutOfRangeRows { count: usize, first: String },
    #[error("test ratio must be strictly between 0 and 1, got {0}")]
    InvalidTestRatio(f64),
    #[error("class {class} has only {count} row(s); a stratified split needs at least 2")]
    ClassTooSmall { class: PerformanceLevel, count: usize },
    #[error("{rows} rows cannot be split so that each of {classes} classes appears on both sides")]
    SplitTooSmall { rows: usize, classes: usize },
}

/// What to do with rows whose CGPA no bin covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum OutOfRangePolicy {
    /// Abort the run
    #[default]
    Reject,
    /// Drop the row and log a warning
    Skip,
}

/// A training row with its derived label
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    pub id: Option<String>,
    pub features: FeatureRow,
    pub cgpa: f64,
    pub label: PerformanceLevel,
}

#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    pub rows: Vec<LabeledRow>,
    /// Rows dropped under `OutOfRangePolicy::Skip`
    pub skipped: usize,
}

impl LabeledDataset {
    pub fn labels(&self) -> Vec<PerformanceLevel> {
        self.rows.iter().map(|r| r.label).collect()
    }

    /// Row count per level, in `PerformanceLevel::ALL` order
    pub fn class_counts(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for row in &self.rows {
            counts[row.label.index()] += 1;
        }
        counts
    }
}

/// Attach a Performance Level to every row.
///
/// A missing CGPA is always fatal. Out-of-range or non-finite values follow
/// `policy`; under `Reject` every offender is counted before failing.
pub fn label_rows(
    rows: Vec<RawRow>,
    bins: &CgpaBins,
    policy: OutOfRangePolicy,
) -> Result<LabeledDataset, DatasetError> {
    let mut dataset = LabeledDataset::default();
    let mut rejected: Vec<DatasetError> = Vec::new();

    for row in rows {
        let cgpa = row.cgpa.ok_or_else(|| DatasetError::MissingTarget { row: row.describe() })?;

        match bins.level_for(cgpa) {
            Ok(label) => dataset.rows.push(LabeledRow {
                id: row.id,
                features: row.features,
                cgpa,
                label,
            }),
            Err(source) => match policy {
                OutOfRangePolicy::Reject => rejected.push(DatasetError::Unlabelable {
                    row: row.describe(),
                    source,
                }),
                OutOfRangePolicy::Skip => {
                    log::warn!("Skipping {}: {}", row.describe(), source);
                    dataset.skipped += 1;
                }
            },
        }
    }

    match rejected.len() {
        0 => {}
        1 => return Err(rejected.remove(0)),
        count => {
            return Err(DatasetError::OutOfRangeRows {
                count,
                first: rejected[0].to_string(),
            })
        }
    }

    if dataset.rows.is_empty() {
        return Err(DatasetError::Empty);
    }

    let counts = dataset.class_counts();
    log::info!(
        "Labelled {} rows: Low={} Medium={} High={} (skipped {})",
        dataset.rows.len(),
        counts[0],
        counts[1],
        counts[2],
        dataset.skipped
    );

    Ok(dataset)
}
