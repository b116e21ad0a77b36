//! CSV dataset reader.
//!
//! Columns are looked up by header name, so column order in the file is free
//! and extra columns are ignored. Every feature column plus `CGPA` must exist.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use super::DatasetError;
use crate::logic::features::layout::{
    required_columns, CATEGORICAL_FEATURES, ID_COLUMN, NUMERIC_FEATURES, TARGET_COLUMN,
};
use crate::logic::features::FeatureRow;

/// Cell spellings treated as missing values
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None"];

/// One parsed line of the dataset, before labelling
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub id: Option<String>,
    pub features: FeatureRow,
    pub cgpa: Option<f64>,
}

impl RawRow {
    /// `Student_ID` if present, otherwise the line number
    pub fn describe(&self) -> String {
        match &self.id {
            Some(id) => format!("line {} (Student_ID {})", self.line, id),
            None => format!("line {}", self.line),
        }
    }
}

/// Resolved header positions
struct ColumnMap {
    numeric: Vec<usize>,
    categorical: Vec<usize>,
    target: usize,
    id: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self, DatasetError> {
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect();

        let missing: Vec<String> = required_columns()
            .filter(|c| !positions.contains_key(c))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns { missing });
        }

        let lookup = |names: &[&str]| -> Vec<usize> {
            names.iter().filter_map(|n| positions.get(n).copied()).collect()
        };

        Ok(Self {
            numeric: lookup(NUMERIC_FEATURES),
            categorical: lookup(CATEGORICAL_FEATURES),
            target: positions[TARGET_COLUMN],
            id: positions.get(ID_COLUMN).copied(),
        })
    }
}

fn cell<'r>(record: &'r StringRecord, index: usize) -> Option<&'r str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|v| !MISSING_MARKERS.contains(v))
}

fn parse_number(
    record: &StringRecord,
    index: usize,
    line: u64,
    column: &str,
) -> Result<Option<f64>, DatasetError> {
    match cell(record, index) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| DatasetError::InvalidNumber {
                line,
                column: column.to_string(),
                value: raw.to_string(),
            }),
    }
}

/// Read a dataset file
pub fn read_csv(path: &Path) -> Result<Vec<RawRow>, DatasetError> {
    log::info!("Reading dataset from: {}", path.display());

    let file = std::fs::File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv_from(file)
}

/// Read a dataset from any byte source
pub fn read_csv_from<R: io::Read>(source: R) -> Result<Vec<RawRow>, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::resolve(&headers)?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(i as u64 + 2);

        let mut features = FeatureRow::default();
        for (slot, (&index, name)) in columns.numeric.iter().zip(NUMERIC_FEATURES).enumerate() {
            features.numeric[slot] = parse_number(&record, index, line, name)?;
        }
        for (slot, &index) in columns.categorical.iter().enumerate() {
            features.categorical[slot] = cell(&record, index).map(str::to_string);
        }

        rows.push(RawRow {
            line,
            id: columns.id.and_then(|i| cell(&record, i)).map(str::to_string),
            features,
            cgpa: parse_number(&record, columns.target, line, TARGET_COLUMN)?,
        });
    }

    if rows.is_empty() {
        return Err(DatasetError::Empty);
    }

    log::info!("Read {} rows ({} with missing feature cells)",
        rows.len(),
        rows.iter().filter(|r| !r.features.is_complete()).count());

    Ok(rows)
}
