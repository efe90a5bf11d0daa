//! Labeled evaluation data
//!
//! A CSV file with a header row. Columns are matched by name, so their order
//! is free and extra columns are ignored. The `churn` column holds the
//! expected label (0/1); the four feature columns feed the model.

use churn_common::{FeatureVector, FEATURE_NAMES};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the label column
pub const LABEL_COLUMN: &str = "churn";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("line {line}: cannot parse {column} value {value:?}")]
    InvalidCell {
        line: u64,
        column: String,
        value: String,
    },

    #[error("line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error("dataset has no rows")]
    Empty,
}

/// Features and expected labels, index-aligned
#[derive(Debug, Clone, Default)]
pub struct EvaluationDataset {
    features: Vec<FeatureVector>,
    labels: Vec<u8>,
}

impl EvaluationDataset {
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        let feature_idx = [
            column(FEATURE_NAMES[0])?,
            column(FEATURE_NAMES[1])?,
            column(FEATURE_NAMES[2])?,
            column(FEATURE_NAMES[3])?,
        ];
        let label_idx = column(LABEL_COLUMN)?;

        let mut dataset = Self::default();
        for record in csv.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let features = FeatureVector::new(
                parse_cell(&record, feature_idx[0], FEATURE_NAMES[0], line)?,
                parse_cell(&record, feature_idx[1], FEATURE_NAMES[1], line)?,
                parse_cell(&record, feature_idx[2], FEATURE_NAMES[2], line)?,
                parse_cell(&record, feature_idx[3], FEATURE_NAMES[3], line)?,
            )
            .map_err(|e| DatasetError::InvalidRow {
                line,
                message: e.to_string(),
            })?;

            let label = match parse_cell::<i64>(&record, label_idx, LABEL_COLUMN, line)? {
                0 => 0,
                1 => 1,
                other => {
                    return Err(DatasetError::InvalidRow {
                        line,
                        message: format!("{} must be 0 or 1 (got {})", LABEL_COLUMN, other),
                    })
                }
            };

            dataset.features.push(features);
            dataset.labels.push(label);
        }

        if dataset.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(dataset)
    }

    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of rows labeled as churn
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

fn parse_cell<T: FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> Result<T, DatasetError> {
    let raw = record.get(idx).unwrap_or_default();
    raw.parse::<T>().map_err(|_| DatasetError::InvalidCell {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}
