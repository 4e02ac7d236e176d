//! Benchmark dataset I/O.
//!
//! Datasets are tab-separated tables with (at least) a gene column, a miRNA
//! column and a binary `label` column. Tools append a column of their own
//! scores and write the table back out as `*_predictions.tsv`.

pub mod jsonl;
pub mod registry;
pub mod tsv;

use std::path::PathBuf;

use crate::record::{FieldValue, SequencePairRecord};

pub use registry::BenchmarkDataset;

/// Column holding the 0/1 ground-truth label in every benchmark dataset.
pub const LABEL_COLUMN: &str = "label";

/// Errors that can occur while reading or writing datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("input has no header line")]
    MissingHeader,

    #[error("duplicate column '{0}' in header")]
    DuplicateColumn(String),

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid JSON record: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line}: expected a JSON object")]
    NotAnObject { line: usize },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("record {index}: label '{value}' is not 0 or 1")]
    InvalidLabel { index: usize, value: String },

    #[error("record {record}: column '{column}' contains a tab or line break and cannot be written as TSV")]
    UnwritableCell { record: usize, column: String },

    #[error("column name '{0}' contains a tab or line break and cannot be written as TSV")]
    UnwritableColumn(String),

    #[error("{} has {found} rows but the test set has {expected}", path.display())]
    RowCountMismatch {
        path: PathBuf,
        found: usize,
        expected: usize,
    },

    #[error("{scores} scores for {records} records")]
    ScoreCountMismatch { scores: usize, records: usize },

    #[error("unknown dataset '{0}' (expected helwak, hejret or klimentova)")]
    UnknownDataset(String),

    #[error("dataset {dataset} has no ratio 1:{ratio}")]
    UnknownRatio { dataset: &'static str, ratio: u32 },
}

/// An in-memory dataset: ordered column names plus one record per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<SequencePairRecord>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Renames a column in the header and in every record.
    ///
    /// Returns false (and changes nothing) if `from` is not a column. Renaming
    /// onto an existing column name is rejected the same way.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if !self.has_column(from) || self.has_column(to) {
            return false;
        }
        if let Some(col) = self.columns.iter_mut().find(|c| c.as_str() == from) {
            *col = to.to_string();
        }
        for rec in self.records.iter_mut() {
            rec.rename(from, to);
        }
        true
    }

    /// Parses a 0/1 label column. Accepts integer or float spellings
    /// (`1`, `1.0`) and JSON booleans.
    pub fn labels(&self, column: &str) -> Result<Vec<u8>, DatasetError> {
        if !self.has_column(column) {
            return Err(DatasetError::UnknownColumn(column.to_string()));
        }
        self.records
            .iter()
            .enumerate()
            .map(|(index, rec)| {
                let value = rec.get(column);
                parse_label(value).ok_or_else(|| DatasetError::InvalidLabel {
                    index,
                    value: value.map(FieldValue::to_cell).unwrap_or_default(),
                })
            })
            .collect()
    }
}

fn parse_label(value: Option<&FieldValue>) -> Option<u8> {
    let n = match value? {
        FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        FieldValue::Number(n) => *n,
        FieldValue::Bool(b) => return Some(u8::from(*b)),
        FieldValue::Structured(_) | FieldValue::Missing => return None,
    };
    if n == 0.0 {
        Some(0)
    } else if n == 1.0 {
        Some(1)
    } else {
        None
    }
}
