//! Error types for each pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading the transaction export into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no sheets")]
    NoSheets,
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: required column '{column}' is empty")]
    EmptyValue { row: usize, column: &'static str },
}

/// A timestamp cell that no accepted format could parse.
#[derive(Debug, Error)]
#[error("row {row}: cannot parse timestamp '{value}'")]
pub struct NormalizationError {
    pub row: usize,
    pub value: String,
}

/// Failures while computing derived tables from a normalized dataset.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("measure '{measure}' is not finite ({value})")]
    NonFinite { measure: &'static str, value: f64 },
}

/// Any error in the load -> normalize -> aggregate pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}
