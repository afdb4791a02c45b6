use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;

/// Reasons a dataset could not be produced. Any of these is fatal for the
/// dashboard: there is no partially loaded dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': invalid value {value}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
