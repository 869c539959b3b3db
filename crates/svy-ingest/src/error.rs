//! Error types for data loading and frame access.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors from column access on a loaded frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A referenced column is absent from the data file.
    #[error("variable '{column}' not found in data file")]
    ColumnNotFound { column: String },

    /// An underlying dataframe operation failed.
    #[error("dataframe operation failed: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for FrameError {
    fn from(err: PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Errors raised while loading survey data files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File access ===
    /// The file does not exist.
    #[error("data file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV parsing ===
    /// The CSV could not be parsed.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// The table parsed but holds no rows.
    #[error("data file {path} contains no rows")]
    EmptyTable { path: PathBuf },

    /// No column survived numeric coercion.
    #[error("data file {path} contains no numeric columns")]
    NoNumericColumns { path: PathBuf },

    // === Labels sidecar ===
    /// The labels sidecar is not valid JSON.
    #[error("failed to parse labels file {path}: {source}")]
    LabelsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A sidecar value-label key does not parse as a number.
    #[error("labels file {path}: value label key '{key}' for '{variable}' is not numeric")]
    LabelKey {
        path: PathBuf,
        variable: String,
        key: String,
    },

    /// Frame-level failure during ingestion.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Convenience alias for ingest results.
pub type Result<T> = std::result::Result<T, IngestError>;
