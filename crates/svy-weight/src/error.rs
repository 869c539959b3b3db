//! Error types for weighting.

use svy_ingest::FrameError;
use thiserror::Error;

/// Errors raised while building a weight profile.
#[derive(Debug, Error)]
pub enum WeightError {
    /// The weight column is absent from the data file.
    #[error("weight variable '{column}' not found in data file")]
    ColumnNotFound { column: String },

    /// Screening removed every row.
    #[error(
        "no valid weights found in '{column}': all {total} respondent(s) have missing or invalid weights"
    )]
    NoValidWeights { column: String, total: usize },

    /// Frame-level failure while screening.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Convenience alias for weighting results.
pub type Result<T> = std::result::Result<T, WeightError>;
