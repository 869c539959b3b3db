//! Error types for frequency tabulation.

use svy_filter::FilterError;
use svy_ingest::FrameError;
use svy_weight::WeightError;
use thiserror::Error;

/// Errors raised while aggregating frequencies.
///
/// Tabulation mostly composes failures from the layers below it; the batch
/// processor downgrades these to warnings so a single bad variable never
/// aborts a run.
#[derive(Debug, Error)]
pub enum FreqError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Weight(#[from] WeightError),
}

pub type Result<T> = std::result::Result<T, FreqError>;
