//! Error types for filter evaluation.

use svy_ingest::FrameError;
use thiserror::Error;

/// Errors raised while evaluating filter conditions.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A referenced column is missing or unreadable.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The condition's operand cannot be evaluated.
    #[error("malformed condition for '{variable}': {reason}")]
    MalformedCondition { variable: String, reason: String },

    /// min_selected targets a variable that is not defined as multi.
    #[error(
        "cannot use 'min_selected' on '{variable}': variable is not defined as multi with sub_variables"
    )]
    UndefinedMultiVariable { variable: String },
}

/// Convenience alias for filter results.
pub type Result<T> = std::result::Result<T, FilterError>;
