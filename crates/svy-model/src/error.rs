//! Error types for plan loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a tabulation plan.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The plan file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The plan file is not valid JSON or violates the schema.
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value-label key does not parse as a number.
    #[error("variable '{variable}': value label key '{key}' is not numeric")]
    ValueLabelKey { variable: String, key: String },
}

/// Convenience alias for plan-loading results.
pub type Result<T> = std::result::Result<T, ConfigError>;
