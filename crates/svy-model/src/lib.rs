//! Core data model for survey tabulation plans.
//!
//! A plan (usually `meta.json`) declares the variables to tabulate, named
//! filter sets, an optional global filter, and weighting options. This crate
//! owns the serde schema for that file and the filter-condition grammar the
//! engine evaluates.

pub mod config;
pub mod error;
pub mod filter;
pub mod variable;

pub use config::{SurveyConfig, WeightingConfig};
pub use error::{ConfigError, Result};
pub use filter::{FilterCondition, FilterSet};
pub use variable::{ValueLabels, VarKind, VariableDef, format_code};
