//! Validation of tabulation plans against loaded datasets.
//!
//! [`validate`] cross-checks every plan reference (variables, filter sets,
//! weight column) against the actual table and returns a severity-tagged
//! [`ValidationReport`]. The pass is infallible: problems become issues,
//! never early returns, so one run shows everything that needs fixing.

pub mod validator;

pub use validator::{Issue, Severity, ValidationReport, validate};
