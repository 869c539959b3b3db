//! Frequency tabulation for survey variables.
//!
//! Single-response variables count answer codes against the rows in scope;
//! multi-response variables count 0/1 indicator columns against the base of
//! respondents who selected at least one option. Both come weighted and
//! unweighted. The [`FrequencyProcessor`] drives a whole plan: it resolves
//! each variable's filter scope, applies weighting when configured, and
//! collects warnings instead of failing the batch.

pub mod error;
pub mod multi;
pub mod processor;
pub mod result;
pub mod single;

pub use error::{FreqError, Result};
pub use multi::{multi_unweighted, multi_weighted, resolve_options};
pub use processor::{BatchOutcome, FrequencyProcessor};
pub use result::{FilterInfo, FrequencyRow, ResultTotals, VariableResult};
pub use single::{effective_value_labels, single_unweighted, single_weighted};
