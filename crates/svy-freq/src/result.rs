//! Tabulated output: frequency rows, totals, and attached metadata.

use indexmap::IndexMap;
use svy_filter::FilterStats;
use svy_model::VarKind;
use svy_weight::WeightSummary;

/// One line of a frequency table.
///
/// Single-response rows carry the answer code in `value`; multi-response
/// option rows and the trailing Missing row leave it empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub value: Option<f64>,
    pub label: String,
    pub count: usize,
    /// Sum of weights for the row, present only on weighted results.
    pub weighted_count: Option<f64>,
    pub percentage: f64,
    pub is_missing: bool,
}

/// Denominators for a result, shaped by variable kind and weighting.
///
/// Single-response percentages run on the total rows in scope; multi-response
/// percentages run on the base (respondents who selected at least one
/// option), so multi columns may sum past 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultTotals {
    Single {
        total: usize,
        valid: usize,
    },
    SingleWeighted {
        total_unweighted: usize,
        total_weighted: f64,
        valid_unweighted: usize,
        valid_weighted: f64,
    },
    Multi {
        total_respondents: usize,
        base: usize,
    },
    MultiWeighted {
        total_unweighted: usize,
        total_weighted: f64,
        base_unweighted: usize,
        base_weighted: f64,
    },
}

impl ResultTotals {
    /// Respondents in scope after filtering, always unweighted.
    pub fn scope_rows(&self) -> usize {
        match self {
            Self::Single { total, .. }
            | Self::Multi {
                total_respondents: total,
                ..
            }
            | Self::SingleWeighted {
                total_unweighted: total,
                ..
            }
            | Self::MultiWeighted {
                total_unweighted: total,
                ..
            } => *total,
        }
    }

    /// Unweighted valid responses (single) or base (multi).
    pub fn valid_rows(&self) -> usize {
        match self {
            Self::Single { valid, .. }
            | Self::Multi { base: valid, .. }
            | Self::SingleWeighted {
                valid_unweighted: valid,
                ..
            }
            | Self::MultiWeighted {
                base_unweighted: valid,
                ..
            } => *valid,
        }
    }
}

/// How a result's scope was narrowed, kept for report headers.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterInfo {
    pub name: String,
    /// Variable name to human-readable condition, in declaration order.
    pub descriptions: IndexMap<String, String>,
    pub stats: FilterStats,
    /// True when the set came from the plan's global filter.
    pub is_global: bool,
}

/// Frequencies for one plan variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableResult {
    pub name: String,
    pub label: String,
    pub kind: VarKind,
    pub weighted: bool,
    pub totals: ResultTotals,
    pub rows: Vec<FrequencyRow>,
    pub filter: Option<FilterInfo>,
    /// Weight diagnostics for the scope, present only on weighted results.
    pub weight_summary: Option<WeightSummary>,
}

/// Share of `part` in `whole` as a percentage, zero when the whole is empty.
pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}
