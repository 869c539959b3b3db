//! Filter grammar: row predicates combined into named filter sets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::variable::format_code;

/// A row predicate applied to one variable.
///
/// Conditions deserialize from single-key JSON objects such as `{"eq": 1}`
/// or `{"between": [18, 34]}`. Objects with zero or several operator keys
/// are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    /// Keep rows equal to the code.
    Eq(f64),
    /// Keep rows matching any of the codes.
    In(Vec<f64>),
    /// Keep rows inside the inclusive range.
    Between(f64, f64),
    /// Keep rows where the value is present.
    NotMissing(bool),
    /// Keep rows that selected at least one of the listed indicator columns.
    Any(Vec<String>),
    /// Keep rows that selected every listed indicator column.
    All(Vec<String>),
    /// Keep rows that selected at least N options of a multi variable.
    MinSelected(u32),
}

impl FilterCondition {
    /// Human-readable description used in reports and warnings.
    pub fn describe(&self) -> String {
        match self {
            Self::Eq(value) => format!("= {}", format_code(*value)),
            Self::In(values) => format!("IN [{}]", join_codes(values)),
            Self::Between(low, high) => {
                format!("BETWEEN {} AND {}", format_code(*low), format_code(*high))
            }
            Self::NotMissing(_) => "Not Missing".to_string(),
            Self::Any(columns) => format!("Selected ANY of [{}]", columns.join(", ")),
            Self::All(columns) => format!("Selected ALL of [{}]", columns.join(", ")),
            Self::MinSelected(min) => format!("Selected at least {min} option(s)"),
        }
    }
}

fn join_codes(values: &[f64]) -> String {
    values
        .iter()
        .copied()
        .map(format_code)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A named set of conditions, one per variable, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(IndexMap<String, FilterCondition>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variable: impl Into<String>, condition: FilterCondition) {
        self.0.insert(variable.into(), condition);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Conditions in declaration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, FilterCondition> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, FilterCondition)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, FilterCondition)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, c)| (k.into(), c)).collect())
    }
}
