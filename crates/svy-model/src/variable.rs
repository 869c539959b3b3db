//! Variable definitions: the questions a tabulation plan covers.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How a variable stores responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    /// One column, one answer code per respondent.
    Single,
    /// A family of 0/1 indicator columns, one per option.
    Multi,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders an answer code for display: 1.0 becomes "1", 2.5 stays "2.5".
pub fn format_code(value: f64) -> String {
    format!("{value}")
}

/// Ordered answer-code labels for a single-response variable.
///
/// Keys are the JSON object keys and must parse as numbers; insertion order
/// is the display order of the labelled codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueLabels(IndexMap<String, String>);

impl ValueLabels {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.0.insert(key.into(), label.into());
    }

    /// First key that does not parse as a number, if any.
    pub fn first_bad_key(&self) -> Option<&str> {
        self.0
            .keys()
            .find(|key| key.trim().parse::<f64>().is_err())
            .map(String::as_str)
    }

    /// Parsed (code, label) pairs in display order.
    ///
    /// Keys that fail to parse are skipped; plan loading rejects them up
    /// front, so this only drops keys on hand-built maps.
    pub fn coded(&self) -> Vec<(f64, String)> {
        self.0
            .iter()
            .filter_map(|(key, label)| {
                key.trim()
                    .parse::<f64>()
                    .ok()
                    .map(|code| (code, label.clone()))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValueLabels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Declaration of one variable to tabulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VarKind,
    #[serde(default)]
    pub label: Option<String>,
    /// Answer-code labels; override the data file's own labels when present.
    #[serde(default)]
    pub value_labels: Option<ValueLabels>,
    /// Indicator columns of a multi variable, in display order.
    #[serde(default)]
    pub sub_variables: Vec<String>,
    /// Display labels for individual indicator columns.
    #[serde(default)]
    pub sub_variable_labels: IndexMap<String, String>,
    /// Filter set applied to this variable instead of the global filter.
    #[serde(default)]
    pub filter_set: Option<String>,
}

impl VariableDef {
    /// New single-response definition with defaults.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Single,
            label: None,
            value_labels: None,
            sub_variables: Vec::new(),
            sub_variable_labels: IndexMap::new(),
            filter_set: None,
        }
    }

    /// New multi-response definition over the given indicator columns.
    pub fn multi(
        name: impl Into<String>,
        sub_variables: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            kind: VarKind::Multi,
            sub_variables: sub_variables.into_iter().map(Into::into).collect(),
            ..Self::single(name)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value_labels(mut self, labels: ValueLabels) -> Self {
        self.value_labels = Some(labels);
        self
    }

    pub fn with_sub_variable_label(
        mut self,
        sub: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.sub_variable_labels.insert(sub.into(), label.into());
        self
    }

    pub fn with_filter_set(mut self, name: impl Into<String>) -> Self {
        self.filter_set = Some(name.into());
        self
    }

    /// Label to show in outputs, falling back to the variable name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}
