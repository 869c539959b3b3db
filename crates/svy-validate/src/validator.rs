//! Plan-against-dataset validation.
//!
//! Checks run in one pass and collect everything they find; a plan with ten
//! problems reports ten issues, not the first one. Errors mean tabulation
//! would produce wrong or empty output; warnings flag things worth fixing
//! that the pipeline can work around.

use serde::Serialize;
use svy_ingest::SurveyFrame;
use svy_model::{FilterCondition, SurveyConfig, VarKind, VariableDef};

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }
}

/// A validation issue.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    /// The variable, filter set, or weight column the issue is about.
    pub subject: Option<String>,
    pub message: String,
}

impl Issue {
    fn error(category: &str, subject: Option<&str>, message: String) -> Self {
        Self {
            severity: Severity::Error,
            category: category.to_string(),
            subject: subject.map(ToString::to_string),
            message,
        }
    }

    fn warning(category: &str, subject: Option<&str>, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            category: category.to_string(),
            subject: subject.map(ToString::to_string),
            message,
        }
    }
}

/// Validation outcome for one plan and dataset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// True when no issue is an error; warnings don't block tabulation.
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
            .count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }
}

/// Validates a plan against the loaded dataset.
pub fn validate(config: &SurveyConfig, frame: &SurveyFrame) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.issues.extend(check_variables(config, frame));
    report.issues.extend(check_filters(config, frame));
    report.issues.extend(check_weighting(config, frame));
    report.issues.extend(check_practices(config));
    report
}

fn check_variables(config: &SurveyConfig, frame: &SurveyFrame) -> Vec<Issue> {
    let mut issues = Vec::new();

    if config.variables.is_empty() {
        issues.push(Issue::warning(
            "No Variables Defined",
            None,
            "No variables defined in configuration".to_string(),
        ));
        return issues;
    }

    for def in &config.variables {
        match def.kind {
            VarKind::Single => issues.extend(check_single_variable(def, frame)),
            VarKind::Multi => issues.extend(check_multi_variable(def, frame)),
        }
    }

    issues
}

fn check_single_variable(def: &VariableDef, frame: &SurveyFrame) -> Vec<Issue> {
    let mut issues = Vec::new();
    let label = def.display_label();

    if !frame.has_column(&def.name) {
        issues.push(Issue::error(
            "Variable Missing",
            Some(&def.name),
            format!(
                "Single-punch variable '{}' ({label}) not found in data file",
                def.name
            ),
        ));
    } else if column_is_empty(frame, &def.name) {
        issues.push(Issue::warning(
            "Empty Column",
            Some(&def.name),
            format!(
                "Variable '{}' ({label}) exists but contains no data",
                def.name
            ),
        ));
    }

    issues
}

fn check_multi_variable(def: &VariableDef, frame: &SurveyFrame) -> Vec<Issue> {
    let mut issues = Vec::new();
    let label = def.display_label();

    if def.sub_variables.is_empty() {
        issues.push(Issue::error(
            "Sub-Variables Missing",
            Some(&def.name),
            format!("Multi-punch variable '{}': Missing 'sub_variables'", def.name),
        ));
        return issues;
    }

    let missing: Vec<&str> = def
        .sub_variables
        .iter()
        .filter(|sub| !frame.has_column(sub))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        issues.push(Issue::error(
            "Sub-Variables Missing",
            Some(&def.name),
            format!(
                "Multi-punch variable '{}' ({label}): sub-variables not found: {}",
                def.name,
                missing.join(", ")
            ),
        ));
    } else if def
        .sub_variables
        .iter()
        .all(|sub| column_is_empty(frame, sub))
    {
        issues.push(Issue::warning(
            "Empty Column",
            Some(&def.name),
            format!(
                "Multi-punch variable '{}' ({label}): all sub-variables exist but contain no data",
                def.name
            ),
        ));
    }

    issues
}

fn check_filters(config: &SurveyConfig, frame: &SurveyFrame) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Some(global) = config.global_filter.as_deref()
        && !config.filter_sets.contains_key(global)
    {
        issues.push(Issue::error(
            "Unknown Filter Set",
            Some(global),
            format!("Global filter '{global}' is not defined in filter_sets"),
        ));
    }

    for def in &config.variables {
        if let Some(name) = def.filter_set.as_deref()
            && !config.filter_sets.contains_key(name)
        {
            issues.push(Issue::error(
                "Unknown Filter Set",
                Some(name),
                format!(
                    "Variable '{}': filter set '{name}' is not defined in filter_sets",
                    def.name
                ),
            ));
        }
    }

    for (filter_name, set) in &config.filter_sets {
        if set.is_empty() {
            issues.push(Issue::warning(
                "Empty Filter Set",
                Some(filter_name),
                format!("Filter '{filter_name}': No conditions defined"),
            ));
            continue;
        }
        for (variable, condition) in set.iter() {
            issues.extend(check_condition(config, frame, filter_name, variable, condition));
        }
    }

    issues
}

/// Value conditions need their column; selection conditions need valid
/// multi-punch references.
fn check_condition(
    config: &SurveyConfig,
    frame: &SurveyFrame,
    filter_name: &str,
    variable: &str,
    condition: &FilterCondition,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    let defined_single = config
        .variable(variable)
        .is_some_and(|def| def.kind == VarKind::Single);

    match condition {
        FilterCondition::Eq(_)
        | FilterCondition::In(_)
        | FilterCondition::Between(_, _)
        | FilterCondition::NotMissing(_) => {
            if !frame.has_column(variable) {
                issues.push(Issue::error(
                    "Filter Variable Missing",
                    Some(filter_name),
                    format!(
                        "Filter '{filter_name}': variable '{variable}' not found in data file"
                    ),
                ));
            }
        }
        FilterCondition::Any(columns) | FilterCondition::All(columns) => {
            let operator = if matches!(condition, FilterCondition::Any(_)) {
                "any"
            } else {
                "all"
            };
            if defined_single {
                issues.push(Issue::error(
                    "Filter Type Mismatch",
                    Some(filter_name),
                    format!(
                        "Filter '{filter_name}': '{operator}' cannot be used on single-punch variable '{variable}'"
                    ),
                ));
            }
            for column in columns {
                if !frame.has_column(column) {
                    issues.push(Issue::error(
                        "Filter Variable Missing",
                        Some(filter_name),
                        format!(
                            "Filter '{filter_name}': sub-variable '{column}' not found in data file"
                        ),
                    ));
                }
            }
        }
        FilterCondition::MinSelected(_) => {
            if defined_single {
                issues.push(Issue::error(
                    "Filter Type Mismatch",
                    Some(filter_name),
                    format!(
                        "Filter '{filter_name}': 'min_selected' cannot be used on single-punch variable '{variable}'"
                    ),
                ));
            } else {
                let defined_multi = config.variable(variable).is_some_and(|def| {
                    def.kind == VarKind::Multi && !def.sub_variables.is_empty()
                });
                if !defined_multi {
                    issues.push(Issue::error(
                        "Filter Type Mismatch",
                        Some(filter_name),
                        format!(
                            "Filter '{filter_name}': 'min_selected' on '{variable}' requires a multi-punch variable with sub_variables"
                        ),
                    ));
                }
            }
        }
    }

    issues
}

fn check_weighting(config: &SurveyConfig, frame: &SurveyFrame) -> Vec<Issue> {
    let mut issues = Vec::new();

    let Some(weighting) = config.weighting.as_ref() else {
        return issues;
    };
    if !weighting.enabled {
        return issues;
    }

    let Some(weight_var) = weighting
        .weight_variable
        .as_deref()
        .filter(|name| !name.is_empty())
    else {
        issues.push(Issue::error(
            "Weight Variable Missing",
            None,
            "Weighting is enabled but 'weight_variable' is not specified".to_string(),
        ));
        return issues;
    };

    if !frame.has_column(weight_var) {
        issues.push(Issue::error(
            "Weight Variable Missing",
            Some(weight_var),
            format!("Weight variable '{weight_var}' not found in data file"),
        ));
        return issues;
    }

    let Ok(values) = frame.numeric(weight_var) else {
        return issues;
    };
    let total = values.len();
    let nulls = values.null_count();

    if nulls == total {
        issues.push(Issue::error(
            "Invalid Weights",
            Some(weight_var),
            format!("Weight variable '{weight_var}' contains only missing values"),
        ));
        return issues;
    }

    let mut min_present = f64::INFINITY;
    for idx in 0..total {
        if let Some(value) = values.get(idx)
            && value < min_present
        {
            min_present = value;
        }
    }

    if nulls == 0 && min_present <= 0.0 {
        let mut all_nonpositive = true;
        for idx in 0..total {
            if values.get(idx).is_some_and(|value| value > 0.0) {
                all_nonpositive = false;
                break;
            }
        }
        if all_nonpositive {
            issues.push(Issue::error(
                "Invalid Weights",
                Some(weight_var),
                format!("Weight variable '{weight_var}' contains only zero or negative values"),
            ));
            return issues;
        }
    }

    if min_present <= 0.0 {
        issues.push(Issue::warning(
            "Invalid Weights",
            Some(weight_var),
            format!(
                "Weight variable '{weight_var}' contains zero or negative values (may cause calculation issues)"
            ),
        ));
    }

    issues
}

fn check_practices(config: &SurveyConfig) -> Vec<Issue> {
    let mut issues = Vec::new();

    if config.variables.is_empty() {
        return issues;
    }

    let unlabeled: Vec<&str> = config
        .variables
        .iter()
        .filter(|def| def.label.as_deref().is_none_or(str::is_empty))
        .map(|def| def.name.as_str())
        .collect();
    if !unlabeled.is_empty() {
        let shown = unlabeled
            .iter()
            .take(5)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let suffix = if unlabeled.len() > 5 { "..." } else { "" };
        issues.push(Issue::warning(
            "Unlabeled Variables",
            None,
            format!(
                "{} variable(s) missing 'label' field: {shown}{suffix}",
                unlabeled.len()
            ),
        ));
    }

    let mut duplicates: Vec<&str> = Vec::new();
    for (idx, def) in config.variables.iter().enumerate() {
        let repeated = config.variables[..idx]
            .iter()
            .any(|earlier| earlier.name == def.name);
        if repeated && !duplicates.contains(&def.name.as_str()) {
            duplicates.push(&def.name);
        }
    }
    if !duplicates.is_empty() {
        issues.push(Issue::warning(
            "Duplicate Variable Names",
            None,
            format!("Duplicate variable names found: {}", duplicates.join(", ")),
        ));
    }

    issues
}

/// True when the column holds no non-null values.
fn column_is_empty(frame: &SurveyFrame, name: &str) -> bool {
    match frame.numeric(name) {
        Ok(values) => values.null_count() == values.len(),
        Err(_) => true,
    }
}
