//! Fixed-width text report rendering.
//!
//! Rendering is pure: the timestamp and global-filter header come in via
//! [`ReportMeta`], so the same inputs always produce the same bytes and
//! reports stay snapshot-testable. File output lives in [`write_report`].

use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use anyhow::Context;
use svy_freq::{FrequencyRow, ResultTotals, VariableResult};
use svy_model::SurveyConfig;

/// Header metadata the report displays verbatim.
#[derive(Debug, Clone, Default)]
pub struct ReportMeta {
    /// Pre-formatted generation timestamp (`YYYY-MM-DD HH:MM:SS`).
    pub generated: String,
    pub global_filter: Option<String>,
    /// Global-filter conditions as `(variable, description)` pairs.
    pub global_conditions: Vec<(String, String)>,
    pub weight_variable: Option<String>,
}

impl ReportMeta {
    /// Pulls the display metadata out of a plan.
    ///
    /// The global-filter block only appears when the named set is actually
    /// defined; a dangling name renders no header block.
    pub fn from_config(config: &SurveyConfig, generated: impl Into<String>) -> Self {
        let mut global_filter = None;
        let mut global_conditions = Vec::new();
        if let Some(name) = config.global_filter.as_deref()
            && let Some(set) = config.filter_sets.get(name)
        {
            global_filter = Some(name.to_string());
            global_conditions = set
                .iter()
                .map(|(variable, condition)| (variable.clone(), condition.describe()))
                .collect();
        }
        Self {
            generated: generated.into(),
            global_filter,
            global_conditions,
            weight_variable: config.active_weight_variable().map(ToString::to_string),
        }
    }
}

/// Renders the whole report to a string, trailing newline included.
pub fn render_report(
    results: &[VariableResult],
    warnings: &[String],
    meta: &ReportMeta,
) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = render_into(&mut out, results, warnings, meta);
    out
}

/// Renders and writes the report to a file.
pub fn write_report(
    path: &Path,
    results: &[VariableResult],
    warnings: &[String],
    meta: &ReportMeta,
) -> anyhow::Result<()> {
    let report = render_report(results, warnings, meta);
    fs::write(path, report)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

fn render_into(
    out: &mut impl fmt::Write,
    results: &[VariableResult],
    warnings: &[String],
    meta: &ReportMeta,
) -> fmt::Result {
    writeln!(out, "{}", "=".repeat(70))?;
    writeln!(out, "FREQUENCY REPORT")?;
    writeln!(out, "Generated: {}", meta.generated)?;
    if let Some(name) = meta.global_filter.as_deref() {
        writeln!(out, "Global Filter: {name}")?;
        for (variable, description) in &meta.global_conditions {
            writeln!(out, "  - {variable}: {description}")?;
        }
    }
    writeln!(out, "{}", "=".repeat(70))?;
    writeln!(out)?;

    if !warnings.is_empty() {
        writeln!(out, "WARNINGS")?;
        writeln!(out, "{}", "-".repeat(70))?;
        for warning in warnings {
            writeln!(out, "⚠ {warning}")?;
        }
        writeln!(out)?;
    }

    for (idx, result) in results.iter().enumerate() {
        write_variable(out, idx + 1, result, meta)?;
        writeln!(out)?;
    }

    writeln!(out, "{}", "=".repeat(70))?;
    writeln!(out, "End of Report - {} variable(s) processed", results.len())?;
    writeln!(out, "{}", "=".repeat(70))?;
    Ok(())
}

fn write_variable(
    out: &mut impl fmt::Write,
    index: usize,
    result: &VariableResult,
    meta: &ReportMeta,
) -> fmt::Result {
    writeln!(out, "{index}. {}", result.label)?;
    writeln!(
        out,
        "   Variable: {} | Type: {}",
        result.name,
        result.kind.as_str().to_uppercase()
    )?;

    if result.weighted {
        let weight_var = meta.weight_variable.as_deref().unwrap_or("WEIGHT");
        writeln!(out, "   Weighting: ENABLED (Variable: {weight_var})")?;
    } else {
        writeln!(out, "   Weighting: DISABLED")?;
    }

    match &result.filter {
        Some(info) => {
            if info.is_global {
                writeln!(out, "   Filter: {} (Global)", info.name)?;
            } else {
                writeln!(out, "   Filter: {}", info.name)?;
            }
            if !info.descriptions.is_empty() {
                writeln!(out, "   Filter Details:")?;
                for (variable, description) in &info.descriptions {
                    writeln!(out, "     - {variable}: {description}")?;
                }
            }
            writeln!(
                out,
                "   Dataset: {} → {} ({:.1}%)",
                info.stats.original_count,
                info.stats.kept_count,
                info.stats.retention_rate()
            )?;
            if info.stats.kept_count < 30 {
                writeln!(
                    out,
                    "   ⚠ WARNING: Small sample size (n={}). Results may not be reliable.",
                    info.stats.kept_count
                )?;
            }
        }
        None => writeln!(out, "   Filter: NONE (All respondents)")?,
    }

    writeln!(out, "{}", "-".repeat(80))?;

    if let Some(summary) = &result.weight_summary {
        writeln!(out, "Weighting Statistics:")?;
        write!(
            out,
            "  Respondents with valid weights: {}",
            summary.valid_count
        )?;
        if summary.excluded_count > 0 {
            write!(
                out,
                " ({} excluded due to missing/invalid weights)",
                summary.excluded_count
            )?;
        }
        writeln!(out)?;
        writeln!(out, "  Sum of weights: {:.2}", summary.sum)?;
        writeln!(out, "  Effective sample size (ESS): {:.0}", summary.ess)?;
        writeln!(out, "  Design effect (DEFF): {:.2}", summary.deff)?;
        writeln!(out)?;
    }

    match result.totals {
        ResultTotals::Single { total, valid } => {
            write_single_unweighted(out, &result.rows, total, valid)
        }
        ResultTotals::SingleWeighted {
            total_unweighted,
            total_weighted,
            valid_unweighted,
            valid_weighted,
        } => write_single_weighted(
            out,
            &result.rows,
            total_unweighted,
            total_weighted,
            valid_unweighted,
            valid_weighted,
        ),
        ResultTotals::Multi {
            total_respondents,
            base,
        } => write_multi_unweighted(out, &result.rows, total_respondents, base),
        ResultTotals::MultiWeighted {
            total_unweighted,
            total_weighted,
            base_unweighted,
            base_weighted,
        } => write_multi_weighted(
            out,
            &result.rows,
            total_unweighted,
            total_weighted,
            base_unweighted,
            base_weighted,
        ),
    }
}

fn write_single_unweighted(
    out: &mut impl fmt::Write,
    rows: &[FrequencyRow],
    total: usize,
    valid: usize,
) -> fmt::Result {
    writeln!(out, "Total Responses: {total}")?;
    writeln!(out, "Valid Responses: {valid}")?;
    writeln!(out)?;

    writeln!(out, "{:<50} {:>10} {:>12}", "Value", "Count", "Percentage")?;
    writeln!(out, "{}", "-".repeat(80))?;
    for row in rows {
        let (first, rest) = split_label(&row.label, 48);
        writeln!(out, "{first:<50} {:>10} {:>11.1}%", row.count, row.percentage)?;
        for line in rest {
            writeln!(out, "  {line}")?;
        }
    }
    writeln!(out, "{}", "-".repeat(80))?;
    writeln!(out, "{:<50} {total:>10} {:>12}", "TOTAL", "100.0%")?;
    Ok(())
}

fn write_single_weighted(
    out: &mut impl fmt::Write,
    rows: &[FrequencyRow],
    total_unweighted: usize,
    total_weighted: f64,
    valid_unweighted: usize,
    valid_weighted: f64,
) -> fmt::Result {
    writeln!(
        out,
        "Total Responses: {total_unweighted} (Unweighted) | {total_weighted:.1} (Weighted)"
    )?;
    writeln!(
        out,
        "Valid Responses: {valid_unweighted} (Unweighted) | {valid_weighted:.1} (Weighted)"
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<30} {:>12} {:>12} {:>12}",
        "Value", "Unweighted", "Weighted", "Percentage"
    )?;
    writeln!(out, "{}", "-".repeat(80))?;
    for row in rows {
        let weighted = row.weighted_count.unwrap_or_default();
        let (first, rest) = split_label(&row.label, 28);
        writeln!(
            out,
            "{first:<30} {:>12} {weighted:>12.1} {:>11.1}%",
            row.count, row.percentage
        )?;
        for line in rest {
            writeln!(out, "  {line}")?;
        }
    }
    writeln!(out, "{}", "-".repeat(80))?;
    writeln!(
        out,
        "{:<30} {total_unweighted:>12} {total_weighted:>12.1} {:>12}",
        "TOTAL", "100.0%"
    )?;
    Ok(())
}

fn write_multi_unweighted(
    out: &mut impl fmt::Write,
    rows: &[FrequencyRow],
    total_respondents: usize,
    base: usize,
) -> fmt::Result {
    writeln!(out, "Total Respondents: {total_respondents}")?;
    writeln!(out, "Base (selected at least one): {base}")?;
    writeln!(out, "Percentages calculated on base of {base}")?;
    writeln!(out)?;

    writeln!(out, "{:<50} {:>10} {:>12}", "Option", "Count", "Percentage")?;
    writeln!(out, "{}", "-".repeat(80))?;
    for row in rows {
        let (first, rest) = split_label(&row.label, 48);
        writeln!(out, "{first:<50} {:>10} {:>11.1}%", row.count, row.percentage)?;
        for line in rest {
            writeln!(out, "  {line}")?;
        }
    }
    writeln!(out, "{}", "-".repeat(80))?;
    Ok(())
}

fn write_multi_weighted(
    out: &mut impl fmt::Write,
    rows: &[FrequencyRow],
    total_unweighted: usize,
    total_weighted: f64,
    base_unweighted: usize,
    base_weighted: f64,
) -> fmt::Result {
    writeln!(
        out,
        "Total Respondents: {total_unweighted} (Unweighted) | {total_weighted:.1} (Weighted)"
    )?;
    writeln!(
        out,
        "Base (selected at least one): {base_unweighted} (Unweighted) | {base_weighted:.1} (Weighted)"
    )?;
    writeln!(
        out,
        "Percentages calculated on base (weighted) of {base_weighted:.1}"
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<30} {:>12} {:>12} {:>12}",
        "Option", "Unweighted", "Weighted", "Percentage"
    )?;
    writeln!(out, "{}", "-".repeat(80))?;
    for row in rows {
        let weighted = row.weighted_count.unwrap_or_default();
        let (first, rest) = split_label(&row.label, 28);
        writeln!(
            out,
            "{first:<30} {:>12} {weighted:>12.1} {:>11.1}%",
            row.count, row.percentage
        )?;
        for line in rest {
            writeln!(out, "  {line}")?;
        }
    }
    writeln!(out, "{}", "-".repeat(80))?;
    writeln!(
        out,
        "Note: Percentages sum to >100% as respondents could select multiple options"
    )?;
    Ok(())
}

/// First line carries the numeric columns; continuations indent two spaces.
fn split_label(label: &str, width: usize) -> (String, Vec<String>) {
    if label.chars().count() <= width {
        return (label.to_string(), Vec::new());
    }
    let mut lines = wrap_label(label, width);
    let first = lines.remove(0);
    (first, lines)
}

/// Wraps at word boundaries; words longer than the width are hard-split.
fn wrap_label(label: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in label.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let mut chunk = String::new();
            let mut chunk_len = 0usize;
            for ch in word.chars() {
                if chunk_len == width {
                    lines.push(std::mem::take(&mut chunk));
                    chunk_len = 0;
                }
                chunk.push(ch);
                chunk_len += 1;
            }
            current = chunk;
            current_len = chunk_len;
            continue;
        }
        let fits = if current.is_empty() {
            word_len <= width
        } else {
            current_len + 1 + word_len <= width
        };
        if fits {
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
