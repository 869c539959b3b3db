//! Chart-ready JSON export of tabulated results.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use svy_freq::VariableResult;
use svy_model::VarKind;

/// One bar or slice: display label, count, and table percentage.
///
/// `value` is the weighted count when weighting was applied, the plain
/// count otherwise, so downstream charting never has to branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
}

/// Chart projection of one tabulated variable.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub variable: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: VarKind,
    pub weighted: bool,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    /// Projects a result to chart points in table order.
    ///
    /// Missing rows are dropped so that charts show the share of
    /// substantive answers only.
    pub fn from_result(result: &VariableResult) -> Self {
        let points = result
            .rows
            .iter()
            .filter(|row| !row.is_missing)
            .map(|row| ChartPoint {
                label: row.label.clone(),
                value: row.weighted_count.unwrap_or(row.count as f64),
                percentage: row.percentage,
            })
            .collect();
        Self {
            variable: result.name.clone(),
            label: result.label.clone(),
            kind: result.kind,
            weighted: result.weighted,
            points,
        }
    }
}

/// Writes every chart as one pretty-printed JSON array.
pub fn write_chart_data(path: &Path, charts: &[ChartData]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(charts).context("failed to serialize chart data")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write chart data to {}", path.display()))?;
    Ok(())
}
