//! Multi-response tabulation over 0/1 indicator columns.
//!
//! The base is the set of respondents who selected at least one option, and
//! percentages run on that base, so a table of overlapping selections sums
//! past 100 on purpose. Options stay in questionnaire order.

use svy_ingest::SurveyFrame;
use svy_model::VariableDef;
use svy_weight::WeightProfile;

use crate::error::Result;
use crate::result::{FrequencyRow, ResultTotals, percentage};

/// Splits a definition's indicator columns into resolved `(name, label)`
/// options and the names the scope is missing.
///
/// Label precedence: plan override, then sidecar variable label, then the
/// column name itself.
pub fn resolve_options(
    def: &VariableDef,
    frame: &SurveyFrame,
) -> (Vec<(String, String)>, Vec<String>) {
    let mut options = Vec::with_capacity(def.sub_variables.len());
    let mut missing = Vec::new();
    for sub in &def.sub_variables {
        if !frame.has_column(sub) {
            missing.push(sub.clone());
            continue;
        }
        let label = def
            .sub_variable_labels
            .get(sub)
            .map(String::as_str)
            .or_else(|| frame.variable_label(sub))
            .unwrap_or(sub)
            .to_string();
        options.push((sub.clone(), label));
    }
    (options, missing)
}

/// Tabulates the option columns without weights.
///
/// Returns `None` when nobody selected any option; callers skip the variable.
pub fn multi_unweighted(
    frame: &SurveyFrame,
    options: &[(String, String)],
) -> Result<Option<(Vec<FrequencyRow>, ResultTotals)>> {
    let mut columns = Vec::with_capacity(options.len());
    for (name, _) in options {
        columns.push(frame.numeric(name)?);
    }

    let total = frame.height();
    let mut base = 0usize;
    for idx in 0..total {
        if columns.iter().any(|values| values.get(idx) == Some(1.0)) {
            base += 1;
        }
    }
    if base == 0 {
        return Ok(None);
    }

    let mut rows = Vec::with_capacity(options.len());
    for ((_, label), values) in options.iter().zip(&columns) {
        let count = (0..total)
            .filter(|&idx| values.get(idx) == Some(1.0))
            .count();
        rows.push(FrequencyRow {
            value: None,
            label: label.clone(),
            count,
            weighted_count: None,
            percentage: percentage(count as f64, base as f64),
            is_missing: false,
        });
    }

    Ok(Some((
        rows,
        ResultTotals::Multi {
            total_respondents: total,
            base,
        },
    )))
}

/// Tabulates the option columns over a weight profile's valid-weight subset.
///
/// Returns `None` when nobody in the subset selected any option.
pub fn multi_weighted(
    profile: &WeightProfile,
    options: &[(String, String)],
) -> Result<Option<(Vec<FrequencyRow>, ResultTotals)>> {
    let (frame, weights) = profile.valid_rows_and_weights();
    let mut columns = Vec::with_capacity(options.len());
    for (name, _) in options {
        columns.push(frame.numeric(name)?);
    }

    let total_unweighted = frame.height();
    let total_weighted: f64 = weights.iter().sum();
    let mut base_unweighted = 0usize;
    let mut base_weighted = 0.0f64;
    for (idx, &weight) in weights.iter().enumerate() {
        if columns.iter().any(|values| values.get(idx) == Some(1.0)) {
            base_unweighted += 1;
            base_weighted += weight;
        }
    }
    if base_unweighted == 0 {
        return Ok(None);
    }

    let mut rows = Vec::with_capacity(options.len());
    for ((_, label), values) in options.iter().zip(&columns) {
        let mut count = 0usize;
        let mut weight_sum = 0.0f64;
        for (idx, &weight) in weights.iter().enumerate() {
            if values.get(idx) == Some(1.0) {
                count += 1;
                weight_sum += weight;
            }
        }
        rows.push(FrequencyRow {
            value: None,
            label: label.clone(),
            count,
            weighted_count: Some(weight_sum),
            percentage: percentage(weight_sum, base_weighted),
            is_missing: false,
        });
    }

    Ok(Some((
        rows,
        ResultTotals::MultiWeighted {
            total_unweighted,
            total_weighted,
            base_unweighted,
            base_weighted,
        },
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use polars::prelude::*;
    use svy_ingest::{DatasetMeta, SurveyFrame};
    use svy_model::VariableDef;
    use svy_weight::WeightProfile;

    use super::*;

    fn options(names: &[&str]) -> Vec<(String, String)> {
        names
            .iter()
            .map(|name| ((*name).to_string(), (*name).to_string()))
            .collect()
    }

    #[test]
    fn base_counts_respondents_with_any_selection() {
        let data = df!(
            "Q3_1" => [Some(1.0), Some(0.0), None, Some(1.0)],
            "Q3_2" => [Some(1.0), Some(0.0), Some(0.0), Some(0.0)],
        )
        .unwrap();
        let frame = SurveyFrame::new(data);

        let (rows, totals) = multi_unweighted(&frame, &options(&["Q3_1", "Q3_2"]))
            .unwrap()
            .unwrap();

        assert_eq!(
            totals,
            ResultTotals::Multi {
                total_respondents: 4,
                base: 2,
            }
        );
        assert_eq!(rows[0].count, 2);
        assert!((rows[0].percentage - 100.0).abs() < 1e-9);
        assert_eq!(rows[1].count, 1);
        assert!((rows[1].percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_base_returns_none() {
        let data = df!(
            "Q3_1" => [Some(0.0), None],
            "Q3_2" => [Some(0.0), Some(0.0)],
        )
        .unwrap();
        let frame = SurveyFrame::new(data);

        let outcome = multi_unweighted(&frame, &options(&["Q3_1", "Q3_2"])).unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn weighted_base_and_counts_sum_weights() {
        let data = df!(
            "Q3_1" => [Some(1.0), Some(1.0), Some(0.0)],
            "Q3_2" => [Some(0.0), Some(1.0), Some(0.0)],
            "wt" => [Some(2.0), Some(0.5), Some(1.0)],
        )
        .unwrap();
        let profile = WeightProfile::new(&SurveyFrame::new(data), "wt").unwrap();

        let (rows, totals) = multi_weighted(&profile, &options(&["Q3_1", "Q3_2"]))
            .unwrap()
            .unwrap();

        match totals {
            ResultTotals::MultiWeighted {
                total_unweighted,
                total_weighted,
                base_unweighted,
                base_weighted,
            } => {
                assert_eq!(total_unweighted, 3);
                assert!((total_weighted - 3.5).abs() < 1e-9);
                assert_eq!(base_unweighted, 2);
                assert!((base_weighted - 2.5).abs() < 1e-9);
            }
            other => panic!("expected weighted totals, got {other:?}"),
        }
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].weighted_count, Some(2.5));
        assert!((rows[0].percentage - 100.0).abs() < 1e-9);
        assert_eq!(rows[1].weighted_count, Some(0.5));
        assert!((rows[1].percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_zero_base_returns_none() {
        let data = df!(
            "Q3_1" => [Some(1.0), Some(0.0)],
            "wt" => [None, Some(1.0)],
        )
        .unwrap();
        let profile = WeightProfile::new(&SurveyFrame::new(data), "wt").unwrap();

        let outcome = multi_weighted(&profile, &options(&["Q3_1"])).unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn resolve_options_prefers_plan_labels_then_sidecar() {
        let meta = DatasetMeta {
            variable_labels: indexmap::indexmap! {
                "Q3_1".to_string() => "News".to_string(),
                "Q3_2".to_string() => "Sports".to_string(),
            },
            value_labels: indexmap::IndexMap::new(),
        };
        let data = df!(
            "Q3_1" => [Some(1.0)],
            "Q3_2" => [Some(0.0)],
        )
        .unwrap();
        let frame = SurveyFrame::with_meta(data, Arc::new(meta));
        let def = VariableDef::multi("Q3", ["Q3_1", "Q3_2", "Q3_9"])
            .with_sub_variable_label("Q3_1", "Breaking news");

        let (options, missing) = resolve_options(&def, &frame);

        assert_eq!(
            options,
            vec![
                ("Q3_1".to_string(), "Breaking news".to_string()),
                ("Q3_2".to_string(), "Sports".to_string()),
            ]
        );
        assert_eq!(missing, vec!["Q3_9".to_string()]);
    }
}
