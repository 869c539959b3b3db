//! Single-response tabulation.
//!
//! Rows come out in questionnaire order: every labelled code first (zero
//! counts included so report shells stay stable across waves), then any
//! unlabelled codes observed in the data in ascending order, then one
//! Missing row when the scope has missing values.

use svy_ingest::SurveyFrame;
use svy_model::{VariableDef, format_code};
use svy_weight::WeightProfile;

use crate::error::Result;
use crate::result::{FrequencyRow, ResultTotals, percentage};

pub(crate) const MISSING_LABEL: &str = "Missing";

/// Effective value labels for a variable.
///
/// Plan labels win over the sidecar's and also fix the display order; an
/// empty map falls through rather than blanking the sidecar.
pub fn effective_value_labels(def: &VariableDef, frame: &SurveyFrame) -> Vec<(f64, String)> {
    if let Some(labels) = &def.value_labels
        && !labels.is_empty()
    {
        return labels.coded();
    }
    frame
        .meta()
        .value_labels_for(&def.name)
        .filter(|labels| !labels.is_empty())
        .unwrap_or_default()
}

/// Labelled codes in label order, then unlabelled observed codes ascending.
fn display_order(labels: &[(f64, String)], observed: &[f64]) -> Vec<(f64, String)> {
    let mut ordered = labels.to_vec();
    let mut extras: Vec<f64> = observed
        .iter()
        .copied()
        .filter(|value| !labels.iter().any(|(code, _)| code == value))
        .collect();
    extras.sort_by(f64::total_cmp);
    for value in extras {
        ordered.push((value, format_code(value)));
    }
    ordered
}

/// Tabulates one column without weights. Percentages run on all rows in
/// scope, so the table sums to 100 including the Missing row.
pub fn single_unweighted(
    frame: &SurveyFrame,
    name: &str,
    labels: &[(f64, String)],
) -> Result<(Vec<FrequencyRow>, ResultTotals)> {
    let values = frame.numeric(name)?;
    let total = values.len();

    let mut counts: Vec<(f64, usize)> = Vec::new();
    let mut missing = 0usize;
    for idx in 0..total {
        match values.get(idx) {
            None => missing += 1,
            Some(value) => match counts.iter_mut().find(|(seen, _)| *seen == value) {
                Some((_, count)) => *count += 1,
                None => counts.push((value, 1)),
            },
        }
    }

    let observed: Vec<f64> = counts.iter().map(|(value, _)| *value).collect();
    let mut rows = Vec::new();
    let mut valid = 0usize;
    for (value, label) in display_order(labels, &observed) {
        let count = counts
            .iter()
            .find(|(seen, _)| *seen == value)
            .map_or(0, |(_, count)| *count);
        valid += count;
        rows.push(FrequencyRow {
            value: Some(value),
            label,
            count,
            weighted_count: None,
            percentage: percentage(count as f64, total as f64),
            is_missing: false,
        });
    }
    if missing > 0 {
        rows.push(FrequencyRow {
            value: None,
            label: MISSING_LABEL.to_string(),
            count: missing,
            weighted_count: None,
            percentage: percentage(missing as f64, total as f64),
            is_missing: true,
        });
    }

    Ok((rows, ResultTotals::Single { total, valid }))
}

/// Tabulates one column over a weight profile's valid-weight subset.
///
/// Counts stay unweighted alongside the weight sums so reports can show
/// both; percentages run on the weighted total.
pub fn single_weighted(
    profile: &WeightProfile,
    name: &str,
    labels: &[(f64, String)],
) -> Result<(Vec<FrequencyRow>, ResultTotals)> {
    let (frame, weights) = profile.valid_rows_and_weights();
    let values = frame.numeric(name)?;
    let total_unweighted = values.len();
    let total_weighted: f64 = weights.iter().sum();

    let mut tallies: Vec<(f64, usize, f64)> = Vec::new();
    let mut missing_count = 0usize;
    let mut missing_weight = 0.0f64;
    for (idx, &weight) in weights.iter().enumerate() {
        match values.get(idx) {
            None => {
                missing_count += 1;
                missing_weight += weight;
            }
            Some(value) => match tallies.iter_mut().find(|(seen, _, _)| *seen == value) {
                Some((_, count, sum)) => {
                    *count += 1;
                    *sum += weight;
                }
                None => tallies.push((value, 1, weight)),
            },
        }
    }

    let observed: Vec<f64> = tallies.iter().map(|(value, _, _)| *value).collect();
    let mut rows = Vec::new();
    let mut valid_unweighted = 0usize;
    let mut valid_weighted = 0.0f64;
    for (value, label) in display_order(labels, &observed) {
        let (count, weight_sum) = tallies
            .iter()
            .find(|(seen, _, _)| *seen == value)
            .map_or((0, 0.0), |(_, count, sum)| (*count, *sum));
        valid_unweighted += count;
        valid_weighted += weight_sum;
        rows.push(FrequencyRow {
            value: Some(value),
            label,
            count,
            weighted_count: Some(weight_sum),
            percentage: percentage(weight_sum, total_weighted),
            is_missing: false,
        });
    }
    if missing_count > 0 {
        rows.push(FrequencyRow {
            value: None,
            label: MISSING_LABEL.to_string(),
            count: missing_count,
            weighted_count: Some(missing_weight),
            percentage: percentage(missing_weight, total_weighted),
            is_missing: true,
        });
    }

    Ok((
        rows,
        ResultTotals::SingleWeighted {
            total_unweighted,
            total_weighted,
            valid_unweighted,
            valid_weighted,
        },
    ))
}
