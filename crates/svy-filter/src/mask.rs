//! Row-predicate evaluation: one condition to one boolean per row.

use indexmap::IndexMap;
use svy_ingest::SurveyFrame;
use svy_model::FilterCondition;

use crate::error::{FilterError, Result};

/// Evaluates one condition against the frame.
///
/// Missing values never satisfy a value predicate, so eq/in/between keep
/// only rows that are present and match. Indicator conditions count a
/// selection only where the column holds exactly 1.
pub fn condition_mask(
    frame: &SurveyFrame,
    variable: &str,
    condition: &FilterCondition,
    multi_vars: &IndexMap<String, Vec<String>>,
) -> Result<Vec<bool>> {
    match condition {
        FilterCondition::Eq(value) => value_mask(frame, variable, |v| v == *value),
        FilterCondition::In(values) => value_mask(frame, variable, |v| values.contains(&v)),
        FilterCondition::Between(low, high) => {
            value_mask(frame, variable, |v| *low <= v && v <= *high)
        }
        FilterCondition::NotMissing(true) => value_mask(frame, variable, |_| true),
        FilterCondition::NotMissing(false) => Err(FilterError::MalformedCondition {
            variable: variable.to_string(),
            reason: "'not_missing' only supports the value true".to_string(),
        }),
        FilterCondition::Any(columns) => selection_mask(frame, columns, |selected| selected > 0),
        FilterCondition::All(columns) => {
            let required = columns.len();
            selection_mask(frame, columns, move |selected| selected == required)
        }
        FilterCondition::MinSelected(min) => {
            let columns =
                multi_vars
                    .get(variable)
                    .ok_or_else(|| FilterError::UndefinedMultiVariable {
                        variable: variable.to_string(),
                    })?;
            let min = *min as usize;
            selection_mask(frame, columns, move |selected| selected >= min)
        }
    }
}

fn value_mask(
    frame: &SurveyFrame,
    variable: &str,
    predicate: impl Fn(f64) -> bool,
) -> Result<Vec<bool>> {
    let values = frame.numeric(variable)?;
    let mut keep = Vec::with_capacity(values.len());
    for idx in 0..values.len() {
        keep.push(values.get(idx).is_some_and(&predicate));
    }
    Ok(keep)
}

fn selection_mask(
    frame: &SurveyFrame,
    columns: &[String],
    predicate: impl Fn(usize) -> bool,
) -> Result<Vec<bool>> {
    let mut indicators = Vec::with_capacity(columns.len());
    for column in columns {
        indicators.push(frame.numeric(column)?);
    }
    let mut keep = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        let selected = indicators
            .iter()
            .filter(|values| values.get(idx) == Some(1.0))
            .count();
        keep.push(predicate(selected));
    }
    Ok(keep)
}

#[cfg(test)]
mod tests {
    use polars::prelude::df;

    use super::*;

    fn survey_frame() -> SurveyFrame {
        let df = df!(
            "AGE" => [Some(25.0), Some(40.0), None, Some(30.0), Some(18.0)],
            "REGION" => [Some(1.0), Some(2.0), Some(1.0), None, Some(3.0)],
        )
        .unwrap();
        SurveyFrame::new(df)
    }

    fn no_multi() -> IndexMap<String, Vec<String>> {
        IndexMap::new()
    }

    #[test]
    fn value_masks_treat_missing_as_no_match() {
        let frame = survey_frame();

        let eq = condition_mask(&frame, "REGION", &FilterCondition::Eq(1.0), &no_multi()).unwrap();
        assert_eq!(eq, vec![true, false, true, false, false]);

        let one_of = condition_mask(
            &frame,
            "REGION",
            &FilterCondition::In(vec![1.0, 3.0]),
            &no_multi(),
        )
        .unwrap();
        assert_eq!(one_of, vec![true, false, true, false, true]);

        let range = condition_mask(
            &frame,
            "AGE",
            &FilterCondition::Between(18.0, 30.0),
            &no_multi(),
        )
        .unwrap();
        assert_eq!(range, vec![true, false, false, true, true]);

        let present = condition_mask(
            &frame,
            "AGE",
            &FilterCondition::NotMissing(true),
            &no_multi(),
        )
        .unwrap();
        assert_eq!(present, vec![true, true, false, true, true]);
    }

    #[test]
    fn indicator_masks_over_option_columns() {
        let df = df!(
            "Q3_1" => [Some(1.0), Some(0.0), Some(1.0), None],
            "Q3_2" => [Some(1.0), Some(1.0), Some(0.0), None],
        )
        .unwrap();
        let frame = SurveyFrame::new(df);
        let columns = vec!["Q3_1".to_string(), "Q3_2".to_string()];

        let any = condition_mask(
            &frame,
            "Q3",
            &FilterCondition::Any(columns.clone()),
            &no_multi(),
        )
        .unwrap();
        assert_eq!(any, vec![true, true, true, false]);

        let all =
            condition_mask(&frame, "Q3", &FilterCondition::All(columns), &no_multi()).unwrap();
        assert_eq!(all, vec![true, false, false, false]);

        let mut multi = IndexMap::new();
        multi.insert(
            "Q3".to_string(),
            vec!["Q3_1".to_string(), "Q3_2".to_string()],
        );
        let two = condition_mask(&frame, "Q3", &FilterCondition::MinSelected(2), &multi).unwrap();
        assert_eq!(two, vec![true, false, false, false]);

        let zero = condition_mask(&frame, "Q3", &FilterCondition::MinSelected(0), &multi).unwrap();
        assert_eq!(zero, vec![true, true, true, true]);

        let beyond = condition_mask(&frame, "Q3", &FilterCondition::MinSelected(3), &multi).unwrap();
        assert_eq!(beyond, vec![false, false, false, false]);
    }

    #[test]
    fn only_code_one_counts_as_selected() {
        let df = df!("Q3_1" => [Some(2.0), Some(1.0), Some(0.0)]).unwrap();
        let frame = SurveyFrame::new(df);
        let any = condition_mask(
            &frame,
            "Q3",
            &FilterCondition::Any(vec!["Q3_1".to_string()]),
            &no_multi(),
        )
        .unwrap();
        assert_eq!(any, vec![false, true, false]);
    }

    #[test]
    fn not_missing_false_is_malformed() {
        let frame = survey_frame();
        let err = condition_mask(
            &frame,
            "AGE",
            &FilterCondition::NotMissing(false),
            &no_multi(),
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::MalformedCondition { .. }));
    }

    #[test]
    fn min_selected_requires_a_multi_definition() {
        let frame = survey_frame();
        let err = condition_mask(
            &frame,
            "AGE",
            &FilterCondition::MinSelected(1),
            &no_multi(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot use 'min_selected' on 'AGE': variable is not defined as multi with sub_variables"
        );
    }

    #[test]
    fn unknown_columns_are_typed_errors() {
        let frame = survey_frame();

        let err =
            condition_mask(&frame, "MISSING", &FilterCondition::Eq(1.0), &no_multi()).unwrap_err();
        assert_eq!(err.to_string(), "variable 'MISSING' not found in data file");

        let err = condition_mask(
            &frame,
            "Q3",
            &FilterCondition::Any(vec!["Q3_9".to_string()]),
            &no_multi(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "variable 'Q3_9' not found in data file");
    }
}
