//! Property-based tests for mask evaluation and filter composition.

use indexmap::IndexMap;
use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;
use svy_filter::{FilterEngine, condition_mask};
use svy_ingest::SurveyFrame;
use svy_model::{FilterCondition, FilterSet, VariableDef};

fn single_column_frame(values: Vec<Option<f64>>) -> SurveyFrame {
    let series = Series::new("V".into(), values);
    SurveyFrame::new(DataFrame::new(vec![series.into_column()]).unwrap())
}

fn paired_frame(rows: &[(Option<f64>, Option<f64>)], left: &str, right: &str) -> SurveyFrame {
    let first: Vec<Option<f64>> = rows.iter().map(|(a, _)| *a).collect();
    let second: Vec<Option<f64>> = rows.iter().map(|(_, b)| *b).collect();
    let columns = vec![
        Series::new(left.into(), first).into_column(),
        Series::new(right.into(), second).into_column(),
    ];
    SurveyFrame::new(DataFrame::new(columns).unwrap())
}

fn code() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((0u32..6).prop_map(f64::from))
}

fn indicator() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(prop_oneof![Just(0.0f64), Just(1.0f64)])
}

fn code_column() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(code(), 1..60)
}

fn indicator_rows() -> impl Strategy<Value = Vec<(Option<f64>, Option<f64>)>> {
    prop::collection::vec((indicator(), indicator()), 1..40)
}

fn paired_codes() -> impl Strategy<Value = Vec<(Option<f64>, Option<f64>)>> {
    prop::collection::vec((code(), code()), 1..40)
}

proptest! {
    #[test]
    fn stats_partition_the_rows(values in code_column(), target in 0u32..6) {
        let frame = single_column_frame(values);
        let engine = FilterEngine::new(&frame, &[]);
        let set: FilterSet = [("V", FilterCondition::Eq(f64::from(target)))]
            .into_iter()
            .collect();

        let outcome = engine.apply("prop", &set).unwrap();
        prop_assert_eq!(
            outcome.stats.kept_count + outcome.stats.excluded_count,
            outcome.stats.original_count
        );
        prop_assert_eq!(outcome.frame.height(), outcome.stats.kept_count);
        let rate = outcome.stats.exclusion_rate();
        prop_assert!((0.0..=100.0).contains(&rate));
    }

    #[test]
    fn empty_set_is_the_identity(values in code_column()) {
        let rows = values.len();
        let frame = single_column_frame(values);
        let engine = FilterEngine::new(&frame, &[]);

        let outcome = engine.apply("all", &FilterSet::new()).unwrap();
        prop_assert_eq!(outcome.frame.height(), rows);
        prop_assert_eq!(outcome.stats.excluded_count, 0);
        prop_assert_eq!(outcome.stats.exclusion_rate(), 0.0);
    }

    #[test]
    fn value_predicates_never_keep_missing_rows(values in code_column(), target in 0u32..6) {
        let frame = single_column_frame(values.clone());
        let condition = FilterCondition::Eq(f64::from(target));
        let mask = condition_mask(&frame, "V", &condition, &IndexMap::new()).unwrap();

        for (value, kept) in values.iter().zip(&mask) {
            if value.is_none() {
                prop_assert!(!*kept);
            }
        }
    }

    #[test]
    fn not_missing_keeps_exactly_the_present_rows(values in code_column()) {
        let frame = single_column_frame(values.clone());
        let condition = FilterCondition::NotMissing(true);
        let mask = condition_mask(&frame, "V", &condition, &IndexMap::new()).unwrap();

        for (value, kept) in values.iter().zip(&mask) {
            prop_assert_eq!(value.is_some(), *kept);
        }
    }

    #[test]
    fn min_selected_shrinks_as_the_threshold_rises(rows in indicator_rows()) {
        let frame = paired_frame(&rows, "Q_1", "Q_2");
        let defs = vec![VariableDef::multi("Q", ["Q_1", "Q_2"])];
        let engine = FilterEngine::new(&frame, &defs);

        let mut previous = rows.len();
        for min in 0..=3u32 {
            let set: FilterSet = [("Q", FilterCondition::MinSelected(min))]
                .into_iter()
                .collect();
            let outcome = engine.apply("min", &set).unwrap();
            prop_assert!(outcome.stats.kept_count <= previous);
            if min == 0 {
                prop_assert_eq!(outcome.stats.kept_count, rows.len());
            }
            previous = outcome.stats.kept_count;
        }
    }

    #[test]
    fn and_composition_is_an_intersection(
        rows in paired_codes(),
        left in 0u32..6,
        right in 0u32..6,
    ) {
        let frame = paired_frame(&rows, "A", "B");
        let engine = FilterEngine::new(&frame, &[]);
        let set: FilterSet = [
            ("A", FilterCondition::Eq(f64::from(left))),
            ("B", FilterCondition::Eq(f64::from(right))),
        ]
        .into_iter()
        .collect();
        let outcome = engine.apply("both", &set).unwrap();

        let empty = IndexMap::new();
        let mask_a =
            condition_mask(&frame, "A", &FilterCondition::Eq(f64::from(left)), &empty).unwrap();
        let mask_b =
            condition_mask(&frame, "B", &FilterCondition::Eq(f64::from(right)), &empty).unwrap();
        let expected = mask_a
            .iter()
            .zip(&mask_b)
            .filter(|(a, b)| **a && **b)
            .count();
        prop_assert_eq!(outcome.stats.kept_count, expected);
    }
}
