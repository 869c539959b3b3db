//! Property-based tests for frequency aggregation.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use svy_freq::{ResultTotals, multi_unweighted, single_unweighted, single_weighted};
use svy_ingest::SurveyFrame;
use svy_weight::WeightProfile;

fn single_frame(values: &[Option<f64>]) -> SurveyFrame {
    let series = Series::new("Q1".into(), values.to_vec());
    SurveyFrame::new(DataFrame::new(vec![series.into_column()]).unwrap())
}

fn unit_weighted_frame(values: &[Option<f64>]) -> SurveyFrame {
    let columns = vec![
        Series::new("Q1".into(), values.to_vec()).into_column(),
        Series::new("wt".into(), vec![Some(1.0f64); values.len()]).into_column(),
    ];
    SurveyFrame::new(DataFrame::new(columns).unwrap())
}

fn indicator_frame(rows: &[(Option<f64>, Option<f64>)]) -> SurveyFrame {
    let first: Vec<Option<f64>> = rows.iter().map(|(a, _)| *a).collect();
    let second: Vec<Option<f64>> = rows.iter().map(|(_, b)| *b).collect();
    let columns = vec![
        Series::new("Q3_1".into(), first).into_column(),
        Series::new("Q3_2".into(), second).into_column(),
    ];
    SurveyFrame::new(DataFrame::new(columns).unwrap())
}

fn code() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((0u32..6).prop_map(f64::from))
}

fn code_column() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(code(), 1..60)
}

fn indicator() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(prop_oneof![Just(0.0f64), Just(1.0f64)])
}

fn indicator_rows() -> impl Strategy<Value = Vec<(Option<f64>, Option<f64>)>> {
    prop::collection::vec((indicator(), indicator()), 1..40)
}

proptest! {
    #[test]
    fn single_percentages_sum_to_hundred(values in code_column()) {
        let frame = single_frame(&values);
        let (rows, totals) = single_unweighted(&frame, "Q1", &[]).unwrap();

        let sum: f64 = rows.iter().map(|row| row.percentage).sum();
        prop_assert!((sum - 100.0).abs() < 1e-6, "percentages sum to {sum}");

        let ResultTotals::Single { total, valid } = totals else {
            return Err(TestCaseError::fail("expected unweighted totals"));
        };
        let missing: usize = rows
            .iter()
            .filter(|row| row.is_missing)
            .map(|row| row.count)
            .sum();
        prop_assert_eq!(valid + missing, total);
        prop_assert_eq!(total, values.len());
    }

    #[test]
    fn unit_weights_reproduce_unweighted_counts(values in code_column()) {
        let frame = unit_weighted_frame(&values);
        let profile = WeightProfile::new(&frame, "wt").unwrap();

        let (weighted, _) = single_weighted(&profile, "Q1", &[]).unwrap();
        let (plain, _) = single_unweighted(&frame, "Q1", &[]).unwrap();

        prop_assert_eq!(weighted.len(), plain.len());
        for (lhs, rhs) in weighted.iter().zip(&plain) {
            prop_assert_eq!(lhs.value, rhs.value);
            prop_assert_eq!(lhs.count, rhs.count);
            prop_assert_eq!(lhs.weighted_count, Some(rhs.count as f64));
            prop_assert!((lhs.percentage - rhs.percentage).abs() < 1e-9);
        }
    }

    #[test]
    fn multi_percentages_run_on_the_base(rows in indicator_rows()) {
        let frame = indicator_frame(&rows);
        let options = vec![
            ("Q3_1".to_string(), "A".to_string()),
            ("Q3_2".to_string(), "B".to_string()),
        ];

        match multi_unweighted(&frame, &options).unwrap() {
            None => {
                let any_selected = rows
                    .iter()
                    .any(|(a, b)| *a == Some(1.0) || *b == Some(1.0));
                prop_assert!(!any_selected, "zero base despite selections");
            }
            Some((table, ResultTotals::Multi { total_respondents, base })) => {
                prop_assert!(base <= total_respondents);
                prop_assert_eq!(total_respondents, rows.len());
                for row in &table {
                    prop_assert!(row.count <= base);
                    let expected = row.count as f64 / base as f64 * 100.0;
                    prop_assert!((row.percentage - expected).abs() < 1e-9);
                }
            }
            Some((_, other)) => {
                return Err(TestCaseError::fail(format!("unexpected totals {other:?}")));
            }
        }
    }
}
