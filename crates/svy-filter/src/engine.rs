//! AND-composition of filter sets over a survey frame.

use indexmap::IndexMap;
use polars::prelude::{BooleanChunked, NewChunkedArray};
use svy_ingest::SurveyFrame;
use svy_model::{FilterCondition, FilterSet, VarKind, VariableDef};
use tracing::debug;

use crate::error::Result;
use crate::mask::condition_mask;

/// Row counts before and after a filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub original_count: usize,
    pub kept_count: usize,
    pub excluded_count: usize,
}

impl FilterStats {
    /// Stats for a pass that kept every row.
    pub fn identity(rows: usize) -> Self {
        Self {
            original_count: rows,
            kept_count: rows,
            excluded_count: 0,
        }
    }

    /// Share of rows excluded, in percent.
    pub fn exclusion_rate(&self) -> f64 {
        if self.original_count == 0 {
            0.0
        } else {
            self.excluded_count as f64 / self.original_count as f64 * 100.0
        }
    }

    /// Share of rows kept, in percent.
    pub fn retention_rate(&self) -> f64 {
        100.0 - self.exclusion_rate()
    }
}

/// Outcome of applying one filter set: the kept rows plus display metadata.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub frame: SurveyFrame,
    /// Per-variable condition descriptions in declaration order.
    pub descriptions: IndexMap<String, String>,
    pub stats: FilterStats,
}

/// Applies named filter sets to one frame.
///
/// The engine keeps a map of multi-variable definitions so min_selected
/// conditions can resolve their indicator columns.
pub struct FilterEngine<'a> {
    frame: &'a SurveyFrame,
    multi_vars: IndexMap<String, Vec<String>>,
}

impl<'a> FilterEngine<'a> {
    pub fn new(frame: &'a SurveyFrame, variables: &[VariableDef]) -> Self {
        let mut multi_vars = IndexMap::new();
        for def in variables {
            if def.kind == VarKind::Multi && !def.sub_variables.is_empty() {
                multi_vars.insert(def.name.clone(), def.sub_variables.clone());
            }
        }
        Self { frame, multi_vars }
    }

    /// Applies every condition of the set, AND-combined.
    ///
    /// An empty set keeps all rows and produces identity stats.
    pub fn apply(&self, name: &str, set: &FilterSet) -> Result<FilterOutcome> {
        let original = self.frame.height();
        if set.is_empty() {
            return Ok(FilterOutcome {
                frame: self.frame.clone(),
                descriptions: IndexMap::new(),
                stats: FilterStats::identity(original),
            });
        }

        let mut keep = vec![true; original];
        let mut descriptions = IndexMap::new();
        for (variable, condition) in set.iter() {
            let mask = condition_mask(self.frame, variable, condition, &self.multi_vars)?;
            for (slot, matched) in keep.iter_mut().zip(mask) {
                *slot = *slot && matched;
            }
            descriptions.insert(variable.clone(), condition.describe());
        }

        let kept_count = keep.iter().filter(|&&kept| kept).count();
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        let frame = self.frame.filter(&mask)?;
        let stats = FilterStats {
            original_count: original,
            kept_count,
            excluded_count: original - kept_count,
        };
        debug!(
            filter = name,
            original = stats.original_count,
            kept = stats.kept_count,
            "filter applied"
        );
        Ok(FilterOutcome {
            frame,
            descriptions,
            stats,
        })
    }

    /// Evaluates a single condition without filtering.
    pub fn condition_mask(
        &self,
        variable: &str,
        condition: &FilterCondition,
    ) -> Result<Vec<bool>> {
        condition_mask(self.frame, variable, condition, &self.multi_vars)
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::df;

    use super::*;

    fn survey_frame() -> SurveyFrame {
        let df = df!(
            "AGE" => [Some(25.0), Some(40.0), None, Some(30.0), Some(18.0)],
            "REGION" => [Some(1.0), Some(2.0), Some(1.0), None, Some(3.0)],
            "Q3_1" => [Some(1.0), Some(0.0), Some(1.0), Some(1.0), Some(0.0)],
            "Q3_2" => [Some(0.0), Some(1.0), Some(1.0), Some(0.0), Some(0.0)],
        )
        .unwrap();
        SurveyFrame::new(df)
    }

    fn engine_vars() -> Vec<VariableDef> {
        vec![
            VariableDef::single("AGE"),
            VariableDef::multi("Q3", ["Q3_1", "Q3_2"]),
        ]
    }

    #[test]
    fn conditions_combine_with_and() {
        let frame = survey_frame();
        let engine = FilterEngine::new(&frame, &engine_vars());
        let set: FilterSet = [
            ("REGION", FilterCondition::Eq(1.0)),
            ("AGE", FilterCondition::Between(18.0, 30.0)),
        ]
        .into_iter()
        .collect();

        let outcome = engine.apply("young_north", &set).unwrap();
        // Row 0 is the only one with REGION == 1 and AGE in range.
        assert_eq!(outcome.frame.height(), 1);
        assert_eq!(outcome.frame.numeric("AGE").unwrap().get(0), Some(25.0));
        assert_eq!(outcome.stats.kept_count, 1);
        assert_eq!(outcome.stats.excluded_count, 4);
        assert_eq!(outcome.stats.exclusion_rate(), 80.0);
    }

    #[test]
    fn empty_set_keeps_every_row() {
        let frame = survey_frame();
        let engine = FilterEngine::new(&frame, &engine_vars());
        let outcome = engine.apply("noop", &FilterSet::new()).unwrap();
        assert_eq!(outcome.frame.height(), 5);
        assert_eq!(outcome.stats, FilterStats::identity(5));
        assert!(outcome.descriptions.is_empty());
        assert_eq!(outcome.stats.exclusion_rate(), 0.0);
    }

    #[test]
    fn stats_track_exclusions() {
        let frame = survey_frame();
        let engine = FilterEngine::new(&frame, &engine_vars());
        let set: FilterSet = [("REGION", FilterCondition::Eq(1.0))].into_iter().collect();

        let outcome = engine.apply("north", &set).unwrap();
        assert_eq!(outcome.stats.original_count, 5);
        assert_eq!(outcome.stats.kept_count, 2);
        assert_eq!(outcome.stats.excluded_count, 3);
        assert_eq!(outcome.stats.exclusion_rate(), 60.0);
        assert_eq!(outcome.stats.retention_rate(), 40.0);
    }

    #[test]
    fn descriptions_follow_declaration_order() {
        let frame = survey_frame();
        let engine = FilterEngine::new(&frame, &engine_vars());
        let set: FilterSet = [
            ("AGE", FilterCondition::NotMissing(true)),
            ("REGION", FilterCondition::In(vec![1.0, 2.0])),
        ]
        .into_iter()
        .collect();

        let outcome = engine.apply("described", &set).unwrap();
        let described: Vec<(&str, &str)> = outcome
            .descriptions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            described,
            vec![("AGE", "Not Missing"), ("REGION", "IN [1, 2]")]
        );
    }

    #[test]
    fn min_selected_resolves_through_definitions() {
        let frame = survey_frame();
        let engine = FilterEngine::new(&frame, &engine_vars());
        let set: FilterSet = [("Q3", FilterCondition::MinSelected(2))].into_iter().collect();

        let outcome = engine.apply("both_options", &set).unwrap();
        // Only row 2 selected both Q3_1 and Q3_2.
        assert_eq!(outcome.frame.height(), 1);
        assert_eq!(
            outcome.descriptions.get("Q3").map(String::as_str),
            Some("Selected at least 2 option(s)")
        );
    }

    #[test]
    fn errors_surface_from_any_condition() {
        let frame = survey_frame();
        let engine = FilterEngine::new(&frame, &engine_vars());
        let set: FilterSet = [
            ("REGION", FilterCondition::Eq(1.0)),
            ("GONE", FilterCondition::Eq(2.0)),
        ]
        .into_iter()
        .collect();

        let err = engine.apply("broken", &set).unwrap_err();
        assert_eq!(err.to_string(), "variable 'GONE' not found in data file");
    }
}
