//! Weight screening and design diagnostics.

use polars::prelude::{BooleanChunked, NewChunkedArray};
use svy_ingest::{FrameError, SurveyFrame};
use tracing::debug;

use crate::error::{Result, WeightError};

/// Ratio of max to min weight above which variation is flagged.
const EXTREME_RATIO: f64 = 10.0;
/// Tolerated deviation of the mean weight from 1.0.
const MEAN_TOLERANCE: f64 = 0.1;

/// Diagnostics computed over the valid-weight subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSummary {
    pub total_rows: usize,
    pub valid_count: usize,
    pub excluded_count: usize,
    pub missing_count: usize,
    pub nonpositive_count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Effective sample size, (Σw)² / Σw².
    pub ess: f64,
    /// Design effect, n_valid / ESS.
    pub deff: f64,
}

/// The rows with usable weights plus those weights, aligned by position.
///
/// A weight is usable when it is present, finite, and strictly positive.
/// Rows failing that screen are excluded from every weighted statistic.
#[derive(Debug, Clone)]
pub struct WeightProfile {
    weight_variable: String,
    summary: WeightSummary,
    warnings: Vec<String>,
    valid_frame: SurveyFrame,
    valid_weights: Vec<f64>,
}

impl WeightProfile {
    /// Screens the weight column and computes diagnostics.
    ///
    /// Fails when the column is absent or no row carries a usable weight.
    pub fn new(frame: &SurveyFrame, weight_variable: &str) -> Result<Self> {
        let weights = frame.numeric(weight_variable).map_err(|err| match err {
            FrameError::ColumnNotFound { column } => WeightError::ColumnNotFound { column },
            other => WeightError::Frame(other),
        })?;

        let total_rows = frame.height();
        let mut keep = vec![false; total_rows];
        let mut valid_weights = Vec::new();
        let mut missing_count = 0usize;
        let mut nonpositive_count = 0usize;
        for idx in 0..total_rows {
            match weights.get(idx) {
                None => missing_count += 1,
                Some(weight) => {
                    if weight <= 0.0 {
                        nonpositive_count += 1;
                    } else if weight.is_finite() {
                        keep[idx] = true;
                        valid_weights.push(weight);
                    }
                }
            }
        }

        let valid_count = valid_weights.len();
        if valid_count == 0 {
            return Err(WeightError::NoValidWeights {
                column: weight_variable.to_string(),
                total: total_rows,
            });
        }

        let sum: f64 = valid_weights.iter().sum();
        let sum_sq: f64 = valid_weights.iter().map(|w| w * w).sum();
        let min = valid_weights.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid_weights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let mean = sum / valid_count as f64;
        let ess = sum * sum / sum_sq;
        let deff = valid_count as f64 / ess;

        let mut warnings = Vec::new();
        if missing_count > 0 {
            warnings.push(format!(
                "{missing_count} respondent(s) have missing weights and will be excluded"
            ));
        }
        if nonpositive_count > 0 {
            warnings.push(format!(
                "{nonpositive_count} respondent(s) have invalid weights (<=0) and will be excluded"
            ));
        }
        let ratio = max / min;
        if ratio > EXTREME_RATIO {
            warnings.push(format!(
                "Extreme weight variation detected: min={min:.2}, max={max:.2}, ratio={ratio:.1}"
            ));
        }
        if (mean - 1.0).abs() > MEAN_TOLERANCE {
            warnings.push(format!("Average weight is {mean:.2} (expected ~1.0)"));
        }

        let mask = BooleanChunked::from_slice("valid_weights".into(), &keep);
        let valid_frame = frame.filter(&mask)?;

        let summary = WeightSummary {
            total_rows,
            valid_count,
            excluded_count: total_rows - valid_count,
            missing_count,
            nonpositive_count,
            sum,
            min,
            max,
            mean,
            ess,
            deff,
        };
        debug!(
            weight_variable,
            valid = valid_count,
            excluded = summary.excluded_count,
            ess = summary.ess,
            deff = summary.deff,
            "weight profile computed"
        );
        Ok(Self {
            weight_variable: weight_variable.to_string(),
            summary,
            warnings,
            valid_frame,
            valid_weights,
        })
    }

    pub fn weight_variable(&self) -> &str {
        &self.weight_variable
    }

    pub fn summary(&self) -> &WeightSummary {
        &self.summary
    }

    /// Data-quality warnings in detection order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The screened rows and their weights, aligned by position.
    pub fn valid_rows_and_weights(&self) -> (&SurveyFrame, &[f64]) {
        (&self.valid_frame, &self.valid_weights)
    }
}
