//! Batch tabulation of a whole plan.
//!
//! One bad variable never aborts the run: skips and degradations become
//! warnings in plan order and the batch moves on to the next variable.

use std::collections::HashMap;

use svy_filter::{FilterEngine, FilterOutcome};
use svy_ingest::SurveyFrame;
use svy_model::{SurveyConfig, VarKind, VariableDef};
use svy_weight::WeightProfile;
use tracing::{debug, info, info_span, warn};

use crate::multi::{multi_unweighted, multi_weighted, resolve_options};
use crate::result::{FilterInfo, VariableResult};
use crate::single::{effective_value_labels, single_unweighted, single_weighted};

/// Scopes below this many respondents get a reliability warning.
const SMALL_SAMPLE: usize = 30;

/// Everything one batch run produces.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Results in plan order, minus skipped variables.
    pub results: Vec<VariableResult>,
    /// Human-readable degradations, in the order they occurred.
    pub warnings: Vec<String>,
}

/// Weighting state shared across the batch.
///
/// Filtered scopes need their own weight profiles; those are cached per
/// filter-set name so two variables behind the same filter screen weights
/// once. Failures keep their message so every retry reports the same cause.
struct Weighting {
    variable: String,
    base: WeightProfile,
    scoped: HashMap<String, std::result::Result<WeightProfile, String>>,
}

impl Weighting {
    fn profile_for(
        &mut self,
        filter: Option<&FilterInfo>,
        scope: &SurveyFrame,
    ) -> std::result::Result<&WeightProfile, String> {
        let Some(info) = filter else {
            return Ok(&self.base);
        };
        self.scoped
            .entry(info.name.clone())
            .or_insert_with(|| {
                WeightProfile::new(scope, &self.variable).map_err(|err| err.to_string())
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

/// Tabulates every variable of a plan against one survey table.
pub struct FrequencyProcessor<'a> {
    frame: &'a SurveyFrame,
    config: &'a SurveyConfig,
    engine: FilterEngine<'a>,
    weighting: Option<Weighting>,
    warnings: Vec<String>,
}

impl<'a> FrequencyProcessor<'a> {
    pub fn new(frame: &'a SurveyFrame, config: &'a SurveyConfig) -> Self {
        let engine = FilterEngine::new(frame, &config.variables);
        let mut warnings = Vec::new();
        let weighting = Self::init_weighting(frame, config, &mut warnings);
        Self {
            frame,
            config,
            engine,
            weighting,
            warnings,
        }
    }

    /// Builds the base weight profile when the plan asks for weighting.
    ///
    /// A broken weighting setup downgrades the whole run to unweighted
    /// rather than failing it.
    fn init_weighting(
        frame: &SurveyFrame,
        config: &SurveyConfig,
        warnings: &mut Vec<String>,
    ) -> Option<Weighting> {
        let weighting = config.weighting.as_ref()?;
        if !weighting.enabled {
            return None;
        }
        let Some(variable) = weighting
            .weight_variable
            .as_deref()
            .filter(|name| !name.is_empty())
        else {
            let message =
                "Weighting enabled but no weight_variable specified. Weighting disabled."
                    .to_string();
            warn!("{message}");
            warnings.push(message);
            return None;
        };
        match WeightProfile::new(frame, variable) {
            Ok(base) => {
                for warning in base.warnings() {
                    let message = format!("Weighting: {warning}");
                    warn!("{message}");
                    warnings.push(message);
                }
                info!(
                    weight_variable = variable,
                    valid = base.summary().valid_count,
                    deff = base.summary().deff,
                    "weighting initialized"
                );
                Some(Weighting {
                    variable: variable.to_string(),
                    base,
                    scoped: HashMap::new(),
                })
            }
            Err(err) => {
                let message =
                    format!("Failed to initialize weighting: {err}. Proceeding without weights.");
                warn!("{message}");
                warnings.push(message);
                None
            }
        }
    }

    /// Tabulates the whole plan, consuming the processor.
    pub fn run(mut self) -> BatchOutcome {
        let config = self.config;
        let mut results = Vec::new();
        for def in &config.variables {
            let span = info_span!("variable", name = %def.name, kind = %def.kind);
            let _guard = span.enter();
            if let Some(result) = self.process_variable(def) {
                debug!(
                    rows = result.rows.len(),
                    weighted = result.weighted,
                    "variable tabulated"
                );
                results.push(result);
            }
        }
        info!(
            variables = results.len(),
            warnings = self.warnings.len(),
            "tabulation finished"
        );
        BatchOutcome {
            results,
            warnings: self.warnings,
        }
    }

    fn process_variable(&mut self, def: &VariableDef) -> Option<VariableResult> {
        let (scope, filter) = self.resolve_scope(def)?;
        match def.kind {
            VarKind::Single => self.process_single(def, &scope, filter),
            VarKind::Multi => self.process_multi(def, &scope, filter),
        }
    }

    /// Scope priority: the variable's own filter set, then the global
    /// filter, then the full table.
    ///
    /// An unknown or failing filter falls back to the full table with a
    /// warning; a filter that empties the table skips the variable.
    fn resolve_scope(&mut self, def: &VariableDef) -> Option<(SurveyFrame, Option<FilterInfo>)> {
        let requested = def
            .filter_set
            .as_deref()
            .or(self.config.global_filter.as_deref());
        let Some(name) = requested else {
            return Some((self.frame.clone(), None));
        };

        let Some(set) = self.config.filter_sets.get(name) else {
            self.push_warning(format!("Filter set '{name}' not found in configuration"));
            return Some((self.frame.clone(), None));
        };

        let outcome = match self.engine.apply(name, set) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.push_warning(format!("Error applying filter '{name}': {err}"));
                return Some((self.frame.clone(), None));
            }
        };

        if outcome.stats.kept_count == 0 {
            self.push_warning(format!(
                "Variable '{}' skipped: Filter '{name}' resulted in 0 respondents",
                def.name
            ));
            return None;
        }
        if outcome.stats.kept_count < SMALL_SAMPLE {
            self.push_warning(format!(
                "Small sample size for '{}': n={} (filter: {name})",
                def.name, outcome.stats.kept_count
            ));
        }

        let is_global = self.config.global_filter.as_deref() == Some(name);
        let FilterOutcome {
            frame,
            descriptions,
            stats,
        } = outcome;
        Some((
            frame,
            Some(FilterInfo {
                name: name.to_string(),
                descriptions,
                stats,
                is_global,
            }),
        ))
    }

    fn process_single(
        &mut self,
        def: &VariableDef,
        scope: &SurveyFrame,
        filter: Option<FilterInfo>,
    ) -> Option<VariableResult> {
        if !scope.has_column(&def.name) {
            self.push_warning(format!(
                "Variable '{}' not found in data file. Skipped.",
                def.name
            ));
            return None;
        }

        let labels = effective_value_labels(def, scope);

        if self.weighting.is_some() {
            match self.weighted_single(def, scope, &labels, filter.as_ref()) {
                Ok(result) => return Some(result),
                Err(err) => {
                    self.push_warning(format!(
                        "Error calculating weighted frequencies for '{}': {err}. Using unweighted.",
                        def.name
                    ));
                }
            }
        }

        match single_unweighted(scope, &def.name, &labels) {
            Ok((rows, totals)) => Some(VariableResult {
                name: def.name.clone(),
                label: def.display_label().to_string(),
                kind: VarKind::Single,
                weighted: false,
                totals,
                rows,
                filter,
                weight_summary: None,
            }),
            Err(err) => {
                self.push_warning(format!(
                    "Error processing variable '{}': {err}",
                    def.name
                ));
                None
            }
        }
    }

    fn weighted_single(
        &mut self,
        def: &VariableDef,
        scope: &SurveyFrame,
        labels: &[(f64, String)],
        filter: Option<&FilterInfo>,
    ) -> std::result::Result<VariableResult, String> {
        let weighting = self
            .weighting
            .as_mut()
            .ok_or_else(|| "weighting not initialized".to_string())?;
        let profile = weighting.profile_for(filter, scope)?;
        let (rows, totals) =
            single_weighted(profile, &def.name, labels).map_err(|err| err.to_string())?;
        Ok(VariableResult {
            name: def.name.clone(),
            label: def.display_label().to_string(),
            kind: VarKind::Single,
            weighted: true,
            totals,
            rows,
            filter: filter.cloned(),
            weight_summary: Some(*profile.summary()),
        })
    }

    fn process_multi(
        &mut self,
        def: &VariableDef,
        scope: &SurveyFrame,
        filter: Option<FilterInfo>,
    ) -> Option<VariableResult> {
        let (options, missing) = resolve_options(def, scope);
        if !missing.is_empty() {
            self.push_warning(format!(
                "Sub-variables not found for '{}': {}",
                def.name,
                missing.join(", ")
            ));
        }
        if options.is_empty() {
            self.push_warning(format!(
                "No sub-variables found for '{}'. Skipped.",
                def.name
            ));
            return None;
        }

        if self.weighting.is_some() {
            match self.weighted_multi(def, scope, &options, filter.as_ref()) {
                Ok(Some(result)) => return Some(result),
                Ok(None) => {
                    self.push_warning(format!(
                        "No responses found for '{}'. Skipped.",
                        def.name
                    ));
                    return None;
                }
                Err(err) => {
                    self.push_warning(format!(
                        "Error calculating weighted frequencies for '{}': {err}. Using unweighted.",
                        def.name
                    ));
                }
            }
        }

        match multi_unweighted(scope, &options) {
            Ok(Some((rows, totals))) => Some(VariableResult {
                name: def.name.clone(),
                label: def.display_label().to_string(),
                kind: VarKind::Multi,
                weighted: false,
                totals,
                rows,
                filter,
                weight_summary: None,
            }),
            Ok(None) => {
                self.push_warning(format!(
                    "No responses found for '{}'. Skipped.",
                    def.name
                ));
                None
            }
            Err(err) => {
                self.push_warning(format!(
                    "Error processing variable '{}': {err}",
                    def.name
                ));
                None
            }
        }
    }

    fn weighted_multi(
        &mut self,
        def: &VariableDef,
        scope: &SurveyFrame,
        options: &[(String, String)],
        filter: Option<&FilterInfo>,
    ) -> std::result::Result<Option<VariableResult>, String> {
        let weighting = self
            .weighting
            .as_mut()
            .ok_or_else(|| "weighting not initialized".to_string())?;
        let profile = weighting.profile_for(filter, scope)?;
        let tabulated = multi_weighted(profile, options).map_err(|err| err.to_string())?;
        Ok(tabulated.map(|(rows, totals)| VariableResult {
            name: def.name.clone(),
            label: def.display_label().to_string(),
            kind: VarKind::Multi,
            weighted: true,
            totals,
            rows,
            filter: filter.cloned(),
            weight_summary: Some(*profile.summary()),
        }))
    }

    fn push_warning(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}
