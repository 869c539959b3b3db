//! Tabulation plan: variables, filter sets, and weighting options.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::filter::FilterSet;
use crate::variable::VariableDef;

/// Weighting options for a tabulation plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub weight_variable: Option<String>,
}

/// A complete tabulation plan as loaded from JSON.
///
/// Unknown top-level fields are tolerated so plans can carry extra
/// front-end settings alongside the tabulation schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(default)]
    pub variables: Vec<VariableDef>,
    #[serde(default)]
    pub filter_sets: IndexMap<String, FilterSet>,
    #[serde(default)]
    pub global_filter: Option<String>,
    #[serde(default)]
    pub weighting: Option<WeightingConfig>,
}

impl SurveyConfig {
    /// Loads a plan from a JSON file and verifies its value-label keys.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.check_value_label_keys()?;
        Ok(config)
    }

    /// Definition lookup by variable name.
    pub fn variable(&self, name: &str) -> Option<&VariableDef> {
        self.variables.iter().find(|def| def.name == name)
    }

    /// The weight variable when weighting is switched on and names one.
    pub fn active_weight_variable(&self) -> Option<&str> {
        self.weighting
            .as_ref()
            .filter(|weighting| weighting.enabled)
            .and_then(|weighting| weighting.weight_variable.as_deref())
            .filter(|name| !name.is_empty())
    }

    fn check_value_label_keys(&self) -> Result<()> {
        for def in &self.variables {
            if let Some(labels) = &def.value_labels
                && let Some(key) = labels.first_bad_key()
            {
                return Err(ConfigError::ValueLabelKey {
                    variable: def.name.clone(),
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}
