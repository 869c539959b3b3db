//! Pipeline stages shared by the `svytab` subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use svy_freq::{FrequencyProcessor, VariableResult};
use svy_ingest::{DatasetMeta, ExcludedColumn, SurveyFrame, load_labels, read_table_with_meta};
use svy_model::SurveyConfig;

/// Plan, data, and the columns ingestion dropped.
#[derive(Debug)]
pub struct LoadedInputs {
    pub config: SurveyConfig,
    pub frame: SurveyFrame,
    pub excluded: Vec<ExcludedColumn>,
}

/// Loads the tabulation plan, the optional labels sidecar, and the data file.
pub fn load_inputs(
    config_path: &Path,
    data_path: &Path,
    labels_path: Option<&Path>,
) -> Result<LoadedInputs> {
    let config = SurveyConfig::load(config_path)
        .with_context(|| format!("load tabulation plan {}", config_path.display()))?;
    info!(
        variables = config.variables.len(),
        filter_sets = config.filter_sets.len(),
        "plan loaded"
    );

    let meta = match labels_path {
        Some(path) => {
            load_labels(path).with_context(|| format!("load labels sidecar {}", path.display()))?
        }
        None => DatasetMeta::default(),
    };
    let (frame, excluded) = read_table_with_meta(data_path, Arc::new(meta))
        .with_context(|| format!("load data file {}", data_path.display()))?;
    info!(
        rows = frame.height(),
        columns = frame.width(),
        excluded = excluded.len(),
        "data file loaded"
    );

    Ok(LoadedInputs {
        config,
        frame,
        excluded,
    })
}

/// Tabulated results plus every warning the run produced.
///
/// Ingestion exclusions come first so the report's warning block reads in
/// pipeline order.
pub struct TabulationOutput {
    pub results: Vec<VariableResult>,
    pub warnings: Vec<String>,
}

/// Runs the batch processor over every plan variable.
pub fn tabulate(
    config: &SurveyConfig,
    frame: &SurveyFrame,
    excluded: &[ExcludedColumn],
) -> TabulationOutput {
    let span = info_span!("tabulate");
    let _guard = span.enter();
    let start = Instant::now();

    let outcome = FrequencyProcessor::new(frame, config).run();
    info!(
        variables = outcome.results.len(),
        warnings = outcome.warnings.len(),
        duration_ms = start.elapsed().as_millis(),
        "tabulation complete"
    );

    let mut warnings: Vec<String> = excluded.iter().map(ToString::to_string).collect();
    warnings.extend(outcome.warnings);
    TabulationOutput {
        results: outcome.results,
        warnings,
    }
}

/// `<data stem>_Frequencies.txt` beside the data file.
pub fn default_report_path(data: &Path) -> PathBuf {
    let stem = data
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("survey");
    data.with_file_name(format!("{stem}_Frequencies.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_report_path_sits_beside_the_data_file() {
        let path = default_report_path(Path::new("/srv/data/wave3.csv"));
        assert_eq!(path, Path::new("/srv/data/wave3_Frequencies.txt"));
    }

    #[test]
    fn default_report_path_handles_extensionless_files() {
        let path = default_report_path(Path::new("survey"));
        assert_eq!(path, Path::new("survey_Frequencies.txt"));
    }
}
