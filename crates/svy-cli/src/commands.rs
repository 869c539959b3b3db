use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, info_span, warn};

use svy_cli::pipeline::{default_report_path, load_inputs, tabulate};
use svy_ingest::read_table;
use svy_model::VarKind;
use svy_report::{ChartData, ReportMeta, write_chart_data, write_report};
use svy_validate::validate;

use crate::cli::{CheckArgs, InspectArgs, RunArgs};
use crate::types::{CheckOutcome, InspectOutcome, RunOutcome};

pub fn run_tabulation(args: &RunArgs) -> Result<RunOutcome> {
    let span = info_span!("run", data = %args.data.display());
    let _guard = span.enter();

    let inputs = load_inputs(&args.config, &args.data, args.labels.as_deref())?;

    // Validation errors gate tabulation; warnings do not.
    let validation = validate(&inputs.config, &inputs.frame);
    if validation.has_errors() {
        warn!(
            errors = validation.error_count(),
            warnings = validation.warning_count(),
            "validation failed, tabulation skipped"
        );
        return Ok(RunOutcome {
            data_file: args.data.clone(),
            validation,
            results: Vec::new(),
            warnings: Vec::new(),
            report_path: None,
            charts_path: None,
            has_errors: true,
        });
    }

    let output = tabulate(&inputs.config, &inputs.frame, &inputs.excluded);

    let mut report_path = None;
    if !args.no_report {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| default_report_path(&args.data));
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let meta = ReportMeta::from_config(&inputs.config, generated);
        write_report(&path, &output.results, &output.warnings, &meta)?;
        info!(path = %path.display(), "report written");
        report_path = Some(path);
    }

    let mut charts_path = None;
    if let Some(path) = &args.charts {
        let charts: Vec<ChartData> = output.results.iter().map(ChartData::from_result).collect();
        write_chart_data(path, &charts)?;
        info!(path = %path.display(), "chart data written");
        charts_path = Some(path.clone());
    }

    Ok(RunOutcome {
        data_file: args.data.clone(),
        validation,
        results: output.results,
        warnings: output.warnings,
        report_path,
        charts_path,
        has_errors: false,
    })
}

pub fn run_check(args: &CheckArgs) -> Result<CheckOutcome> {
    let span = info_span!("check", data = %args.data.display());
    let _guard = span.enter();

    let inputs = load_inputs(&args.config, &args.data, args.labels.as_deref())?;
    let validation = validate(&inputs.config, &inputs.frame);
    let single_count = inputs
        .config
        .variables
        .iter()
        .filter(|def| def.kind == VarKind::Single)
        .count();

    Ok(CheckOutcome {
        rows: inputs.frame.height(),
        columns: inputs.frame.width(),
        excluded: inputs.excluded,
        single_count,
        multi_count: inputs.config.variables.len() - single_count,
        filter_sets: inputs.config.filter_sets.len(),
        global_filter: inputs.config.global_filter.clone(),
        weight_variable: inputs
            .config
            .active_weight_variable()
            .map(ToString::to_string),
        validation,
    })
}

pub fn run_inspect(args: &InspectArgs) -> Result<InspectOutcome> {
    let (frame, excluded) = read_table(&args.data)
        .with_context(|| format!("load data file {}", args.data.display()))?;
    Ok(InspectOutcome {
        rows: frame.height(),
        numeric: frame.column_names(),
        excluded,
    })
}
