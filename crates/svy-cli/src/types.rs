use std::path::PathBuf;

use svy_freq::VariableResult;
use svy_ingest::ExcludedColumn;
use svy_validate::ValidationReport;

/// Everything `svytab run` produced, for the summary printer.
#[derive(Debug)]
pub struct RunOutcome {
    pub data_file: PathBuf,
    pub validation: ValidationReport,
    pub results: Vec<VariableResult>,
    pub warnings: Vec<String>,
    pub report_path: Option<PathBuf>,
    pub charts_path: Option<PathBuf>,
    pub has_errors: bool,
}

/// Dataset and plan overview for `svytab check`.
#[derive(Debug)]
pub struct CheckOutcome {
    pub rows: usize,
    pub columns: usize,
    pub excluded: Vec<ExcludedColumn>,
    pub single_count: usize,
    pub multi_count: usize,
    pub filter_sets: usize,
    pub global_filter: Option<String>,
    pub weight_variable: Option<String>,
    pub validation: ValidationReport,
}

/// Column disposition listing for `svytab inspect`.
#[derive(Debug)]
pub struct InspectOutcome {
    pub rows: usize,
    pub numeric: Vec<String>,
    pub excluded: Vec<ExcludedColumn>,
}
