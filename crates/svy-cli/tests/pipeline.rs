use std::fs;
use std::path::{Path, PathBuf};

use svy_cli::pipeline::{load_inputs, tabulate};
use svy_report::{ReportMeta, render_report};
use svy_validate::validate;
use tempfile::TempDir;

const PLAN: &str = r#"{
    "variables": [
        {"name": "Q1", "type": "single", "label": "Gender",
         "value_labels": {"1": "Male", "2": "Female"}}
    ]
}"#;

const DATA: &str = "Q1,NAME\n1,alice\n2,bob\n1,carol\n,dave\n";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn pipeline_tabulates_a_small_survey() {
    let dir = TempDir::new().unwrap();
    let plan = write_file(dir.path(), "meta.json", PLAN);
    let data = write_file(dir.path(), "survey.csv", DATA);

    let inputs = load_inputs(&plan, &data, None).unwrap();
    assert_eq!(inputs.frame.height(), 4);
    assert_eq!(inputs.excluded.len(), 1);

    let validation = validate(&inputs.config, &inputs.frame);
    assert!(validation.is_valid());

    let output = tabulate(&inputs.config, &inputs.frame, &inputs.excluded);
    assert_eq!(output.results.len(), 1);
    assert!(output.warnings[0].starts_with("Column 'NAME' excluded:"));

    let result = &output.results[0];
    assert_eq!(result.totals.scope_rows(), 4);
    assert_eq!(result.totals.valid_rows(), 3);
    assert_eq!(result.rows[0].label, "Male");
    assert_eq!(result.rows[0].count, 2);

    let meta = ReportMeta::from_config(&inputs.config, "2026-08-21 10:30:00");
    let report = render_report(&output.results, &output.warnings, &meta);
    assert!(report.contains("1. Gender\n"));
    assert!(report.contains("⚠ Column 'NAME' excluded:"));
    assert!(report.contains(
        "Male                                                        2        50.0%\n"
    ));
    assert!(report.ends_with('\n'));
}

#[test]
fn validation_reports_missing_columns_before_tabulation() {
    let dir = TempDir::new().unwrap();
    let plan = write_file(
        dir.path(),
        "meta.json",
        r#"{"variables": [{"name": "NOPE", "type": "single", "label": "Ghost"}]}"#,
    );
    let data = write_file(dir.path(), "survey.csv", "Q1\n1\n2\n");

    let inputs = load_inputs(&plan, &data, None).unwrap();
    let validation = validate(&inputs.config, &inputs.frame);

    assert!(validation.has_errors());
    assert!(
        validation
            .errors()
            .any(|issue| issue.message.contains("'NOPE'"))
    );
}

#[test]
fn labels_sidecar_feeds_value_labels() {
    let dir = TempDir::new().unwrap();
    let plan = write_file(
        dir.path(),
        "meta.json",
        r#"{"variables": [{"name": "Q1", "type": "single", "label": "Gender"}]}"#,
    );
    let labels = write_file(
        dir.path(),
        "labels.json",
        r#"{"value_labels": {"Q1": {"1": "Male", "2": "Female"}}}"#,
    );
    let data = write_file(dir.path(), "survey.csv", "Q1\n1\n2\n2\n");

    let inputs = load_inputs(&plan, &data, Some(&labels)).unwrap();
    let output = tabulate(&inputs.config, &inputs.frame, &inputs.excluded);

    let row_labels: Vec<&str> = output.results[0]
        .rows
        .iter()
        .map(|row| row.label.as_str())
        .collect();
    assert_eq!(row_labels, vec!["Male", "Female"]);
}

#[test]
fn missing_plan_is_reported_with_context() {
    let dir = TempDir::new().unwrap();
    let data = write_file(dir.path(), "survey.csv", "Q1\n1\n");

    let err = load_inputs(&dir.path().join("nope.json"), &data, None).unwrap_err();
    assert!(format!("{err:#}").contains("load tabulation plan"));
}
