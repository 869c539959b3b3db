use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use svy_freq::FilterInfo;
use svy_validate::{Severity, ValidationReport};

use crate::types::{CheckOutcome, InspectOutcome, RunOutcome};

pub fn print_run_summary(outcome: &RunOutcome) {
    println!("Data: {}", outcome.data_file.display());
    if let Some(path) = &outcome.report_path {
        println!("Report: {}", path.display());
    }
    if let Some(path) = &outcome.charts_path {
        println!("Charts: {}", path.display());
    }

    if !outcome.results.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Variable"),
            header_cell("Label"),
            header_cell("Type"),
            header_cell("N"),
            header_cell("Valid/Base"),
            header_cell("Weighted"),
            header_cell("Filter"),
        ]);
        apply_variable_table_style(&mut table);
        align_column(&mut table, 2, CellAlignment::Center);
        align_column(&mut table, 3, CellAlignment::Right);
        align_column(&mut table, 4, CellAlignment::Right);
        align_column(&mut table, 5, CellAlignment::Center);
        for result in &outcome.results {
            table.add_row(vec![
                Cell::new(&result.name)
                    .fg(Color::Blue)
                    .add_attribute(Attribute::Bold),
                Cell::new(&result.label),
                Cell::new(result.kind.as_str().to_uppercase()),
                Cell::new(result.totals.scope_rows()),
                Cell::new(result.totals.valid_rows()),
                flag_cell(result.weighted),
                filter_cell(result.filter.as_ref()),
            ]);
        }
        println!("{table}");
    }

    print_warning_table(&outcome.warnings);
    print_issue_table(&outcome.validation);
}

pub fn print_check_summary(outcome: &CheckOutcome) {
    println!("Rows: {}", outcome.rows);
    println!(
        "Columns: {} numeric ({} excluded)",
        outcome.columns,
        outcome.excluded.len()
    );

    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new("Single-response variables"),
        Cell::new(outcome.single_count),
    ]);
    table.add_row(vec![
        Cell::new("Multi-response variables"),
        Cell::new(outcome.multi_count),
    ]);
    table.add_row(vec![
        Cell::new("Filter sets"),
        Cell::new(outcome.filter_sets),
    ]);
    table.add_row(vec![
        Cell::new("Global filter"),
        option_cell(outcome.global_filter.as_deref()),
    ]);
    table.add_row(vec![
        Cell::new("Weighting"),
        option_cell(outcome.weight_variable.as_deref()),
    ]);
    println!("{table}");

    if outcome.validation.issues.is_empty() {
        println!("Validation: OK");
    } else {
        print_issue_table(&outcome.validation);
    }
}

pub fn print_inspect_summary(outcome: &InspectOutcome) {
    println!("Rows: {}", outcome.rows);
    println!(
        "Columns: {} ({} tabulated, {} excluded)",
        outcome.numeric.len() + outcome.excluded.len(),
        outcome.numeric.len(),
        outcome.excluded.len()
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Status"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for name in &outcome.numeric {
        table.add_row(vec![
            Cell::new(name),
            Cell::new("numeric").fg(Color::Green),
            dim_cell("-"),
        ]);
    }
    for excluded in &outcome.excluded {
        table.add_row(vec![
            Cell::new(&excluded.name),
            Cell::new("excluded").fg(Color::Yellow),
            Cell::new(&excluded.dtype),
        ]);
    }
    println!("{table}");
}

fn print_warning_table(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("Warnings:");
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Warning")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, warning) in warnings.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1).fg(Color::Yellow),
            Cell::new(warning),
        ]);
    }
    println!("{table}");
}

fn print_issue_table(report: &ValidationReport) {
    if report.issues.is_empty() {
        return;
    }
    let mut issues: Vec<_> = report.issues.iter().collect();
    // Stable sort keeps check order within one severity.
    issues.sort_by(|a, b| severity_rank(b.severity).cmp(&severity_rank(a.severity)));

    println!();
    println!(
        "Issues: {} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Category"),
        header_cell("Subject"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for issue in issues {
        let subject = issue.subject.as_deref().unwrap_or("-");
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(&issue.category),
            if subject == "-" {
                dim_cell(subject)
            } else {
                Cell::new(subject)
            },
            Cell::new(&issue.message),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_variable_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(150);
    if table.column_count() >= 7 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(14)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
        ]);
    }
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Fixed(26)),
            ColumnConstraint::UpperBoundary(Width::Fixed(14)),
            ColumnConstraint::UpperBoundary(Width::Percentage(55)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 2,
        Severity::Warning => 1,
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new(severity.as_str())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new(severity.as_str()).fg(Color::Yellow),
    }
}

fn flag_cell(enabled: bool) -> Cell {
    if enabled {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn filter_cell(filter: Option<&FilterInfo>) -> Cell {
    match filter {
        Some(info) if info.is_global => Cell::new(format!("{} (Global)", info.name)),
        Some(info) => Cell::new(&info.name),
        None => dim_cell("-"),
    }
}

fn option_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
