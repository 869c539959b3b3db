//! Report output for tabulated survey results.
//!
//! Two surfaces: a fixed-width plain-text frequency report meant to be
//! read as-is, and a chart-oriented JSON export for downstream plotting.
//! Both render from [`svy_freq::VariableResult`] values; nothing here
//! recomputes statistics.

pub mod chart;
pub mod text;

pub use chart::{ChartData, ChartPoint, write_chart_data};
pub use text::{ReportMeta, render_report, write_report};
