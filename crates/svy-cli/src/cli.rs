//! CLI argument definitions for the survey tabulation engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "svytab",
    version,
    about = "Survey tabulation engine - frequency reports from survey data",
    long_about = "Tabulate survey data into frequency reports.\n\n\
                  Reads a survey CSV plus a JSON tabulation plan, applies filter\n\
                  sets and respondent weights, and writes a formatted frequency\n\
                  report with optional chart data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate the plan, tabulate every variable, and write the report.
    Run(RunArgs),

    /// Validate a plan against a data file without tabulating.
    Check(CheckArgs),

    /// Load a data file and show which columns can be tabulated.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the survey data CSV.
    #[arg(value_name = "DATA_CSV")]
    pub data: PathBuf,

    /// Path to the tabulation plan JSON.
    #[arg(long = "config", value_name = "META_JSON")]
    pub config: PathBuf,

    /// Labels sidecar JSON exported alongside the data.
    #[arg(long = "labels", value_name = "LABELS_JSON")]
    pub labels: Option<PathBuf>,

    /// Report output path (default: <data stem>_Frequencies.txt beside the data).
    #[arg(long = "output", value_name = "TXT")]
    pub output: Option<PathBuf>,

    /// Also write chart-ready JSON to this path.
    #[arg(long = "charts", value_name = "JSON")]
    pub charts: Option<PathBuf>,

    /// Tabulate and summarize without writing the report file.
    #[arg(long = "no-report")]
    pub no_report: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the survey data CSV.
    #[arg(value_name = "DATA_CSV")]
    pub data: PathBuf,

    /// Path to the tabulation plan JSON.
    #[arg(long = "config", value_name = "META_JSON")]
    pub config: PathBuf,

    /// Labels sidecar JSON exported alongside the data.
    #[arg(long = "labels", value_name = "LABELS_JSON")]
    pub labels: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Path to the survey data CSV.
    #[arg(value_name = "DATA_CSV")]
    pub data: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
