//! CLI argument definitions for tablesift.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tablesift",
    version,
    about = "tablesift - Clean, filter, and summarize tabular data files",
    long_about = "Run a configured cleaning pipeline over a delimited or spreadsheet file.\n\n\
                  A JSON config drives type coercion, filters, derived columns, grouped\n\
                  aggregation, and lookup joins; outputs are a cleaned CSV and a\n\
                  machine-readable JSON run report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
    /// Run a cleaning pipeline over a data file and write its outputs.
    Run(RunArgs),

    /// Show shape, column hints, and sample rows for a data file.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the source data file (csv, tsv, txt, dat, xlsx, xls, ods).
    #[arg(value_name = "DATA_FILE")]
    pub data_file: PathBuf,

    /// Pipeline configuration file (JSON). Omit to run the empty pipeline.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output directory for generated files (default: <DATA_FILE dir>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Validate and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Field delimiter for delimited files (default: by file extension).
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Sheet name or 0-based index for spreadsheet files.
    #[arg(long = "sheet", value_name = "NAME_OR_INDEX")]
    pub sheet: Option<String>,

    /// Rewrite headers so whitespace runs become single underscores.
    #[arg(long = "underscore-headers")]
    pub underscore_headers: bool,

    /// Rows of the cleaned table and each view to print (0 hides previews).
    #[arg(long = "preview", value_name = "N", default_value_t = 5)]
    pub preview: usize,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Path to the source data file (csv, tsv, txt, dat, xlsx, xls, ods).
    #[arg(value_name = "DATA_FILE")]
    pub data_file: PathBuf,

    /// Field delimiter for delimited files (default: by file extension).
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Sheet name or 0-based index for spreadsheet files.
    #[arg(long = "sheet", value_name = "NAME_OR_INDEX")]
    pub sheet: Option<String>,

    /// Sample rows to print.
    #[arg(long = "limit", value_name = "N", default_value_t = 10)]
    pub limit: usize,
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
