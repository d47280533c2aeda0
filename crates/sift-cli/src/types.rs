//! Result types shared between command orchestration and summary printing.

use std::collections::BTreeMap;
use std::path::PathBuf;

use sift_ingest::{ColumnHint, LoadedTable};
use sift_transform::{PipelineOutcome, Table};

/// Everything the `run` command produced, for summary printing and the
/// process exit code.
#[derive(Debug)]
pub struct RunResult {
    /// The cleaned table, after every mutating stage ran.
    pub table: Table,
    /// Directory outputs were written to (or would be, under `--dry-run`).
    pub output_dir: PathBuf,
    /// Rows of the table and each view the summary may print.
    pub preview_limit: usize,
    /// Stage records, views, aggregations, and statistics from the run.
    pub outcome: PipelineOutcome,
    /// Cleaned CSV path, when one was written.
    pub cleaned_csv: Option<PathBuf>,
    /// Run report path, when one was written.
    pub run_report: Option<PathBuf>,
    /// Non-fatal errors accumulated across stages.
    pub errors: Vec<String>,
    /// True when any stage recorded an error.
    pub has_errors: bool,
}

/// Everything the `inspect` command gathered about a source file.
#[derive(Debug)]
pub struct InspectResult {
    /// The raw table with its provenance.
    pub loaded: LoadedTable,
    /// Per-column shape hints, keyed by header.
    pub hints: BTreeMap<String, ColumnHint>,
    /// Sample rows to print.
    pub limit: usize,
}
