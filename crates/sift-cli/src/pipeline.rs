//! Pipeline stage functions behind the `run` command.
//!
//! The run command drives these stages in order:
//! 1. **Load**: Read the source file into an owned string-typed table
//! 2. **Configure**: Parse the JSON pipeline configuration
//! 3. **Execute**: Validate column references, then run every configured step
//! 4. **Output**: Write the cleaned CSV and the JSON run report
//!
//! Load, configure, and output live here; execute is
//! `sift_transform::run_pipeline`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::{AnyValue, DataFrame};
use tracing::{debug, info, info_span};

use sift_ingest::{IngestOptions, any_to_string, read_table_file};
use sift_model::{PipelineConfig, SiftError};
use sift_report::{write_run_report_json, write_table_csv};
use sift_transform::{PipelineOutcome, Table, build_table};

/// Map CLI-level ingest flags onto [`IngestOptions`].
///
/// # Errors
///
/// Rejects delimiters outside the ASCII range; the `csv` reader splits
/// on a single byte.
pub fn ingest_options(
    delimiter: Option<char>,
    sheet: Option<String>,
    underscore_headers: bool,
) -> Result<IngestOptions> {
    let delimiter = match delimiter {
        Some(ch) if ch.is_ascii() => Some(ch as u8),
        Some(ch) => {
            return Err(SiftError::Config(format!(
                "delimiter must be a single ASCII character, got {ch:?}"
            ))
            .into());
        }
        None => None,
    };
    Ok(IngestOptions {
        delimiter,
        sheet,
        underscore_headers,
    })
}

/// Load a source file into an owned table with provenance metadata.
pub fn load(path: &Path, options: &IngestOptions) -> Result<Table> {
    let load_span = info_span!("load", data_file = %path.display());
    let _load_guard = load_span.enter();
    let load_start = Instant::now();
    let loaded = read_table_file(path, options)?;
    let table = build_table(&loaded)?;
    info!(
        table_name = %table.name,
        rows = table.row_count(),
        columns = table.column_count(),
        duration_ms = load_start.elapsed().as_millis(),
        "load complete"
    );
    Ok(table)
}

/// Read a pipeline configuration file; `None` means the empty pipeline.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        debug!("no config file, running the empty pipeline");
        return Ok(PipelineConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config: PipelineConfig = serde_json::from_str(&text)
        .map_err(|error| SiftError::Config(format!("{}: {error}", path.display())))?;
    info!(
        config_file = %path.display(),
        steps = config.step_count(),
        "config loaded"
    );
    Ok(config)
}

/// Result of the output stage.
#[derive(Debug)]
pub struct OutputResult {
    /// Cleaned CSV path, when written.
    pub cleaned_csv: Option<PathBuf>,
    /// Run report path, when written.
    pub run_report: Option<PathBuf>,
    /// Errors encountered while writing.
    pub errors: Vec<String>,
}

/// Write the cleaned CSV and the JSON run report.
///
/// A failed writer becomes an entry in `errors` rather than aborting, so
/// one bad artifact still leaves the other on disk.
pub fn output(
    output_dir: &Path,
    table: &Table,
    config: &PipelineConfig,
    outcome: &PipelineOutcome,
    dry_run: bool,
) -> OutputResult {
    let output_span = info_span!("output", table_name = %table.name);
    let _output_guard = output_span.enter();
    let output_start = Instant::now();
    let mut errors = Vec::new();

    if dry_run {
        info!(
            table_name = %table.name,
            duration_ms = output_start.elapsed().as_millis(),
            "output skipped (dry run)"
        );
        return OutputResult {
            cleaned_csv: None,
            run_report: None,
            errors,
        };
    }

    let cleaned_csv = match write_table_csv(output_dir, table) {
        Ok(path) => Some(path),
        Err(error) => {
            errors.push(format!("cleaned csv: {error}"));
            None
        }
    };
    let run_report = match write_run_report_json(output_dir, table, config, outcome) {
        Ok(path) => Some(path),
        Err(error) => {
            errors.push(format!("run report: {error}"));
            None
        }
    };

    let cleaned_path = cleaned_csv
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    let report_path = run_report
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    info!(
        table_name = %table.name,
        cleaned_csv = %cleaned_path,
        run_report = %report_path,
        duration_ms = output_start.elapsed().as_millis(),
        "output complete"
    );

    OutputResult {
        cleaned_csv,
        run_report,
        errors,
    }
}

/// First `limit` rows of a frame as display strings, nulls as empty cells.
pub fn preview_rows(df: &DataFrame, limit: usize) -> Vec<Vec<String>> {
    let height = df.height().min(limit);
    let columns = df.get_columns();
    let mut rows = Vec::with_capacity(height);
    for idx in 0..height {
        let mut row = Vec::with_capacity(columns.len());
        for column in columns {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            row.push(any_to_string(value));
        }
        rows.push(row);
    }
    rows
}
