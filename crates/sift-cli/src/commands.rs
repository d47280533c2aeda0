use std::path::Path;

use anyhow::Result;
use tracing::info_span;

use sift_ingest::{build_column_hints, read_table_file};
use sift_transform::run_pipeline;

use crate::cli::{InspectArgs, RunArgs};
use crate::pipeline::{ingest_options, load, load_config, output};
use crate::types::{InspectResult, RunResult};

pub fn run(args: &RunArgs) -> Result<RunResult> {
    let run_span = info_span!("run", data_file = %args.data_file.display());
    let _run_guard = run_span.enter();
    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        args.data_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join("output")
    });
    let options = ingest_options(args.delimiter, args.sheet.clone(), args.underscore_headers)?;

    // =========================================================================
    // Stage 1: Load - Read the source file into an owned table
    // =========================================================================
    let mut table = load(&args.data_file, &options)?;

    // =========================================================================
    // Stage 2: Configure - Parse the pipeline configuration
    // =========================================================================
    let config = load_config(args.config.as_deref())?;

    // =========================================================================
    // Stage 3: Execute - Validate references, then run every configured step
    // =========================================================================
    let outcome = run_pipeline(&config, &mut table, &options)?;

    // =========================================================================
    // Stage 4: Output - Write the cleaned CSV and the run report
    // =========================================================================
    let written = output(&output_dir, &table, &config, &outcome, args.dry_run);

    let errors = written.errors;
    let has_errors = !errors.is_empty();
    Ok(RunResult {
        table,
        output_dir,
        preview_limit: args.preview,
        outcome,
        cleaned_csv: written.cleaned_csv,
        run_report: written.run_report,
        errors,
        has_errors,
    })
}

pub fn inspect(args: &InspectArgs) -> Result<InspectResult> {
    let inspect_span = info_span!("inspect", data_file = %args.data_file.display());
    let _inspect_guard = inspect_span.enter();
    let options = ingest_options(args.delimiter, args.sheet.clone(), false)?;
    let loaded = read_table_file(&args.data_file, &options)?;
    let hints = build_column_hints(&loaded.raw);
    Ok(InspectResult {
        loaded,
        hints,
        limit: args.limit,
    })
}
