//! JSON run report.
//!
//! One file per run, next to the cleaned CSV: source provenance, the
//! config that ran, per-stage execution records, view shapes, aggregation
//! tables, and statistics. The payload carries a schema name and version
//! so downstream readers can detect format changes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use sift_ingest::SourceInfo;
use sift_model::PipelineConfig;
use sift_transform::{
    AggregationResult, ColumnSummary, CorrelationMatrix, PipelineOutcome, StageSummary, Table,
    ViewKind,
};

const REPORT_SCHEMA: &str = "tablesift.run-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct RunReportPayload {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    pub table: TableReport,
    pub source: Option<SourceInfo>,
    pub config: PipelineConfig,
    pub stages: Vec<StageSummary>,
    pub views: Vec<ViewReport>,
    pub aggregations: Vec<AggregationResult>,
    pub summaries: Vec<ColumnSummary>,
    pub correlations: Option<CorrelationMatrix>,
}

#[derive(Debug, Serialize)]
pub struct TableReport {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub loaded_rows: Option<usize>,
    pub loaded_columns: Option<usize>,
}

/// Shape of a captured view; the view frames themselves stay in memory.
#[derive(Debug, Serialize)]
pub struct ViewReport {
    pub label: String,
    pub kind: ViewKind,
    pub rows: usize,
    pub columns: usize,
}

/// Write `<name>_report.json` under `output_dir` and return its path.
pub fn write_run_report_json(
    output_dir: &Path,
    table: &Table,
    config: &PipelineConfig,
    outcome: &PipelineOutcome,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(format!("{}_report.json", table.name));
    let payload = RunReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        table: TableReport {
            name: table.name.clone(),
            rows: table.row_count(),
            columns: table.column_count(),
            loaded_rows: table.meta.as_ref().map(|meta| meta.loaded_rows),
            loaded_columns: table.meta.as_ref().map(|meta| meta.loaded_columns),
        },
        source: table.meta.as_ref().map(|meta| meta.source.clone()),
        config: config.clone(),
        stages: outcome.stages.clone(),
        views: outcome
            .views
            .iter()
            .map(|view| ViewReport {
                label: view.label.clone(),
                kind: view.kind,
                rows: view.frame.height(),
                columns: view.frame.width(),
            })
            .collect(),
        aggregations: outcome.aggregations.clone(),
        summaries: outcome.summaries.clone(),
        correlations: outcome.correlations.clone(),
    };
    let json = serde_json::to_string_pretty(&payload)?;
    fs::write(&output_path, format!("{json}\n"))?;
    info!(path = %output_path.display(), stages = payload.stages.len(), "run report written");
    Ok(output_path)
}
