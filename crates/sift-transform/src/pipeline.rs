//! Staged pipeline execution.
//!
//! A [`PipelineConfig`] runs against one owned [`Table`] in a fixed stage
//! order: coercions, filter views, selection views, aggregations, missing
//! policies, derives, normalizations, joins, statistics. Views and
//! aggregations read the table; every other stage rewrites it in place.
//! Each step is recorded as a [`StageSummary`] for the run report.

use std::time::Instant;

use anyhow::Result;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, info_span};

use sift_ingest::{IngestOptions, read_table_file};
use sift_model::{MissingPolicy, Operand, PipelineConfig, Reduction, SiftError};

use crate::aggregate::{AggregateValue, group_aggregate};
use crate::coerce::coerce_column;
use crate::data_utils::column_lookup;
use crate::derive::derive_column;
use crate::filter::filter_rows;
use crate::frame::{Table, build_table};
use crate::join::{MERGE_SUFFIX, attach_columns};
use crate::missing::apply_missing_policy;
use crate::normalize::normalize_min_max;
use crate::select::select_view;
use crate::stats::{ColumnSummary, CorrelationMatrix, correlation_matrix, summarize_columns};

/// Pipeline stage a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Coerce,
    Filter,
    Select,
    Aggregate,
    Missing,
    Derive,
    Normalize,
    Join,
    Stats,
}

impl StageKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Coerce => "coerce",
            Self::Filter => "filter",
            Self::Select => "select",
            Self::Aggregate => "aggregate",
            Self::Missing => "missing",
            Self::Derive => "derive",
            Self::Normalize => "normalize",
            Self::Join => "join",
            Self::Stats => "stats",
        }
    }
}

/// Execution record for one pipeline step.
#[derive(Debug, Clone, Serialize)]
pub struct StageSummary {
    /// Which stage the step belongs to.
    pub stage: StageKind,

    /// Step label, from the config or generated.
    pub detail: String,

    /// Table height before the step ran.
    pub rows_before: usize,

    /// Table height after the step ran.
    pub rows_after: usize,

    /// Cells the step wrote, filled, or cleared.
    pub cells_changed: usize,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

impl StageSummary {
    fn record(
        stage: StageKind,
        detail: impl Into<String>,
        rows_before: usize,
        rows_after: usize,
        cells_changed: usize,
        start: Instant,
    ) -> Self {
        Self {
            stage,
            detail: detail.into(),
            rows_before,
            rows_after,
            cells_changed,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Whether a captured view came from a filter or a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Filter,
    Select,
}

impl ViewKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Select => "select",
        }
    }
}

/// A filtered or sliced view captured off the main table.
#[derive(Debug, Clone)]
pub struct ViewResult {
    pub label: String,
    pub kind: ViewKind,
    pub frame: DataFrame,
}

/// One group of an aggregation result, keyed by the group label.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateRow {
    pub group: String,
    pub value: AggregateValue,
}

/// A computed aggregation, rows in group-key order.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationResult {
    pub label: String,
    pub group_by: String,
    pub target: String,
    pub reduction: Reduction,
    pub rows: Vec<AggregateRow>,
}

/// Everything a run produced besides the cleaned table itself.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    /// Per-step execution records, in run order.
    pub stages: Vec<StageSummary>,

    /// Filter and selection views captured along the way.
    pub views: Vec<ViewResult>,

    /// Aggregation tables.
    pub aggregations: Vec<AggregationResult>,

    /// Descriptive statistics, when requested.
    pub summaries: Vec<ColumnSummary>,

    /// Correlation matrix, when requested.
    pub correlations: Option<CorrelationMatrix>,
}

/// Check every column reference in `config` against the table before any
/// stage runs, walking sections in run order so references to columns a
/// derive, normalization, or join will add are accepted. Extra columns of
/// a join with a `source` file are only checkable once that file is
/// loaded, so they are left to the join itself.
pub fn validate_config(config: &PipelineConfig, df: &DataFrame) -> Result<()> {
    let mut known = column_lookup(df);

    for spec in &config.coercions {
        known.resolve(&spec.column)?;
    }
    for spec in &config.filters {
        for condition in &spec.conditions {
            known.resolve(&condition.column)?;
        }
    }
    for spec in &config.selections {
        for column in &spec.columns {
            known.resolve(column)?;
        }
    }
    for spec in &config.aggregations {
        known.resolve(&spec.group_by)?;
        known.resolve(&spec.target)?;
    }
    for policy in &config.missing {
        match policy {
            MissingPolicy::Leave => {}
            MissingPolicy::FillMean { columns } | MissingPolicy::DropMissingIn { columns } => {
                for column in columns {
                    known.resolve(column)?;
                }
            }
            MissingPolicy::DropSparseRows {
                min_present_fraction,
            } => {
                if !(0.0..=1.0).contains(min_present_fraction) {
                    return Err(SiftError::Config(format!(
                        "min_present_fraction must be within 0..=1, got {min_present_fraction}"
                    ))
                    .into());
                }
            }
        }
    }
    for spec in &config.derives {
        if spec.name.trim().is_empty() {
            return Err(SiftError::Config("derived column name is empty".to_string()).into());
        }
        for operand in [&spec.left, &spec.right] {
            if let Operand::Column(column) = operand {
                known.resolve(column)?;
            }
        }
        known.insert(spec.name.clone());
    }
    for spec in &config.normalize {
        known.resolve(&spec.column)?;
        known.insert(spec.output_name());
    }
    for spec in &config.joins {
        known.resolve(&spec.key)?;
        if spec.source.is_none() {
            for column in &spec.extra_columns {
                known.resolve(column)?;
            }
        }
        for column in &spec.extra_columns {
            if known.contains(column) {
                known.insert(format!("{column}{MERGE_SUFFIX}"));
            } else {
                known.insert(column.clone());
            }
        }
    }
    if let Some(spec) = &config.stats {
        for column in &spec.columns {
            known.resolve(column)?;
        }
    }
    Ok(())
}

/// Run the full pipeline against `table`, mutating it in place.
///
/// The ingest options are reused when a join loads its right-hand side
/// from a source file.
pub fn run_pipeline(
    config: &PipelineConfig,
    table: &mut Table,
    ingest: &IngestOptions,
) -> Result<PipelineOutcome> {
    validate_config(config, &table.data)?;

    let mut outcome = PipelineOutcome::default();

    if !config.coercions.is_empty() {
        info_span!("coerce").in_scope(|| -> Result<()> {
            for spec in &config.coercions {
                let start = Instant::now();
                let rows = table.row_count();
                let column = column_lookup(&table.data).resolve(&spec.column)?;
                let lost = coerce_column(&mut table.data, &column, &spec.rule)?;
                debug!(
                    column = %column,
                    rule = spec.rule.display_name(),
                    lost,
                    duration_ms = start.elapsed().as_millis(),
                    "column coerced"
                );
                outcome.stages.push(StageSummary::record(
                    StageKind::Coerce,
                    format!("{}({column})", spec.rule.display_name()),
                    rows,
                    table.row_count(),
                    lost,
                    start,
                ));
            }
            Ok(())
        })?;
    }

    if !config.filters.is_empty() {
        info_span!("filter").in_scope(|| -> Result<()> {
            for (index, spec) in config.filters.iter().enumerate() {
                let start = Instant::now();
                let rows = table.row_count();
                let frame = filter_rows(&table.data, spec)?;
                let label = spec.display_label(index);
                debug!(
                    label = %label,
                    kept = frame.height(),
                    duration_ms = start.elapsed().as_millis(),
                    "filter view captured"
                );
                outcome.stages.push(StageSummary::record(
                    StageKind::Filter,
                    label.clone(),
                    rows,
                    frame.height(),
                    0,
                    start,
                ));
                outcome.views.push(ViewResult {
                    label,
                    kind: ViewKind::Filter,
                    frame,
                });
            }
            Ok(())
        })?;
    }

    if !config.selections.is_empty() {
        info_span!("select").in_scope(|| -> Result<()> {
            for (index, spec) in config.selections.iter().enumerate() {
                let start = Instant::now();
                let rows = table.row_count();
                let frame = select_view(&table.data, spec)?;
                let label = spec.display_label(index);
                debug!(
                    label = %label,
                    rows = frame.height(),
                    columns = frame.width(),
                    duration_ms = start.elapsed().as_millis(),
                    "selection view captured"
                );
                outcome.stages.push(StageSummary::record(
                    StageKind::Select,
                    label.clone(),
                    rows,
                    frame.height(),
                    0,
                    start,
                ));
                outcome.views.push(ViewResult {
                    label,
                    kind: ViewKind::Select,
                    frame,
                });
            }
            Ok(())
        })?;
    }

    if !config.aggregations.is_empty() {
        info_span!("aggregate").in_scope(|| -> Result<()> {
            for spec in &config.aggregations {
                let start = Instant::now();
                let rows = table.row_count();
                let groups = group_aggregate(&table.data, spec)?;
                let label = spec.display_label();
                debug!(
                    label = %label,
                    groups = groups.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "aggregation computed"
                );
                outcome.stages.push(StageSummary::record(
                    StageKind::Aggregate,
                    label.clone(),
                    rows,
                    rows,
                    0,
                    start,
                ));
                outcome.aggregations.push(AggregationResult {
                    label,
                    group_by: spec.group_by.clone(),
                    target: spec.target.clone(),
                    reduction: spec.reduction,
                    rows: groups
                        .into_iter()
                        .map(|(key, value)| AggregateRow {
                            group: key.label(),
                            value,
                        })
                        .collect(),
                });
            }
            Ok(())
        })?;
    }

    if !config.missing.is_empty() {
        info_span!("missing").in_scope(|| -> Result<()> {
            for policy in &config.missing {
                let start = Instant::now();
                let rows = table.row_count();
                let applied = apply_missing_policy(&mut table.data, policy)?;
                debug!(
                    policy = policy.display_name(),
                    cells_filled = applied.cells_filled,
                    rows_dropped = applied.rows_dropped,
                    duration_ms = start.elapsed().as_millis(),
                    "missing policy applied"
                );
                outcome.stages.push(StageSummary::record(
                    StageKind::Missing,
                    policy.display_name(),
                    rows,
                    table.row_count(),
                    applied.cells_filled,
                    start,
                ));
            }
            Ok(())
        })?;
    }

    if !config.derives.is_empty() {
        info_span!("derive").in_scope(|| -> Result<()> {
            for spec in &config.derives {
                let start = Instant::now();
                let rows = table.row_count();
                let written = derive_column(&mut table.data, spec)?;
                debug!(
                    column = %spec.name,
                    op = spec.op.symbol(),
                    written,
                    duration_ms = start.elapsed().as_millis(),
                    "column derived"
                );
                outcome.stages.push(StageSummary::record(
                    StageKind::Derive,
                    spec.name.clone(),
                    rows,
                    table.row_count(),
                    written,
                    start,
                ));
            }
            Ok(())
        })?;
    }

    if !config.normalize.is_empty() {
        info_span!("normalize").in_scope(|| -> Result<()> {
            for spec in &config.normalize {
                let start = Instant::now();
                let rows = table.row_count();
                let written = normalize_min_max(&mut table.data, spec)?;
                debug!(
                    column = %spec.column,
                    output = %spec.output_name(),
                    written,
                    duration_ms = start.elapsed().as_millis(),
                    "column normalized"
                );
                outcome.stages.push(StageSummary::record(
                    StageKind::Normalize,
                    spec.output_name(),
                    rows,
                    table.row_count(),
                    written,
                    start,
                ));
            }
            Ok(())
        })?;
    }

    if !config.joins.is_empty() {
        info_span!("join").in_scope(|| -> Result<()> {
            for spec in &config.joins {
                let start = Instant::now();
                let rows = table.row_count();
                let (joined, matched) = match &spec.source {
                    Some(path) => {
                        let right = build_table(&read_table_file(path, ingest)?)?;
                        attach_columns(&table.data, &right.data, spec)?
                    }
                    None => attach_columns(&table.data, &table.data, spec)?,
                };
                table.data = joined;
                let detail = match &spec.source {
                    Some(path) => format!("join {} on {}", path.display(), spec.key),
                    None => format!("self join on {}", spec.key),
                };
                debug!(
                    key = %spec.key,
                    matched,
                    attached = spec.extra_columns.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "columns attached"
                );
                outcome.stages.push(StageSummary::record(
                    StageKind::Join,
                    detail,
                    rows,
                    table.row_count(),
                    matched * spec.extra_columns.len(),
                    start,
                ));
            }
            Ok(())
        })?;
    }

    if let Some(spec) = &config.stats {
        info_span!("stats").in_scope(|| -> Result<()> {
            let start = Instant::now();
            let rows = table.row_count();
            outcome.summaries = summarize_columns(&table.data, spec)?;
            if spec.correlations {
                outcome.correlations = Some(correlation_matrix(&table.data, spec)?);
            }
            let detail = if spec.correlations {
                "summaries + correlations"
            } else {
                "summaries"
            };
            debug!(
                columns = outcome.summaries.len(),
                duration_ms = start.elapsed().as_millis(),
                "statistics computed"
            );
            outcome.stages.push(StageSummary::record(
                StageKind::Stats,
                detail,
                rows,
                rows,
                0,
                start,
            ));
            Ok(())
        })?;
    }

    info!(
        steps = outcome.stages.len(),
        rows = table.row_count(),
        columns = table.column_count(),
        "pipeline complete"
    );
    Ok(outcome)
}
