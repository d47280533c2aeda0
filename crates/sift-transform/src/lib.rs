//! Table transformation stages.
//!
//! This crate owns the in-memory table and every stage that can run
//! against it:
//!
//! - **frame**: the owned [`Table`] built from a loaded raw table
//! - **coerce**: cell-level numeric coercion and token remapping
//! - **filter** / **select**: reported row views off the main table
//! - **aggregate**: grouped reductions (mean, distinct count, frequency)
//! - **missing**: mean imputation and sparse-row dropping
//! - **derive** / **normalize** / **join**: column-adding stages
//! - **stats**: descriptive summaries and correlations
//! - **pipeline**: config validation and staged execution

pub mod aggregate;
pub mod coerce;
pub mod data_utils;
pub mod derive;
pub mod filter;
pub mod frame;
pub mod join;
pub mod missing;
pub mod normalize;
pub mod pipeline;
pub mod select;
pub mod stats;

// Re-export the stage entry points and result types for external use
pub use aggregate::{AggregateValue, GroupKey, group_aggregate};
pub use coerce::coerce_column;
pub use derive::derive_column;
pub use filter::filter_rows;
pub use frame::{Table, TableMeta, build_table, derive_table_name};
pub use join::{MERGE_SUFFIX, attach_columns};
pub use missing::{
    MissingOutcome, apply_missing_policy, drop_missing_in, drop_sparse_rows,
    fill_missing_with_mean,
};
pub use normalize::normalize_min_max;
pub use pipeline::{
    AggregateRow, AggregationResult, PipelineOutcome, StageKind, StageSummary, ViewKind,
    ViewResult, run_pipeline, validate_config,
};
pub use select::select_view;
pub use stats::{
    ColumnSummary, CorrelationMatrix, correlation_matrix, summarize_column, summarize_columns,
};
