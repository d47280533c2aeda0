//! Descriptive statistics over numeric columns.
//!
//! These are read-only summaries for the run report and terminal output:
//! per-column descriptive measures and an optional pairwise Pearson
//! correlation matrix.

use anyhow::Result;
use polars::prelude::DataFrame;
use serde::Serialize;

use sift_model::StatsSpec;

use crate::data_utils::{column_lookup, numeric_column_f64, numeric_column_names};

/// Descriptive measures for one column. Measures over zero present cells
/// are `None`; the standard deviation is the sample one and needs at
/// least two present cells.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

/// Pairwise Pearson correlations. Row-major over `columns`; a cell is
/// `None` when its pair has fewer than two complete rows or a
/// zero-variance side.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn summarize_column(df: &DataFrame, column: &str) -> Result<ColumnSummary> {
    let values = numeric_column_f64(df, column)?;
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    let count = present.len();
    let missing = values.len() - count;
    if count == 0 {
        return Ok(ColumnSummary {
            column: column.to_string(),
            count,
            missing,
            mean: None,
            std_dev: None,
            min: None,
            max: None,
            median: None,
        });
    }
    let mean = present.iter().sum::<f64>() / count as f64;
    let std_dev = if count < 2 {
        None
    } else {
        let variance = present
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / (count - 1) as f64;
        Some(variance.sqrt())
    };
    present.sort_by(f64::total_cmp);
    Ok(ColumnSummary {
        column: column.to_string(),
        count,
        missing,
        mean: Some(mean),
        std_dev,
        min: present.first().copied(),
        max: present.last().copied(),
        median: Some(median_of_sorted(&present)),
    })
}

fn stat_columns(df: &DataFrame, spec: &StatsSpec) -> Result<Vec<String>> {
    if spec.columns.is_empty() {
        return Ok(numeric_column_names(df));
    }
    let lookup = column_lookup(df);
    let mut resolved = Vec::with_capacity(spec.columns.len());
    for name in &spec.columns {
        resolved.push(lookup.resolve(name)?);
    }
    Ok(resolved)
}

/// Summaries for the requested columns (all numeric columns when the
/// spec names none).
pub fn summarize_columns(df: &DataFrame, spec: &StatsSpec) -> Result<Vec<ColumnSummary>> {
    stat_columns(df, spec)?
        .iter()
        .map(|column| summarize_column(df, column))
        .collect()
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}

/// Pairwise-complete Pearson correlations between the requested columns.
pub fn correlation_matrix(df: &DataFrame, spec: &StatsSpec) -> Result<CorrelationMatrix> {
    let columns = stat_columns(df, spec)?;
    let mut series = Vec::with_capacity(columns.len());
    for column in &columns {
        series.push(numeric_column_f64(df, column)?);
    }
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix { columns, values })
}
