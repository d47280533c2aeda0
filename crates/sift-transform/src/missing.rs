//! Missing-value policies.
//!
//! Policies are the first stages allowed to mutate row count or cell
//! contents after coercion. Each runs against the table state its
//! predecessor left behind, in config order.

use anyhow::Result;
use polars::prelude::{AnyValue, DataFrame};
use tracing::{debug, warn};

use sift_model::MissingPolicy;

use crate::data_utils::{
    apply_row_mask, column_lookup, is_numeric_column, numeric_column_f64, numeric_column_names,
    set_f64_column,
};

/// What one policy application did to the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissingOutcome {
    pub cells_filled: usize,
    pub rows_dropped: usize,
}

/// Replace missing cells with the column mean over present cells.
///
/// An empty `columns` slice means every numeric column. A column whose
/// cells are all missing has no mean and is left untouched; running the
/// fill twice changes nothing the second time. Named columns that are
/// not numeric are skipped with a warning rather than failing the run.
pub fn fill_missing_with_mean(df: &mut DataFrame, columns: &[String]) -> Result<usize> {
    let lookup = column_lookup(df);
    let targets: Vec<String> = if columns.is_empty() {
        numeric_column_names(df)
    } else {
        let mut resolved = Vec::with_capacity(columns.len());
        for name in columns {
            resolved.push(lookup.resolve(name)?);
        }
        resolved
    };

    let mut filled_total = 0usize;
    for column in &targets {
        if !is_numeric_column(df, column) {
            warn!(column, "fill_mean skipped non-numeric column");
            continue;
        }
        let values = numeric_column_f64(df, column)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            // no mean to fill from; explicit no-op
            continue;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        let mut filled = 0usize;
        let replaced: Vec<Option<f64>> = values
            .into_iter()
            .map(|value| {
                if value.is_none() {
                    filled += 1;
                }
                value.or(Some(mean))
            })
            .collect();
        if filled > 0 {
            set_f64_column(df, column, replaced)?;
        }
        filled_total += filled;
    }
    debug!(filled = filled_total, "filled missing cells with column means");
    Ok(filled_total)
}

/// Drop rows whose present-cell fraction falls below the threshold.
/// A row at exactly the threshold is kept.
pub fn drop_sparse_rows(df: &mut DataFrame, min_present_fraction: f64) -> Result<usize> {
    let height = df.height();
    let width = df.width();
    if height == 0 || width == 0 {
        return Ok(0);
    }
    let columns = df.get_columns().to_vec();
    let mut keep = Vec::with_capacity(height);
    let mut dropped = 0usize;
    for idx in 0..height {
        let present = columns
            .iter()
            .filter(|column| {
                !matches!(column.get(idx).unwrap_or(AnyValue::Null), AnyValue::Null)
            })
            .count();
        let fraction = present as f64 / width as f64;
        let keep_row = fraction >= min_present_fraction;
        if !keep_row {
            dropped += 1;
        }
        keep.push(keep_row);
    }
    if dropped > 0 {
        apply_row_mask(df, &keep)?;
    }
    debug!(dropped, "dropped sparse rows");
    Ok(dropped)
}

/// Drop rows missing a value in any of the named columns.
pub fn drop_missing_in(df: &mut DataFrame, columns: &[String]) -> Result<usize> {
    if columns.is_empty() || df.height() == 0 {
        return Ok(0);
    }
    let lookup = column_lookup(df);
    let mut resolved = Vec::with_capacity(columns.len());
    for name in columns {
        resolved.push(lookup.resolve(name)?);
    }
    let height = df.height();
    let mut keep = vec![true; height];
    for column in &resolved {
        let series = df.column(column)?;
        for (idx, flag) in keep.iter_mut().enumerate() {
            if matches!(series.get(idx).unwrap_or(AnyValue::Null), AnyValue::Null) {
                *flag = false;
            }
        }
    }
    let dropped = keep.iter().filter(|flag| !**flag).count();
    if dropped > 0 {
        apply_row_mask(df, &keep)?;
    }
    debug!(dropped, columns = resolved.len(), "dropped rows with missing required cells");
    Ok(dropped)
}

/// Run one policy and report what it changed.
pub fn apply_missing_policy(df: &mut DataFrame, policy: &MissingPolicy) -> Result<MissingOutcome> {
    match policy {
        MissingPolicy::Leave => Ok(MissingOutcome::default()),
        MissingPolicy::FillMean { columns } => Ok(MissingOutcome {
            cells_filled: fill_missing_with_mean(df, columns)?,
            rows_dropped: 0,
        }),
        MissingPolicy::DropSparseRows {
            min_present_fraction,
        } => Ok(MissingOutcome {
            cells_filled: 0,
            rows_dropped: drop_sparse_rows(df, *min_present_fraction)?,
        }),
        MissingPolicy::DropMissingIn { columns } => Ok(MissingOutcome {
            cells_filled: 0,
            rows_dropped: drop_missing_in(df, columns)?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    use crate::data_utils::numeric_column_f64;

    fn two_column_df(a: Vec<Option<f64>>, b: Vec<Option<f64>>) -> DataFrame {
        let cols: Vec<Column> = vec![
            Series::new("a".into(), a).into_column(),
            Series::new("b".into(), b).into_column(),
        ];
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn fill_mean_is_idempotent() {
        let mut df = two_column_df(
            vec![Some(1.0), None, Some(3.0)],
            vec![None, Some(10.0), Some(20.0)],
        );
        let filled = fill_missing_with_mean(&mut df, &[]).unwrap();
        assert_eq!(filled, 2);
        assert_eq!(
            numeric_column_f64(&df, "a").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
        assert_eq!(
            numeric_column_f64(&df, "b").unwrap(),
            vec![Some(15.0), Some(10.0), Some(20.0)]
        );

        let again = fill_missing_with_mean(&mut df, &[]).unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn fill_mean_leaves_all_missing_columns_alone() {
        let mut df = two_column_df(vec![None, None], vec![Some(1.0), Some(2.0)]);
        let filled = fill_missing_with_mean(&mut df, &[]).unwrap();
        assert_eq!(filled, 0);
        assert_eq!(numeric_column_f64(&df, "a").unwrap(), vec![None, None]);
    }

    #[test]
    fn fill_mean_skips_named_text_columns() {
        let cols: Vec<Column> = vec![
            Series::new("city".into(), vec![Some("a"), None]).into_column(),
            Series::new("score".into(), vec![Some(2.0), None]).into_column(),
        ];
        let mut df = DataFrame::new(cols).unwrap();
        let filled =
            fill_missing_with_mean(&mut df, &["city".to_string(), "score".to_string()]).unwrap();
        assert_eq!(filled, 1);
        // the text column still has its null
        assert_eq!(df.column("city").unwrap().null_count(), 1);
    }

    #[test]
    fn sparse_rows_at_the_boundary_are_kept() {
        // row 2 is half present: at threshold 0.5 it stays
        let mut df = two_column_df(
            vec![Some(1.0), None, Some(3.0)],
            vec![Some(2.0), Some(4.0), Some(4.0)],
        );
        let dropped = drop_sparse_rows(&mut df, 0.5).unwrap();
        assert_eq!(dropped, 0);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn fully_missing_rows_are_dropped() {
        let mut df = two_column_df(
            vec![Some(1.0), None, Some(3.0)],
            vec![Some(2.0), None, Some(4.0)],
        );
        let dropped = drop_sparse_rows(&mut df, 0.5).unwrap();
        assert_eq!(dropped, 1);
        assert_eq!(df.height(), 2);
        assert_eq!(
            numeric_column_f64(&df, "a").unwrap(),
            vec![Some(1.0), Some(3.0)]
        );
    }

    #[test]
    fn threshold_zero_keeps_everything() {
        let mut df = two_column_df(vec![None, None], vec![None, Some(1.0)]);
        let dropped = drop_sparse_rows(&mut df, 0.0).unwrap();
        assert_eq!(dropped, 0);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn drop_missing_in_requires_all_named_cells() {
        let cols: Vec<Column> = vec![
            Series::new("gpa".into(), vec![Some(3.2), None, Some(2.8)]).into_column(),
            Series::new("study_time".into(), vec![Some(10.0), Some(5.0), None]).into_column(),
            Series::new("note".into(), Vec::<Option<f64>>::from([None, None, None])).into_column(),
        ];
        let mut df = DataFrame::new(cols).unwrap();
        let dropped =
            drop_missing_in(&mut df, &["gpa".to_string(), "study_time".to_string()]).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn empty_table_policies_are_noops() {
        let mut df = DataFrame::empty();
        assert_eq!(drop_sparse_rows(&mut df, 0.9).unwrap(), 0);
        assert_eq!(fill_missing_with_mean(&mut df, &[]).unwrap(), 0);
    }
}
