//! Row-filter views.

use anyhow::Result;
use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use tracing::debug;

use sift_model::{CmpOp, FilterSpec, Literal};

use crate::data_utils::{column_lookup, numeric_column_f64, opt_string_column};

fn compare_f64(op: CmpOp, left: f64, right: f64) -> bool {
    match op {
        CmpOp::Eq => left == right,
        CmpOp::Ne => left != right,
        CmpOp::Lt => left < right,
        CmpOp::Le => left <= right,
        CmpOp::Gt => left > right,
        CmpOp::Ge => left >= right,
    }
}

fn compare_str(op: CmpOp, left: &str, right: &str) -> bool {
    match op {
        CmpOp::Eq => left == right,
        CmpOp::Ne => left != right,
        CmpOp::Lt => left < right,
        CmpOp::Le => left <= right,
        CmpOp::Gt => left > right,
        CmpOp::Ge => left >= right,
    }
}

/// Evaluate a filter into a new frame; the source frame is untouched.
///
/// A row with a missing cell in any compared column fails the predicate,
/// `ne` included. Numeric literals compare numerically, with cells that
/// do not read as numbers failing the comparison; text literals compare
/// on the cell's string form, ordered operators lexicographically.
pub fn filter_rows(df: &DataFrame, spec: &FilterSpec) -> Result<DataFrame> {
    let lookup = column_lookup(df);
    let mut keep = vec![true; df.height()];
    for condition in &spec.conditions {
        let column = lookup.resolve(&condition.column)?;
        match &condition.value {
            Literal::Number(target) => {
                let values = numeric_column_f64(df, &column)?;
                for (flag, value) in keep.iter_mut().zip(&values) {
                    *flag = *flag
                        && value
                            .map(|v| compare_f64(condition.op, v, *target))
                            .unwrap_or(false);
                }
            }
            Literal::Text(target) => {
                let values = opt_string_column(df, &column)?;
                for (flag, value) in keep.iter_mut().zip(&values) {
                    *flag = *flag
                        && value
                            .as_deref()
                            .map(|v| compare_str(condition.op, v, target))
                            .unwrap_or(false);
                }
            }
        }
    }
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let out = df.filter(&mask)?;
    debug!(kept = out.height(), total = df.height(), "filtered rows");
    Ok(out)
}
