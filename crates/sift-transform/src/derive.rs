//! Derived columns from row-wise arithmetic.

use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::debug;

use sift_model::{ArithOp, CaseInsensitiveSet, DeriveSpec, Operand};

use crate::data_utils::{column_lookup, numeric_column_f64, set_f64_column};

fn operand_values(
    df: &DataFrame,
    lookup: &CaseInsensitiveSet,
    operand: &Operand,
) -> Result<Vec<Option<f64>>> {
    match operand {
        Operand::Number(value) => Ok(vec![Some(*value); df.height()]),
        Operand::Column(name) => numeric_column_f64(df, &lookup.resolve(name)?),
    }
}

fn apply_arith(op: ArithOp, left: f64, right: f64) -> Option<f64> {
    let value = match op {
        ArithOp::Add => left + right,
        ArithOp::Sub => left - right,
        ArithOp::Mul => left * right,
        ArithOp::Div => {
            if right == 0.0 {
                return None;
            }
            left / right
        }
    };
    value.is_finite().then_some(value)
}

/// Add (or replace) a column computed cell-by-cell from two operands.
///
/// A missing operand cell yields a missing result; so do division by
/// zero and overflow. Returns the number of present result cells.
pub fn derive_column(df: &mut DataFrame, spec: &DeriveSpec) -> Result<usize> {
    let lookup = column_lookup(df);
    let left = operand_values(df, &lookup, &spec.left)?;
    let right = operand_values(df, &lookup, &spec.right)?;
    let mut values = Vec::with_capacity(df.height());
    let mut present = 0usize;
    for (l, r) in left.iter().zip(&right) {
        let value = match (l, r) {
            (Some(l), Some(r)) => apply_arith(spec.op, *l, *r),
            _ => None,
        };
        if value.is_some() {
            present += 1;
        }
        values.push(value);
    }
    set_f64_column(df, &spec.name, values)?;
    debug!(column = %spec.name, present, "derived column");
    Ok(present)
}
