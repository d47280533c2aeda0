//! Column type coercion.
//!
//! Coercion is the only stage that changes a column's dtype: afterwards
//! the column is Float64 and every cell is either a finite number or
//! null. Cell-level failures never abort the run; a token that cannot be
//! converted simply becomes null.

use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::debug;

use sift_ingest::parse_f64;
use sift_model::Coercion;

use crate::data_utils::{opt_string_column, set_f64_column};

/// Apply one coercion rule to a column (already resolved to its exact
/// name). Returns how many present cells came out missing.
///
/// Remap tokens compare case-sensitively and exactly, so `">4"` and `>4`
/// are different tokens; anything the map does not cover falls through to
/// the numeric parse.
pub fn coerce_column(df: &mut DataFrame, column: &str, rule: &Coercion) -> Result<usize> {
    let map = match rule {
        Coercion::Passthrough => return Ok(0),
        Coercion::NumericParse => None,
        Coercion::Remap { map } => Some(map),
    };
    let raw = opt_string_column(df, column)?;
    let mut values: Vec<Option<f64>> = Vec::with_capacity(raw.len());
    let mut lost = 0usize;
    for cell in &raw {
        let parsed = cell.as_deref().and_then(|token| {
            map.and_then(|m| m.get(token).copied())
                .or_else(|| parse_f64(token))
        });
        if cell.is_some() && parsed.is_none() {
            lost += 1;
        }
        values.push(parsed);
    }
    set_f64_column(df, column, values)?;
    debug!(column, lost, "coerced column");
    Ok(lost)
}
