//! Min-max normalization.

use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::{debug, warn};

use sift_model::NormalizeSpec;

use crate::data_utils::{column_lookup, has_column, numeric_column_f64, set_f64_column};

/// Add `<column>_norm` scaling the source into [0, 1].
///
/// Missing cells stay missing. When every present value is identical the
/// scale is degenerate and every present cell maps to 0.0; an all-missing
/// source yields an all-missing output. Returns the number of present
/// output cells.
pub fn normalize_min_max(df: &mut DataFrame, spec: &NormalizeSpec) -> Result<usize> {
    let lookup = column_lookup(df);
    let column = lookup.resolve(&spec.column)?;
    let output = spec.output_name();
    if has_column(df, &output) {
        warn!(column = %output, "normalization output replaces an existing column");
    }

    let values = numeric_column_f64(df, &column)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        let height = values.len();
        set_f64_column(df, &output, vec![None; height])?;
        debug!(column = %column, output = %output, "normalized all-missing column");
        return Ok(0);
    }

    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let mut written = 0usize;
    let scaled: Vec<Option<f64>> = values
        .into_iter()
        .map(|value| {
            value.map(|v| {
                written += 1;
                if range == 0.0 { 0.0 } else { (v - min) / range }
            })
        })
        .collect();
    set_f64_column(df, &output, scaled)?;
    debug!(column = %column, output = %output, written, "normalized column");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    use crate::data_utils::numeric_column_f64;

    fn df_with(values: Vec<Option<f64>>) -> DataFrame {
        let cols: Vec<Column> = vec![Series::new("cdi".into(), values).into_column()];
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn scales_into_unit_range() {
        let mut df = df_with(vec![Some(0.5), Some(0.75), Some(1.0), None]);
        let written = normalize_min_max(&mut df, &NormalizeSpec::new("cdi")).unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            numeric_column_f64(&df, "cdi_norm").unwrap(),
            vec![Some(0.0), Some(0.5), Some(1.0), None]
        );
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let mut df = df_with(vec![Some(2.0), Some(2.0), None]);
        normalize_min_max(&mut df, &NormalizeSpec::new("cdi")).unwrap();
        assert_eq!(
            numeric_column_f64(&df, "cdi_norm").unwrap(),
            vec![Some(0.0), Some(0.0), None]
        );
    }

    #[test]
    fn single_value_is_degenerate_too() {
        let mut df = df_with(vec![Some(7.0)]);
        normalize_min_max(&mut df, &NormalizeSpec::new("cdi")).unwrap();
        assert_eq!(
            numeric_column_f64(&df, "cdi_norm").unwrap(),
            vec![Some(0.0)]
        );
    }

    #[test]
    fn all_missing_source_gives_all_missing_output() {
        let mut df = df_with(vec![None, None]);
        let written = normalize_min_max(&mut df, &NormalizeSpec::new("cdi")).unwrap();
        assert_eq!(written, 0);
        assert_eq!(
            numeric_column_f64(&df, "cdi_norm").unwrap(),
            vec![None, None]
        );
    }

    #[test]
    fn source_column_is_left_as_is() {
        let mut df = df_with(vec![Some(0.5), Some(1.0)]);
        normalize_min_max(&mut df, &NormalizeSpec::new("cdi")).unwrap();
        assert_eq!(
            numeric_column_f64(&df, "cdi").unwrap(),
            vec![Some(0.5), Some(1.0)]
        );
    }
}
