//! Column access helpers shared by every operation.
//!
//! Cell reads go through `AnyValue` so an operation never cares whether a
//! column is still raw text or already coerced: strings parse on the fly,
//! numeric dtypes pass through, and nulls surface as `None`.

use anyhow::Result;
use polars::prelude::{
    AnyValue, BooleanChunked, DataFrame, DataType, NamedFrom, NewChunkedArray, Series,
};

use sift_ingest::{any_to_f64, any_to_opt_string};
use sift_model::CaseInsensitiveSet;

/// Case-insensitive resolver over the frame's current columns.
pub fn column_lookup(df: &DataFrame) -> CaseInsensitiveSet {
    CaseInsensitiveSet::new(df.get_column_names_owned())
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// All cells of a column in string form; missing cells are `None`.
pub fn opt_string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_opt_string(series.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// All cells of a column as finite numbers; missing and non-numeric
/// cells are `None`.
pub fn numeric_column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = series.get(idx).unwrap_or(AnyValue::Null);
        values.push(any_to_f64(value));
    }
    Ok(values)
}

pub fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

pub fn set_opt_string_column(
    df: &mut DataFrame,
    name: &str,
    values: Vec<Option<String>>,
) -> Result<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

/// Keep only rows flagged `true`.
pub fn apply_row_mask(df: &mut DataFrame, keep: &[bool]) -> Result<()> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    *df = df.filter(&mask)?;
    Ok(())
}

fn dtype_is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// True when the column holds a numeric dtype (not numeric-looking text).
pub fn is_numeric_column(df: &DataFrame, name: &str) -> bool {
    df.column(name)
        .map(|column| dtype_is_numeric(column.dtype()))
        .unwrap_or(false)
}

/// Names of all numerically-typed columns, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| dtype_is_numeric(column.dtype()))
        .map(|column| column.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn};

    fn test_df() -> DataFrame {
        let cols: Vec<Column> = vec![
            Series::new("city".into(), vec![Some("a"), None, Some("b")]).into_column(),
            Series::new("score".into(), vec![Some(1.0), Some(2.0), None]).into_column(),
        ];
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn reads_distinguish_null_from_value() {
        let df = test_df();
        let cities = opt_string_column(&df, "city").unwrap();
        assert_eq!(cities[0].as_deref(), Some("a"));
        assert_eq!(cities[1], None);

        let scores = numeric_column_f64(&df, "score").unwrap();
        assert_eq!(scores, vec![Some(1.0), Some(2.0), None]);
    }

    #[test]
    fn numeric_columns_are_dtype_based() {
        let df = test_df();
        assert!(is_numeric_column(&df, "score"));
        assert!(!is_numeric_column(&df, "city"));
        assert!(!is_numeric_column(&df, "absent"));
        assert_eq!(numeric_column_names(&df), vec!["score"]);
    }

    #[test]
    fn row_mask_drops_rows() {
        let mut df = test_df();
        apply_row_mask(&mut df, &[true, false, true]).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn string_parse_through_numeric_read() {
        let cols: Vec<Column> =
            vec![Series::new("raw".into(), vec![Some("12"), Some("never"), None]).into_column()];
        let df = DataFrame::new(cols).unwrap();
        let values = numeric_column_f64(&df, "raw").unwrap();
        assert_eq!(values, vec![Some(12.0), None, None]);
    }
}
