//! Positional row-slice views with column projection.

use anyhow::Result;
use polars::prelude::DataFrame;

use sift_model::SelectSpec;

use crate::data_utils::column_lookup;

/// Take rows `start..end` projected to the named columns, in spec order.
///
/// The range clamps to the table height: a slice past the end is an
/// empty view, not an error. Unknown columns are an error.
pub fn select_view(df: &DataFrame, spec: &SelectSpec) -> Result<DataFrame> {
    let lookup = column_lookup(df);
    let mut columns = Vec::with_capacity(spec.columns.len());
    for name in &spec.columns {
        columns.push(lookup.resolve(name)?);
    }
    let height = df.height();
    let start = spec.start.min(height);
    let end = spec.end.min(height).max(start);
    let sliced = df.slice(start as i64, end - start);
    let out = sliced.select(columns.iter().map(String::as_str))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    fn test_df() -> DataFrame {
        let ids: Vec<Option<f64>> = (1..=20).map(|v| Some(f64::from(v))).collect();
        let cities: Vec<Option<String>> =
            (1..=20).map(|v| Some(format!("city_{v}"))).collect();
        let cols: Vec<Column> = vec![
            Series::new("enrollee_id".into(), ids).into_column(),
            Series::new("city".into(), cities).into_column(),
        ];
        DataFrame::new(cols).unwrap()
    }

    fn spec(start: usize, end: usize, columns: Vec<&str>) -> SelectSpec {
        SelectSpec {
            label: None,
            start,
            end,
            columns: columns.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn head_slice_in_requested_column_order() {
        let out = select_view(&test_df(), &spec(0, 10, vec!["city", "enrollee_id"])).unwrap();
        assert_eq!(out.height(), 10);
        let names: Vec<String> = out
            .get_column_names_owned()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, vec!["city", "enrollee_id"]);
    }

    #[test]
    fn out_of_range_slice_is_empty() {
        let out = select_view(&test_df(), &spec(100, 110, vec!["city"])).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.width(), 1);
    }

    #[test]
    fn range_clamps_to_table_height() {
        let out = select_view(&test_df(), &spec(15, 99, vec!["enrollee_id"])).unwrap();
        assert_eq!(out.height(), 5);
    }

    #[test]
    fn inverted_range_is_empty() {
        let out = select_view(&test_df(), &spec(8, 3, vec!["city"])).unwrap();
        assert_eq!(out.height(), 0);
    }

    #[test]
    fn unknown_column_is_an_error() {
        assert!(select_view(&test_df(), &spec(0, 5, vec!["salary"])).is_err());
    }
}
