//! Key-based column attachment.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::debug;

use sift_model::{JoinSpec, SiftError};

use crate::data_utils::{
    column_lookup, is_numeric_column, numeric_column_f64, opt_string_column,
};

/// Suffix applied when an attached column collides with an existing name.
pub const MERGE_SUFFIX: &str = "_merged";

/// Attach `extra_columns` from `right` onto `left` by key equality,
/// returning a new frame with exactly one row per left row.
///
/// Keys compare on their string form. A missing key on either side never
/// matches: left rows without a match carry missing cells in every
/// attached column. When several right rows share a key, the first one
/// supplies the values; in strict mode such a key is an error instead,
/// provided some left row actually uses it. Attached columns that
/// collide with an existing left column are renamed with
/// [`MERGE_SUFFIX`].
pub fn attach_columns(
    left: &DataFrame,
    right: &DataFrame,
    spec: &JoinSpec,
) -> Result<(DataFrame, usize)> {
    let left_lookup = column_lookup(left);
    let right_lookup = column_lookup(right);
    let left_key = left_lookup.resolve(&spec.key)?;
    let right_key = right_lookup.resolve(&spec.key)?;
    let mut extra = Vec::with_capacity(spec.extra_columns.len());
    for name in &spec.extra_columns {
        extra.push(right_lookup.resolve(name)?);
    }

    let left_keys = opt_string_column(left, &left_key)?;
    let right_keys = opt_string_column(right, &right_key)?;

    // first occurrence per key wins; counts back the strict check
    let mut first_row: BTreeMap<&str, usize> = BTreeMap::new();
    let mut key_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, key) in right_keys.iter().enumerate() {
        let Some(key) = key.as_deref() else { continue };
        first_row.entry(key).or_insert(idx);
        *key_counts.entry(key).or_insert(0) += 1;
    }

    if spec.strict {
        for key in left_keys.iter().flatten() {
            let matches = key_counts.get(key.as_str()).copied().unwrap_or(0);
            if matches > 1 {
                return Err(SiftError::AmbiguousJoin {
                    key: key.clone(),
                    matches,
                }
                .into());
            }
        }
    }

    let matched = left_keys
        .iter()
        .flatten()
        .filter(|key| first_row.contains_key(key.as_str()))
        .count();

    let mut out = left.clone();
    for column in &extra {
        let output_name = if left_lookup.contains(column) {
            format!("{column}{MERGE_SUFFIX}")
        } else {
            column.clone()
        };
        if is_numeric_column(right, column) {
            let source = numeric_column_f64(right, column)?;
            let values: Vec<Option<f64>> = left_keys
                .iter()
                .map(|key| {
                    key.as_deref()
                        .and_then(|k| first_row.get(k))
                        .and_then(|&idx| source[idx])
                })
                .collect();
            out.with_column(Series::new(output_name.into(), values))?;
        } else {
            let source = opt_string_column(right, column)?;
            let values: Vec<Option<String>> = left_keys
                .iter()
                .map(|key| {
                    key.as_deref()
                        .and_then(|k| first_row.get(k))
                        .and_then(|&idx| source[idx].clone())
                })
                .collect();
            out.with_column(Series::new(output_name.into(), values))?;
        }
    }
    debug!(
        matched,
        rows = out.height(),
        attached = extra.len(),
        "attached join columns"
    );
    Ok((out, matched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn};

    fn frame(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
        let cols: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| {
                Series::new(
                    name.into(),
                    values
                        .into_iter()
                        .map(|v| v.map(String::from))
                        .collect::<Vec<_>>(),
                )
                .into_column()
            })
            .collect();
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn self_join_keeps_one_row_per_left_row() {
        let df = frame(vec![
            ("id", vec![Some("1"), Some("2"), Some("1")]),
            ("score", vec![Some("10"), Some("20"), Some("30")]),
        ]);
        let spec = JoinSpec::self_join("id", vec!["score".to_string()]);
        let (out, matched) = attach_columns(&df, &df, &spec).unwrap();
        assert_eq!(out.height(), 3);
        assert_eq!(matched, 3);

        // collision renamed, first match wins for the duplicated key
        let merged = opt_string_column(&out, "score_merged").unwrap();
        assert_eq!(
            merged,
            vec![
                Some("10".to_string()),
                Some("20".to_string()),
                Some("10".to_string())
            ]
        );
    }

    #[test]
    fn unmatched_and_missing_keys_attach_nothing() {
        let left = frame(vec![("id", vec![Some("1"), Some("9"), None])]);
        let right = frame(vec![
            ("id", vec![Some("1"), None]),
            ("city", vec![Some("a"), Some("ghost")]),
        ]);
        let spec = JoinSpec::self_join("id", vec!["city".to_string()]);
        let (out, matched) = attach_columns(&left, &right, &spec).unwrap();
        assert_eq!(matched, 1);
        let cities = opt_string_column(&out, "city").unwrap();
        assert_eq!(cities, vec![Some("a".to_string()), None, None]);
    }

    #[test]
    fn strict_mode_rejects_ambiguous_keys() {
        let left = frame(vec![("id", vec![Some("7")])]);
        let right = frame(vec![
            ("id", vec![Some("7"), Some("7")]),
            ("v", vec![Some("x"), Some("y")]),
        ]);
        let mut spec = JoinSpec::self_join("id", vec!["v".to_string()]);
        spec.strict = true;
        let err = attach_columns(&left, &right, &spec).unwrap_err();
        let sift = err.downcast_ref::<SiftError>().expect("typed error");
        assert!(matches!(
            sift,
            SiftError::AmbiguousJoin { key, matches } if key == "7" && *matches == 2
        ));
    }

    #[test]
    fn strict_mode_ignores_unused_duplicate_keys() {
        let left = frame(vec![("id", vec![Some("1")])]);
        let right = frame(vec![
            ("id", vec![Some("1"), Some("7"), Some("7")]),
            ("v", vec![Some("a"), Some("x"), Some("y")]),
        ]);
        let mut spec = JoinSpec::self_join("id", vec!["v".to_string()]);
        spec.strict = true;
        let (out, matched) = attach_columns(&left, &right, &spec).unwrap();
        assert_eq!(matched, 1);
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn numeric_columns_attach_as_numbers() {
        let left = frame(vec![("id", vec![Some("1"), Some("2")])]);
        let right_cols: Vec<Column> = vec![
            Series::new(
                "id".into(),
                vec![Some("1".to_string()), Some("2".to_string())],
            )
            .into_column(),
            Series::new("score".into(), vec![Some(1.5), Some(2.5)]).into_column(),
        ];
        let right = DataFrame::new(right_cols).unwrap();
        let spec = JoinSpec::self_join("id", vec!["score".to_string()]);
        let (out, _) = attach_columns(&left, &right, &spec).unwrap();
        assert_eq!(
            numeric_column_f64(&out, "score").unwrap(),
            vec![Some(1.5), Some(2.5)]
        );
    }
}
