//! Grouped aggregation views.
//!
//! Aggregations read the table and produce an ordered map of group keys
//! to reduced values; the table itself never changes. A missing group key
//! forms its own group, sorted after every present key.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use anyhow::Result;
use polars::prelude::DataFrame;
use serde::{Serialize, Serializer};

use sift_ingest::format_numeric;
use sift_model::{AggregationSpec, Reduction};

use crate::data_utils::{
    column_lookup, is_numeric_column, numeric_column_f64, opt_string_column,
};

/// A group label. Numeric keys sort numerically, text keys after them
/// lexicographically, and the missing group last.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Number(f64),
    Text(String),
    Missing,
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            Self::Number(v) => format_numeric(*v),
            Self::Text(s) => s.clone(),
            Self::Missing => "<missing>".to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), _) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Text(_), Self::Missing) => Ordering::Less,
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Greater,
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A reduced group value. `Undefined` marks a mean over a group with no
/// present targets; it is reported as such, never as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateValue {
    Number(f64),
    Count(u64),
    Undefined,
}

impl AggregateValue {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(v),
            Self::Count(n) => Some(n as f64),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for AggregateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => f.write_str(&format_numeric(*v)),
            Self::Count(n) => write!(f, "{n}"),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

impl Serialize for AggregateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::Count(n) => serializer.serialize_u64(*n),
            Self::Undefined => serializer.serialize_none(),
        }
    }
}

fn group_keys(df: &DataFrame, column: &str) -> Result<Vec<GroupKey>> {
    if is_numeric_column(df, column) {
        Ok(numeric_column_f64(df, column)?
            .into_iter()
            .map(|value| value.map_or(GroupKey::Missing, GroupKey::Number))
            .collect())
    } else {
        Ok(opt_string_column(df, column)?
            .into_iter()
            .map(|value| value.map_or(GroupKey::Missing, GroupKey::Text))
            .collect())
    }
}

/// Reduce the target column per group of the key column.
///
/// Every reduction ignores missing targets: a mean averages the present
/// cells, `count_distinct` counts distinct present values, `frequency`
/// counts present cells. A group whose targets are all missing reduces
/// to [`AggregateValue::Undefined`] under `mean` and zero under the
/// counting reductions.
pub fn group_aggregate(
    df: &DataFrame,
    spec: &AggregationSpec,
) -> Result<BTreeMap<GroupKey, AggregateValue>> {
    let lookup = column_lookup(df);
    let group_column = lookup.resolve(&spec.group_by)?;
    let target_column = lookup.resolve(&spec.target)?;
    let keys = group_keys(df, &group_column)?;

    match spec.reduction {
        Reduction::Mean => {
            let targets = numeric_column_f64(df, &target_column)?;
            let mut acc: BTreeMap<GroupKey, (f64, u64)> = BTreeMap::new();
            for (key, value) in keys.into_iter().zip(&targets) {
                let entry = acc.entry(key).or_insert((0.0, 0));
                if let Some(v) = value {
                    entry.0 += v;
                    entry.1 += 1;
                }
            }
            Ok(acc
                .into_iter()
                .map(|(key, (sum, n))| {
                    let value = if n == 0 {
                        AggregateValue::Undefined
                    } else {
                        AggregateValue::Number(sum / n as f64)
                    };
                    (key, value)
                })
                .collect())
        }
        Reduction::CountDistinct => {
            let targets = opt_string_column(df, &target_column)?;
            let mut acc: BTreeMap<GroupKey, BTreeSet<String>> = BTreeMap::new();
            for (key, value) in keys.into_iter().zip(&targets) {
                let entry = acc.entry(key).or_default();
                if let Some(v) = value {
                    entry.insert(v.clone());
                }
            }
            Ok(acc
                .into_iter()
                .map(|(key, values)| (key, AggregateValue::Count(values.len() as u64)))
                .collect())
        }
        Reduction::Frequency => {
            let targets = opt_string_column(df, &target_column)?;
            let mut acc: BTreeMap<GroupKey, u64> = BTreeMap::new();
            for (key, value) in keys.into_iter().zip(&targets) {
                let entry = acc.entry(key).or_insert(0);
                if value.is_some() {
                    *entry += 1;
                }
            }
            Ok(acc
                .into_iter()
                .map(|(key, n)| (key, AggregateValue::Count(n)))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    fn test_df() -> DataFrame {
        let cols: Vec<Column> = vec![
            Series::new(
                "grade".into(),
                vec![Some("x"), Some("x"), Some("y"), None, Some("y")],
            )
            .into_column(),
            Series::new(
                "gpa".into(),
                vec![Some(1.0), Some(3.0), None, Some(2.5), None],
            )
            .into_column(),
        ];
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn mean_ignores_missing_and_marks_empty_groups_undefined() {
        let spec = AggregationSpec::new("grade", "gpa", Reduction::Mean);
        let result = group_aggregate(&test_df(), &spec).unwrap();

        assert_eq!(
            result.get(&GroupKey::Text("x".to_string())),
            Some(&AggregateValue::Number(2.0))
        );
        assert_eq!(
            result.get(&GroupKey::Text("y".to_string())),
            Some(&AggregateValue::Undefined)
        );
        // the missing key forms its own group
        assert_eq!(
            result.get(&GroupKey::Missing),
            Some(&AggregateValue::Number(2.5))
        );
    }

    #[test]
    fn frequency_counts_present_targets_per_group() {
        let spec = AggregationSpec::new("grade", "grade", Reduction::Frequency);
        let result = group_aggregate(&test_df(), &spec).unwrap();
        assert_eq!(
            result.get(&GroupKey::Text("x".to_string())),
            Some(&AggregateValue::Count(2))
        );
        assert_eq!(
            result.get(&GroupKey::Text("y".to_string())),
            Some(&AggregateValue::Count(2))
        );
        // the row whose key is missing has a missing target too
        assert_eq!(result.get(&GroupKey::Missing), Some(&AggregateValue::Count(0)));
    }

    #[test]
    fn count_distinct_counts_values_not_rows() {
        let cols: Vec<Column> = vec![
            Series::new("city".into(), vec![Some("a"), Some("a"), Some("a")]).into_column(),
            Series::new(
                "track".into(),
                vec![Some("stem"), Some("stem"), Some("arts")],
            )
            .into_column(),
        ];
        let df = DataFrame::new(cols).unwrap();
        let spec = AggregationSpec::new("city", "track", Reduction::CountDistinct);
        let result = group_aggregate(&df, &spec).unwrap();
        assert_eq!(
            result.get(&GroupKey::Text("a".to_string())),
            Some(&AggregateValue::Count(2))
        );
    }

    #[test]
    fn numeric_keys_sort_numerically_and_missing_last() {
        let cols: Vec<Column> = vec![
            Series::new(
                "size".into(),
                vec![Some(10.0), Some(2.0), None, Some(2.0)],
            )
            .into_column(),
            Series::new(
                "n".into(),
                vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0)],
            )
            .into_column(),
        ];
        let df = DataFrame::new(cols).unwrap();
        let spec = AggregationSpec::new("size", "n", Reduction::Frequency);
        let result = group_aggregate(&df, &spec).unwrap();
        let labels: Vec<String> = result.keys().map(GroupKey::label).collect();
        assert_eq!(labels, vec!["2", "10", "<missing>"]);
    }

    #[test]
    fn empty_table_aggregates_to_no_groups() {
        let cols: Vec<Column> = vec![
            Series::new("g".into(), Vec::<Option<String>>::new()).into_column(),
            Series::new("v".into(), Vec::<Option<f64>>::new()).into_column(),
        ];
        let df = DataFrame::new(cols).unwrap();
        let spec = AggregationSpec::new("g", "v", Reduction::Mean);
        let result = group_aggregate(&df, &spec).unwrap();
        assert!(result.is_empty());
    }
}
