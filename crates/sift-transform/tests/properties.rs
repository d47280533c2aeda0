//! Property tests for the numeric stage invariants.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;

use sift_model::{Coercion, NormalizeSpec};
use sift_transform::data_utils::numeric_column_f64;
use sift_transform::missing::{drop_sparse_rows, fill_missing_with_mean};
use sift_transform::{coerce_column, normalize_min_max};

fn frame(name: &str, values: Vec<Option<f64>>) -> DataFrame {
    DataFrame::new(vec![Series::new(name.into(), values).into_column()]).unwrap()
}

proptest! {
    #[test]
    fn normalized_cells_stay_in_the_unit_interval(
        values in prop::collection::vec(prop::option::of(-1e6f64..1e6f64), 1..40)
    ) {
        let mut df = frame("v", values.clone());
        normalize_min_max(&mut df, &NormalizeSpec::new("v")).unwrap();
        let norm = numeric_column_f64(&df, "v_norm").unwrap();
        for (cell, original) in norm.iter().zip(&values) {
            match (cell, original) {
                (Some(value), Some(_)) => prop_assert!((0.0..=1.0).contains(value)),
                (None, None) => {}
                _ => prop_assert!(false, "missingness changed"),
            }
        }
    }

    #[test]
    fn mean_fill_is_idempotent(
        values in prop::collection::vec(prop::option::of(-1e3f64..1e3f64), 1..40)
    ) {
        let mut df = frame("v", values);
        fill_missing_with_mean(&mut df, &[]).unwrap();
        let filled_again = fill_missing_with_mean(&mut df, &[]).unwrap();
        prop_assert_eq!(filled_again, 0);
    }

    #[test]
    fn sparse_drop_keeps_exactly_the_rows_at_or_above_the_threshold(
        rows in prop::collection::vec(
            (prop::option::of(-10f64..10.0), prop::option::of(-10f64..10.0)),
            0..30,
        ),
        threshold in 0f64..=1.0
    ) {
        let expected = rows
            .iter()
            .filter(|(a, b)| {
                let present = usize::from(a.is_some()) + usize::from(b.is_some());
                present as f64 / 2.0 >= threshold
            })
            .count();

        let a: Vec<Option<f64>> = rows.iter().map(|(a, _)| *a).collect();
        let b: Vec<Option<f64>> = rows.iter().map(|(_, b)| *b).collect();
        let mut df = DataFrame::new(vec![
            Series::new("a".into(), a).into_column(),
            Series::new("b".into(), b).into_column(),
        ])
        .unwrap();
        drop_sparse_rows(&mut df, threshold).unwrap();
        prop_assert_eq!(df.height(), expected);
    }

    #[test]
    fn numeric_coercion_is_stable(
        cells in prop::collection::vec(prop::option::of("[a-z0-9.]{1,6}"), 1..30)
    ) {
        let mut df =
            DataFrame::new(vec![Series::new("v".into(), cells).into_column()]).unwrap();
        coerce_column(&mut df, "v", &Coercion::NumericParse).unwrap();
        let lost_again = coerce_column(&mut df, "v", &Coercion::NumericParse).unwrap();
        prop_assert_eq!(lost_again, 0);
    }
}
