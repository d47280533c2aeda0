//! Raw table representation shared by every input format.
//!
//! A [`RawTable`] is headers plus string rows, exactly as read: cell typing
//! happens later in the pipeline, never here. Reading only normalizes the
//! text (trims, strips the UTF-8 BOM, collapses whitespace in headers) and
//! drops fully blank rows.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::polars_utils::parse_f64;

/// Options applied while reading a source file.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Field delimiter for delimited files. `None` infers from the file
    /// extension (tab for `.tsv`, comma otherwise).
    pub delimiter: Option<u8>,
    /// Worksheet to read from spreadsheet files, as a 0-based index or a
    /// sheet name. `None` reads the first sheet.
    pub sheet: Option<String>,
    /// Replace whitespace runs in headers with a single underscore, so
    /// `" Max Heart Rate "` becomes `Max_Heart_Rate`.
    pub underscore_headers: bool,
}

/// Headers and string rows, as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

pub(crate) fn normalize_header(raw: &str, underscore: bool) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let joiner = if underscore { '_' } else { ' ' };
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(joiner);
            normalized.push_str(part);
        }
    }
    normalized
}

pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

pub(crate) fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|value| value.trim().is_empty())
}

/// Shape summary for one column of a raw table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnHint {
    /// True when every present cell parses as a number.
    pub is_numeric: bool,
    /// Distinct present values over present cells.
    pub unique_ratio: f64,
    /// Missing cells over all rows.
    pub null_ratio: f64,
}

/// Profile each column of a raw table.
pub fn build_column_hints(table: &RawTable) -> BTreeMap<String, ColumnHint> {
    let mut hints = BTreeMap::new();
    let row_count = table.rows.len();
    for (col_idx, header) in table.headers.iter().enumerate() {
        let mut non_null = 0usize;
        let mut numeric = 0usize;
        let mut uniques = BTreeSet::new();
        for row in &table.rows {
            let value = row.get(col_idx).map(String::as_str).unwrap_or("");
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            non_null += 1;
            uniques.insert(trimmed.to_string());
            if parse_f64(trimmed).is_some() {
                numeric += 1;
            }
        }
        let null_ratio = if row_count == 0 {
            1.0
        } else {
            (row_count.saturating_sub(non_null)) as f64 / row_count as f64
        };
        let unique_ratio = if non_null == 0 {
            0.0
        } else {
            uniques.len() as f64 / non_null as f64
        };
        let is_numeric = non_null > 0 && numeric == non_null;
        hints.insert(
            header.clone(),
            ColumnHint {
                is_numeric,
                unique_ratio,
                null_ratio,
            },
        );
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization_strips_bom_and_collapses_whitespace() {
        assert_eq!(normalize_header("\u{feff} Max  Heart Rate ", false), "Max Heart Rate");
        assert_eq!(normalize_header(" Max  Heart Rate ", true), "Max_Heart_Rate");
        assert_eq!(normalize_header("gpa", true), "gpa");
        assert_eq!(normalize_header("   ", false), "");
    }

    #[test]
    fn hints_profile_each_column() {
        let table = RawTable {
            headers: vec!["id".to_string(), "grade".to_string(), "note".to_string()],
            rows: vec![
                vec!["1".to_string(), "A".to_string(), String::new()],
                vec!["2".to_string(), "A".to_string(), "kept".to_string()],
            ],
        };
        let hints = build_column_hints(&table);

        let id = hints.get("id").expect("id hint");
        assert!(id.is_numeric);
        assert!((id.unique_ratio - 1.0).abs() < 1e-9);

        let grade = hints.get("grade").expect("grade hint");
        assert!(!grade.is_numeric);
        assert!((grade.unique_ratio - 0.5).abs() < 1e-9);

        let note = hints.get("note").expect("note hint");
        assert!((note.null_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn hints_on_empty_table_mark_columns_fully_null() {
        let table = RawTable {
            headers: vec!["a".to_string()],
            rows: vec![],
        };
        let hints = build_column_hints(&table);
        let a = hints.get("a").expect("a hint");
        assert!(!a.is_numeric);
        assert!((a.null_ratio - 1.0).abs() < 1e-9);
    }
}
