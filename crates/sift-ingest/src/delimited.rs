//! Delimited-text reading (CSV, TSV, and friends).

use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use sift_model::{Result, SiftError};

use crate::raw::{IngestOptions, RawTable, is_blank_row, normalize_cell, normalize_header};

fn delimiter_for(path: &Path, options: &IngestOptions) -> u8 {
    if let Some(delimiter) = options.delimiter {
        return delimiter;
    }
    let is_tsv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    if is_tsv { b'\t' } else { b',' }
}

/// Parse delimited bytes into a raw table.
///
/// The first non-blank record is the header row. Data rows are padded or
/// truncated to the header width, fully blank rows are dropped.
pub fn read_delimited(path: &Path, bytes: &[u8], options: &IngestOptions) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter_for(path, options))
        .from_reader(bytes);

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| SiftError::load(path, err))?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if is_blank_row(&row) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Ok(RawTable {
            headers: Vec::new(),
            rows: Vec::new(),
        });
    }

    let headers: Vec<String> = raw_rows[0]
        .iter()
        .map(|value| normalize_header(value, options.underscore_headers))
        .collect();
    let mut rows = Vec::with_capacity(raw_rows.len().saturating_sub(1));
    for record in raw_rows.iter().skip(1) {
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            let value = record.get(idx).map(String::as_str).unwrap_or("");
            row.push(normalize_cell(value));
        }
        rows.push(row);
    }
    debug!(
        rows = rows.len(),
        columns = headers.len(),
        "parsed delimited table"
    );
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(contents: &str) -> RawTable {
        read_delimited(
            Path::new("test.csv"),
            contents.as_bytes(),
            &IngestOptions::default(),
        )
        .expect("parse")
    }

    #[test]
    fn pads_and_truncates_to_header_width() {
        let table = read("a,b,c\n1,2\n1,2,3,4\n");
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn skips_blank_rows() {
        let table = read("a,b\n1,2\n,\n3,4\n");
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = read("");
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn tsv_extension_switches_delimiter() {
        let table = read_delimited(
            Path::new("test.tsv"),
            b"a\tb\n1\t2\n",
            &IngestOptions::default(),
        )
        .expect("parse tsv");
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn explicit_delimiter_wins_over_extension() {
        let options = IngestOptions {
            delimiter: Some(b';'),
            ..IngestOptions::default()
        };
        let table =
            read_delimited(Path::new("test.csv"), b"a;b\n1;2\n", &options).expect("parse");
        assert_eq!(table.headers, vec!["a", "b"]);
    }
}
