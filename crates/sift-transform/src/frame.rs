//! The owned table every pipeline stage works on.
//!
//! A [`Table`] wraps a Polars DataFrame with a name and load provenance.
//! Frames are built from raw string tables: every column starts as a
//! nullable String column, with empty cells stored as nulls rather than
//! empty strings, so missingness is explicit from the first moment.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::warn;

use sift_ingest::{LoadedTable, SourceInfo};

/// Provenance carried alongside the frame.
#[derive(Debug, Clone)]
pub struct TableMeta {
    pub source: SourceInfo,
    /// Shape right after load, before any pipeline stage ran.
    pub loaded_rows: usize,
    pub loaded_columns: usize,
}

/// A named, owned dataset. The pipeline holds exactly one of these and
/// moves it forward stage by stage; views and aggregates read it without
/// taking it over.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub data: DataFrame,
    pub meta: Option<TableMeta>,
}

impl Table {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
            meta: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.data.height()
    }

    pub fn column_count(&self) -> usize {
        self.data.width()
    }

    pub fn source_digest(&self) -> Option<&str> {
        self.meta.as_ref().map(|meta| meta.source.sha256.as_str())
    }
}

/// Table name from the source file stem; `table` when the path has none.
pub fn derive_table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "table".to_string())
}

fn unique_column_name(taken: &mut HashSet<String>, header: &str, index: usize) -> String {
    let base = if header.is_empty() {
        format!("column_{}", index + 1)
    } else {
        header.to_string()
    };
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}_{n}");
        if taken.insert(candidate.clone()) {
            warn!(header, renamed = %candidate, "duplicate header renamed");
            return candidate;
        }
        n += 1;
    }
}

/// Build a frame from a loaded raw table. Every column is a nullable
/// String column; empty cells become nulls. Duplicate and empty headers
/// are renamed so the frame accepts them.
pub fn build_table(loaded: &LoadedTable) -> Result<Table> {
    let raw = &loaded.raw;
    let mut taken = HashSet::new();
    let mut columns: Vec<Column> = Vec::with_capacity(raw.headers.len());
    for (idx, header) in raw.headers.iter().enumerate() {
        let mut values: Vec<Option<String>> = Vec::with_capacity(raw.rows.len());
        for row in &raw.rows {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            values.push(if cell.is_empty() {
                None
            } else {
                Some(cell.to_string())
            });
        }
        let name = unique_column_name(&mut taken, header, idx);
        columns.push(Series::new(name.into(), values).into_column());
    }
    let data = if columns.is_empty() {
        DataFrame::empty()
    } else {
        DataFrame::new(columns)?
    };
    let meta = TableMeta {
        source: loaded.info.clone(),
        loaded_rows: data.height(),
        loaded_columns: data.width(),
    };
    Ok(Table {
        name: derive_table_name(&loaded.info.path),
        data,
        meta: Some(meta),
    })
}
