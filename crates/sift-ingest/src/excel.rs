//! Spreadsheet reading (xlsx, xls, xlsm, xlsb, ods).

use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};
use tracing::debug;

use sift_model::{Result, SiftError};

use crate::raw::{IngestOptions, RawTable, is_blank_row, normalize_cell, normalize_header};

/// How a `--sheet` selector is interpreted: digits mean a 0-based index,
/// anything else is a sheet name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SheetRef {
    Index(usize),
    Name(String),
}

fn sheet_ref(selector: &str) -> SheetRef {
    match selector.trim().parse::<usize>() {
        Ok(index) => SheetRef::Index(index),
        Err(_) => SheetRef::Name(selector.trim().to_string()),
    }
}

fn cell_text(cell: &Data) -> String {
    if cell.is_empty() {
        return String::new();
    }
    cell.as_string().unwrap_or_else(|| cell.to_string())
}

/// Read one worksheet into a raw table. The first non-blank row is taken
/// as the header row.
pub fn read_spreadsheet(path: &Path, options: &IngestOptions) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).map_err(|err| SiftError::load(path, err))?;
    if workbook.sheet_names().is_empty() {
        return Err(SiftError::load(path, "workbook has no sheets"));
    }

    let range = match options.sheet.as_deref().map(sheet_ref) {
        Some(SheetRef::Index(index)) => workbook
            .worksheet_range_at(index)
            .ok_or_else(|| SiftError::load(path, format!("no sheet at index {index}")))?
            .map_err(|err| SiftError::load(path, err))?,
        Some(SheetRef::Name(name)) => workbook
            .worksheet_range(&name)
            .map_err(|err| SiftError::load(path, err))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SiftError::load(path, "workbook has no sheets"))?
            .map_err(|err| SiftError::load(path, err))?,
    };

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for row in range.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| normalize_cell(&cell_text(cell)))
            .collect();
        if is_blank_row(&cells) {
            continue;
        }
        raw_rows.push(cells);
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
            row.push(value.to_string());
        }
        rows.push(row);
    }
    debug!(
        rows = rows.len(),
        columns = headers.len(),
        "parsed spreadsheet table"
    );
    Ok(RawTable { headers, rows })
}
