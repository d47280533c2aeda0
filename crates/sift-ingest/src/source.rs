//! Source-file dispatch and provenance.
//!
//! [`read_table_file`] is the one entry point callers use: it detects the
//! format from the extension, reads the bytes once for the SHA-256
//! provenance digest, and hands off to the matching parser.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use sift_model::{Result, SiftError};

use crate::delimited::read_delimited;
use crate::excel::read_spreadsheet;
use crate::raw::{IngestOptions, RawTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Delimited,
    Spreadsheet,
}

impl SourceFormat {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// Where a table came from, for reports and logs.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub bytes: u64,
    pub sha256: String,
}

/// A raw table together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub raw: RawTable,
    pub info: SourceInfo,
}

pub fn detect_format(path: &Path) -> Result<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "tsv" | "txt" | "dat" => Ok(SourceFormat::Delimited),
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(SourceFormat::Spreadsheet),
        "" => Err(SiftError::load(path, "unsupported file type")),
        other => Err(SiftError::load(
            path,
            format!("unsupported file type: .{other}"),
        )),
    }
}

pub fn read_table_file(path: &Path, options: &IngestOptions) -> Result<LoadedTable> {
    let format = detect_format(path)?;
    let bytes = fs::read(path).map_err(|err| SiftError::load(path, err))?;
    let sha256 = hex::encode(Sha256::digest(&bytes));
    let raw = match format {
        SourceFormat::Delimited => read_delimited(path, &bytes, options)?,
        SourceFormat::Spreadsheet => read_spreadsheet(path, options)?,
    };
    info!(
        path = %path.display(),
        rows = raw.row_count(),
        columns = raw.column_count(),
        format = format.display_name(),
        "loaded source table"
    );
    Ok(LoadedTable {
        raw,
        info: SourceInfo {
            path: path.to_path_buf(),
            format,
            bytes: bytes.len() as u64,
            sha256,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_is_extension_based() {
        assert_eq!(
            detect_format(Path::new("a/b/data.CSV")).expect("csv"),
            SourceFormat::Delimited
        );
        assert_eq!(
            detect_format(Path::new("grades.xlsx")).expect("xlsx"),
            SourceFormat::Spreadsheet
        );
        assert!(matches!(
            detect_format(Path::new("notes.pdf")),
            Err(SiftError::Load { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("no_extension")),
            Err(SiftError::Load { .. })
        ));
    }
}
