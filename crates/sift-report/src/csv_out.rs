//! Cleaned-table CSV output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, SerWriter};
use tracing::info;

use sift_transform::Table;

/// Write the cleaned table as `<name>_clean.csv` under `output_dir`,
/// creating the directory if needed. Missing cells become empty fields.
pub fn write_table_csv(output_dir: &Path, table: &Table) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let output_path = output_dir.join(format!("{}_clean.csv", table.name));
    let mut file = fs::File::create(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut table.data.clone())
        .with_context(|| format!("writing {}", output_path.display()))?;
    info!(
        path = %output_path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "cleaned table written"
    );
    Ok(output_path)
}
