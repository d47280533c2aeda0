//! Input loading for tablesift.
//!
//! Every source file becomes a [`RawTable`] of headers and string rows;
//! typing is the pipeline's job, not the reader's. Supported inputs:
//!
//! - delimited text (`csv`, `tsv`, `txt`, `dat`) via the `csv` crate
//! - spreadsheets (`xlsx`, `xls`, `xlsm`, `xlsb`, `ods`) via `calamine`
//!
//! [`read_table_file`] also records provenance (byte count, SHA-256) so a
//! run report can say exactly which input produced it.

pub mod delimited;
pub mod excel;
pub mod polars_utils;
pub mod raw;
pub mod source;

pub use delimited::read_delimited;
pub use excel::read_spreadsheet;
pub use polars_utils::{any_to_f64, any_to_opt_string, any_to_string, format_numeric, parse_f64};
pub use raw::{ColumnHint, IngestOptions, RawTable, build_column_hints};
pub use source::{LoadedTable, SourceFormat, SourceInfo, detect_format, read_table_file};
