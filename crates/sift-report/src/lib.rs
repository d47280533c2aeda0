//! Output writers for cleaned tables and run reports.
//!
//! - **csv_out**: the cleaned table as `<name>_clean.csv`
//! - **run_report**: the `<name>_report.json` run record

pub mod csv_out;
pub mod run_report;

pub use csv_out::write_table_csv;
pub use run_report::{RunReportPayload, TableReport, ViewReport, write_run_report_json};
