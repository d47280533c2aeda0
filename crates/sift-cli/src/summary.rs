use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use polars::prelude::DataFrame;

use sift_ingest::format_numeric;
use sift_transform::{AggregateValue, AggregationResult, ColumnSummary, CorrelationMatrix};

use crate::pipeline::preview_rows;
use crate::types::{InspectResult, RunResult};

pub fn print_run_summary(result: &RunResult) {
    println!("Table: {}", result.table.name);
    println!("Output: {}", result.output_dir.display());
    if let Some(meta) = &result.table.meta {
        println!(
            "Source: {} ({}, {} bytes)",
            meta.source.path.display(),
            meta.source.format.display_name(),
            meta.source.bytes
        );
        println!("SHA-256: {}", meta.source.sha256);
    }
    if let Some(path) = &result.cleaned_csv {
        println!("Cleaned CSV: {}", path.display());
    }
    if let Some(path) = &result.run_report {
        println!("Run report: {}", path.display());
    }
    print_stage_table(result);
    for aggregation in &result.outcome.aggregations {
        print_aggregation_table(aggregation);
    }
    print_stats_table(&result.outcome.summaries);
    if let Some(matrix) = &result.outcome.correlations {
        print_correlation_table(matrix);
    }
    if result.preview_limit > 0 {
        println!();
        println!("Cleaned table (first {} rows):", result.preview_limit);
        print_frame_preview(&result.table.data, result.preview_limit);
        for view in &result.outcome.views {
            println!();
            println!(
                "{} view '{}' (first {} rows):",
                view.kind.display_name(),
                view.label,
                result.preview_limit
            );
            print_frame_preview(&view.frame, result.preview_limit);
        }
    }
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

pub fn print_inspect(result: &InspectResult) {
    let info = &result.loaded.info;
    println!("File: {}", info.path.display());
    println!("Format: {}", info.format.display_name());
    println!("Size: {} bytes", info.bytes);
    println!("SHA-256: {}", info.sha256);
    println!(
        "Shape: {} rows x {} columns",
        result.loaded.raw.row_count(),
        result.loaded.raw.column_count()
    );
    if !result.hints.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Column"),
            header_cell("Type hint"),
            header_cell("Missing"),
            header_cell("Unique"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 2, CellAlignment::Right);
        align_column(&mut table, 3, CellAlignment::Right);
        for header in &result.loaded.raw.headers {
            let Some(hint) = result.hints.get(header) else {
                continue;
            };
            let type_hint = if hint.is_numeric { "numeric" } else { "text" };
            table.add_row(vec![
                Cell::new(header.clone()),
                Cell::new(type_hint),
                Cell::new(format!("{:.0}%", hint.null_ratio * 100.0)),
                Cell::new(format!("{:.0}%", hint.unique_ratio * 100.0)),
            ]);
        }
        println!();
        println!("Columns:");
        println!("{table}");
    }
    if result.limit > 0 && !result.loaded.raw.rows.is_empty() {
        let mut table = Table::new();
        let header: Vec<Cell> = result
            .loaded
            .raw
            .headers
            .iter()
            .map(|name| header_cell(name))
            .collect();
        table.set_header(header);
        apply_table_style(&mut table);
        for row in result.loaded.raw.rows.iter().take(result.limit) {
            let cells: Vec<Cell> = row
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        dim_cell("-")
                    } else {
                        Cell::new(value.clone())
                    }
                })
                .collect();
            table.add_row(cells);
        }
        println!();
        println!("Sample rows:");
        println!("{table}");
    }
}

fn print_stage_table(result: &RunResult) {
    if result.outcome.stages.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Step"),
        header_cell("Rows before"),
        header_cell("Rows after"),
        header_cell("Cells"),
        header_cell("ms"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    let mut total_cells = 0usize;
    let mut total_ms = 0u64;
    for stage in &result.outcome.stages {
        total_cells += stage.cells_changed;
        total_ms += stage.duration_ms;
        table.add_row(vec![
            stage_cell(stage.stage.display_name()),
            Cell::new(stage.detail.clone()),
            Cell::new(stage.rows_before),
            Cell::new(stage.rows_after),
            count_cell(stage.cells_changed, Color::Green),
            Cell::new(stage.duration_ms),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} steps", result.outcome.stages.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(total_cells, Color::Green).add_attribute(Attribute::Bold),
        Cell::new(total_ms).add_attribute(Attribute::Bold),
    ]);
    println!();
    println!("Stages:");
    println!("{table}");
}

fn print_aggregation_table(aggregation: &AggregationResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(&aggregation.group_by),
        header_cell(aggregation.reduction.display_name()),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for row in &aggregation.rows {
        table.add_row(vec![Cell::new(row.group.clone()), value_cell(&row.value)]);
    }
    println!();
    println!("Aggregation: {}", aggregation.label);
    println!("{table}");
}

fn print_stats_table(summaries: &[ColumnSummary]) {
    if summaries.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Count"),
        header_cell("Missing"),
        header_cell("Mean"),
        header_cell("Std dev"),
        header_cell("Min"),
        header_cell("Max"),
        header_cell("Median"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for summary in summaries {
        table.add_row(vec![
            Cell::new(summary.column.clone()),
            Cell::new(summary.count),
            count_cell(summary.missing, Color::Yellow),
            measure_cell(summary.mean),
            measure_cell(summary.std_dev),
            measure_cell(summary.min),
            measure_cell(summary.max),
            measure_cell(summary.median),
        ]);
    }
    println!();
    println!("Statistics:");
    println!("{table}");
}

fn print_correlation_table(matrix: &CorrelationMatrix) {
    if matrix.columns.is_empty() {
        return;
    }
    let mut table = Table::new();
    let mut header = vec![header_cell("")];
    for column in &matrix.columns {
        header.push(header_cell(column));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=matrix.columns.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (column, values) in matrix.columns.iter().zip(&matrix.values) {
        let mut row = vec![header_cell(column)];
        for value in values {
            row.push(correlation_cell(*value));
        }
        table.add_row(row);
    }
    println!();
    println!("Correlations:");
    println!("{table}");
}

fn print_frame_preview(df: &DataFrame, limit: usize) {
    if df.width() == 0 {
        println!("(no columns)");
        return;
    }
    let mut table = Table::new();
    let header: Vec<Cell> = df
        .get_column_names()
        .iter()
        .map(|name| header_cell(name.as_str()))
        .collect();
    table.set_header(header);
    apply_table_style(&mut table);
    for row in preview_rows(df, limit) {
        let cells: Vec<Cell> = row
            .into_iter()
            .map(|value| {
                if value.is_empty() {
                    dim_cell("-")
                } else {
                    Cell::new(value)
                }
            })
            .collect();
        table.add_row(cells);
    }
    println!("{table}");
}

fn value_cell(value: &AggregateValue) -> Cell {
    match value {
        AggregateValue::Undefined => dim_cell("undefined"),
        other => Cell::new(other.to_string()),
    }
}

fn measure_cell(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::new(format_numeric(v)),
        None => dim_cell("-"),
    }
}

fn correlation_cell(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::new(format!("{v:.3}")),
        None => dim_cell("-"),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn stage_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn count_cell(value: usize, color: Color) -> Cell {
    if value > 0 {
        Cell::new(value).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(value)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
