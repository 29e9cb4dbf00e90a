//! Terminal tables for command results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use listview_export::{ExportColumn, ExportFile};
use listview_model::Record;
use listview_refresh::BulkDelete;

use crate::commands::PageReport;

/// Render one page with a selection marker column.
pub fn page_table(report: &PageReport, columns: &[ExportColumn]) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("")];
    header.extend(columns.iter().map(|column| header_cell(&column.label)));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);

    for row in &report.rows {
        let marker = if row.selected {
            Cell::new("✓")
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new("")
        };
        let mut cells = vec![marker];
        cells.extend(columns.iter().map(|column| {
            match row.record.field(&column.key) {
                Some(value) if !value.is_null() => Cell::new(value.display_text()),
                _ => dim_cell("-"),
            }
        }));
        table.add_row(cells);
    }
    table
}

pub fn print_page(report: &PageReport, columns: &[ExportColumn]) {
    println!("{}", page_table(report, columns));
    println!(
        "{}: page {} of {}, {} matching, {} selected",
        report.module,
        report.page_index,
        report.page_count,
        report.total,
        report.selected.len()
    );
}

pub fn print_export(file: &ExportFile, path: &std::path::Path) {
    println!("Wrote {} ({} rows)", path.display(), file.row_count);
    println!("sha256 {}", file.sha256);
}

pub fn print_delete(report: &BulkDelete) {
    if !report.failed.is_empty() {
        let failed: Vec<String> = report.failed.iter().map(ToString::to_string).collect();
        eprintln!("Not deleted: {}", failed.join(", "));
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
