// ai
//! 🍽️ Preview — tables for humans, built with comfy-table.
//!
//! Three things get shown to a person at a terminal: the first rows of a fresh
//! bronze batch, the metadata log, and whatever the query engine sent back.
//! Each one gets a `Table`. Printing is the caller's job, so tests can look at
//! the rendered string without capturing stdout.

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use crate::backends::QueryResults;
use crate::common::{BronzeRecord, ExtractionLogEntry};

/// 👀 how many bronze rows the extract stage shows
pub(crate) const PREVIEW_ROWS: usize = 5;

/// 🔢 Formats a whole number with thousands separators: 1234567 → "1,234,567".
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// 💲 Money-ish cells. Large values lose their cents and gain commas; missing values stay blank.
fn format_amount(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_finite() && v.abs() >= 1_000.0 => {
            let the_digits = format_number(v.abs().round() as u64);
            if v < 0.0 { format!("-{the_digits}") } else { the_digits }
        }
        Some(v) => format!("{v}"),
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// 🥉 The first `PREVIEW_ROWS` bronze rows.
pub(crate) fn bronze_preview(records: &[BronzeRecord]) -> Table {
    let mut table = new_table(vec!["id", "symbol", "current_price", "market_cap", "total_volume", "timestamp"]);
    for record in records.iter().take(PREVIEW_ROWS) {
        table.add_row(vec![
            Cell::new(&record.id),
            Cell::new(&record.symbol),
            right(format_amount(record.current_price)),
            right(format_amount(record.market_cap)),
            right(format_amount(record.total_volume)),
            Cell::new(&record.timestamp),
        ]);
    }
    table
}

/// 🪵 Every row of the metadata log.
pub(crate) fn log_entries(entries: &[ExtractionLogEntry]) -> Table {
    let mut table = new_table(vec![
        "id",
        "run_timestamp",
        "source_api",
        "record_count",
        "status",
        "s3_path",
        "runtime_seconds",
    ]);
    for entry in entries {
        table.add_row(vec![
            right(entry.id.to_string()),
            Cell::new(&entry.run_timestamp),
            Cell::new(&entry.source_api),
            right(entry.record_count.to_string()),
            Cell::new(&entry.status),
            Cell::new(entry.s3_path.as_deref().unwrap_or("")),
            right(format!("{:.2}", entry.runtime_seconds)),
        ]);
    }
    table
}

/// 📋 A one-column list, e.g. table names.
pub(crate) fn name_list(title: &str, names: &[String]) -> Table {
    let mut table = new_table(vec![title]);
    for name in names {
        table.add_row(vec![Cell::new(name)]);
    }
    table
}

/// 🔎 A query result set, header and rows as returned.
pub(crate) fn query_results(results: &QueryResults) -> Table {
    let mut table = new_table(results.columns.iter().map(String::as_str).collect());
    for row in &results.rows {
        table.add_row(row.iter().map(Cell::new).collect::<Vec<Cell>>());
    }
    table
}
