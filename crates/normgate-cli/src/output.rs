//! Output formatting utilities.

use serde_json::Value;

/// Formats a value as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Prints a table header followed by a rule line.
pub fn print_table_header(columns: &[(&str, usize)]) {
    let header: Vec<String> = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect();
    println!("{}", header.join(" ").trim_end());
    let total: usize = columns.iter().map(|(_, width)| width + 1).sum();
    println!("{}", "-".repeat(total.max(40)));
}

/// Formats one table row to match [`print_table_header`].
pub fn format_table_row(cells: &[&str], columns: &[(&str, usize)]) -> String {
    let row: Vec<String> = cells
        .iter()
        .zip(columns)
        .map(|(cell, (_, width))| format!("{:<width$}", truncate(cell, *width), width = width))
        .collect();
    row.join(" ").trim_end().to_string()
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
