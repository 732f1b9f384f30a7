//! Terminal output formatting for normalized tables.

use std::fmt::Write;

use crate::table::SelectedTable;

/// Render a table with aligned columns, four decimals per value.
pub fn format_table(title: &str, table: &SelectedTable) -> String {
    let mut out = String::new();

    if table.rows.is_empty() {
        let _ = writeln!(out, "  {title}: no configurations to display.");
        return out;
    }

    // Compute column widths.
    let label_width = table
        .rows
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(title.len());
    let widths: Vec<usize> = table.metrics.iter().map(|m| m.len().max(10)).collect();

    // Header.
    let _ = write!(out, "  {title:<label_width$}");
    for (metric, width) in table.metrics.iter().zip(widths.iter().copied()) {
        let _ = write!(out, "  {metric:>width$}");
    }
    out.push('\n');
    let _ = write!(out, "  {:-<label_width$}", "");
    for &width in &widths {
        let _ = write!(out, "  {:->width$}", "");
    }
    out.push('\n');

    for (label, values) in table.iter_rows() {
        let _ = write!(out, "  {label:<label_width$}");
        for (value, width) in values.iter().zip(widths.iter().copied()) {
            let _ = write!(out, "  {value:>width$.4}");
        }
        out.push('\n');
    }
    out
}

/// Print a table to stdout, framed by blank lines.
pub fn print_table(title: &str, table: &SelectedTable) {
    println!();
    print!("{}", format_table(title, table));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_columns() {
        let table = SelectedTable {
            rows: vec!["gcc-hybrid-base-O3".into(), "v2".into()],
            metrics: vec!["insn per cycle".into(), "cycles:u".into()],
            values: vec![vec![1.5, 0.25], vec![2.0, 1.0]],
        };
        let text = format_table("bench", &table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("  bench "));
        assert!(lines[0].ends_with("insn per cycle    cycles:u"));
        assert!(lines[2].starts_with("  gcc-hybrid-base-O3"));
        assert!(lines[2].ends_with("1.5000      0.2500"));
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn empty_table() {
        let table = SelectedTable {
            rows: Vec::new(),
            metrics: vec!["x".into()],
            values: Vec::new(),
        };
        assert!(format_table("t", &table).contains("no configurations"));
    }
}
