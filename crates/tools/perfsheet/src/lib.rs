//! Aggregation of `perf stat` counter reports into normalized tables.
//!
//! A report holds one run per compilation configuration. Runs are parsed
//! ([`classify`], [`record`]), joined into a configuration × metric
//! [`table::Table`], divided by a baseline configuration ([`normalize`]),
//! projected onto an allow-list ([`selection`]), and exported as CSV and
//! XLSX ([`export`]).

pub mod classify;
pub mod error;
pub mod export;
pub mod normalize;
pub mod output;
pub mod record;
pub mod selection;
pub mod table;

pub use error::PerfError;
pub use selection::Selection;
pub use table::{SelectedTable, Table};

/// Everything derived from one report.
#[derive(Debug, Clone)]
pub struct ProcessedReport {
    /// Runs and skipped-line diagnostics.
    pub report: classify::ParsedReport,
    /// Raw aggregated values.
    pub table: Table,
    /// Normalized values restricted to the selection.
    pub selected: SelectedTable,
}

/// Parse, aggregate, normalize, and select one report.
///
/// # Errors
///
/// Returns the first [`PerfError`] from any stage; no partial result is
/// produced.
pub fn process_report(text: &str, selection: &Selection) -> Result<ProcessedReport, PerfError> {
    let report = classify::parse_report(text)?;
    let table = Table::from_report(&report);
    let selected = selection.normalize(&table)?;
    Ok(ProcessedReport {
        report,
        table,
        selected,
    })
}
