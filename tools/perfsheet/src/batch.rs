//! Batch driver: walks the input directory and exports each report.
//!
//! A report that fails to parse, normalize, or export is reported and left
//! without output; the remaining reports still run. The workbook is saved
//! once, after the last report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use perfsheet::export::{self, WorkbookExporter};
use perfsheet::{ProcessedReport, Selection, output};
use walkdir::WalkDir;

use crate::cli::Cli;
use crate::verbose::{Timer, dprintln, is_quiet, vprintln};

/// Outcome of a batch run.
pub struct BatchSummary {
    /// Reports exported successfully.
    pub exported: usize,
    /// Reports that failed, in processing order.
    pub failed: Vec<PathBuf>,
    /// Path of the saved workbook.
    pub workbook: PathBuf,
}

/// Regular files directly inside `dir`, sorted by filename.
pub fn discover_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut reports = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("reading input directory {}", dir.display()))?;
        if entry.file_type().is_file() {
            reports.push(entry.into_path());
        }
    }
    Ok(reports)
}

/// Read and process one report.
fn process_file(path: &Path, selection: &Selection) -> Result<ProcessedReport> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let processed = perfsheet::process_report(&text, selection)?;

    vprintln!(
        "  {} runs, {} metrics",
        processed.report.runs.len(),
        processed.table.metrics().count()
    );
    for skipped in &processed.report.skipped {
        vprintln!("  skipped line {}: {}", skipped.line, skipped.reason);
    }
    Ok(processed)
}

/// Process, print, and export a single report. Returns the sheet name used.
///
/// The worksheet is built before the CSV is written and attached only after
/// the CSV succeeds, so a failing report leaves neither behind.
fn export_report(
    path: &Path,
    cli: &Cli,
    selection: &Selection,
    workbook: &mut WorkbookExporter,
) -> Result<String> {
    let _t = Timer::start(path.display().to_string());
    let processed = process_file(path, selection)?;

    let stem = export::sheet_stem(path);
    let pending = workbook
        .prepare_sheet(&stem, &processed.selected)
        .with_context(|| format!("adding sheet '{stem}'"))?;

    let csv_path = export::csv_path(&cli.csv_dir, path);
    if let Err(e) = export::write_csv_file(&csv_path, &processed.selected) {
        let _ = std::fs::remove_file(&csv_path);
        return Err(e).with_context(|| format!("writing {}", csv_path.display()));
    }
    vprintln!("  -> {}", csv_path.display());

    let sheet = workbook.push(pending);
    if !is_quiet() {
        output::print_table(&sheet, &processed.selected);
    }
    Ok(sheet)
}

/// Export every report in `cli.input_dir`, then save the workbook.
///
/// Per-report failures are printed to stderr and collected in the summary.
/// Only setup and workbook errors are returned as `Err`.
pub fn run(cli: &Cli, selection: &Selection) -> Result<BatchSummary> {
    let reports = discover_reports(&cli.input_dir)?;
    dprintln!(
        "Processing {} reports from {} (baseline {})...",
        reports.len(),
        cli.input_dir.display(),
        selection.baseline
    );

    let mut workbook = WorkbookExporter::new();
    let mut exported = 0;
    let mut failed = Vec::new();

    for path in &reports {
        dprintln!("  {}", path.display());
        match export_report(path, cli, selection, &mut workbook) {
            Ok(_) => exported += 1,
            Err(e) => {
                eprintln!("error: {}: {e:#}", path.display());
                failed.push(path.clone());
            }
        }
    }

    let workbook_path = cli.xlsx_dir.join(export::WORKBOOK_FILE);
    let sheets = workbook.sheet_names().len();
    workbook
        .save(&workbook_path)
        .with_context(|| format!("saving {}", workbook_path.display()))?;
    dprintln!("Wrote {} ({sheets} sheets)", workbook_path.display());

    Ok(BatchSummary {
        exported,
        failed,
        workbook: workbook_path,
    })
}
