//! Command-line interface definitions for perfsheet.

use std::path::PathBuf;

use clap::Parser;

/// Convert a directory of `perf stat` reports into normalized CSV files and
/// a combined XLSX workbook.
#[derive(Parser)]
#[command(name = "perfsheet", version, about)]
pub struct Cli {
    /// Directory receiving one `<report>.csv` per input report.
    pub csv_dir: PathBuf,

    /// Directory receiving the combined `output.xlsx` workbook.
    pub xlsx_dir: PathBuf,

    /// Directory of `perf stat` reports, processed in filename order.
    pub input_dir: PathBuf,

    /// TOML file naming the baseline, exported configurations, and metrics
    /// (defaults to the built-in minilua/hybrid selection).
    #[arg(long, short = 's')]
    pub selection: Option<PathBuf>,

    /// Suppress per-report tables; show only errors and the final summary.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output with skipped-line diagnostics and timings.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
