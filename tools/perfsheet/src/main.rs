//! perfsheet: `perf stat` reports to normalized spreadsheets.
//!
//! Pipeline: discover reports → parse runs → aggregate per configuration →
//!           normalize against the baseline → write CSV + workbook sheet.

mod batch;
mod cli;
mod verbose;

use anyhow::{Context, Result, bail};
use clap::Parser;
use perfsheet::Selection;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    verbose::init(verbose::Level::from_flags(cli.quiet, cli.verbose));

    let selection = match &cli.selection {
        Some(path) => Selection::load(path)
            .with_context(|| format!("loading selection {}", path.display()))?,
        None => Selection::default(),
    };

    let summary = batch::run(&cli, &selection)?;
    let total = summary.exported + summary.failed.len();

    if !summary.failed.is_empty() {
        bail!(
            "{} of {total} reports failed; {} written without them",
            summary.failed.len(),
            summary.workbook.display()
        );
    }

    println!("Exported {total} reports.");
    Ok(())
}
