//! CSV and XLSX export of selected tables.
//!
//! Each report becomes `<csv-dir>/<filename>.csv` and one worksheet of a
//! shared `output.xlsx` workbook. The workbook is only written by
//! [`WorkbookExporter::save`], after every report has been added.

use std::io;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::PerfError;
use crate::table::SelectedTable;

/// Header of the first (label) column.
pub const LABEL_HEADER: &str = "configuration";

/// Workbook filename within the XLSX output directory.
pub const WORKBOOK_FILE: &str = "output.xlsx";

/// Excel's sheet name length limit, in characters.
const MAX_SHEET_NAME: usize = 31;

/// Characters Excel rejects in sheet names.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Excel reserves this sheet name.
const RESERVED_SHEET_NAME: &str = "History";

/// `<csv_dir>/<input filename>.csv`, keeping the input's own extension.
pub fn csv_path(csv_dir: &Path, input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".csv");
    csv_dir.join(name)
}

/// Input filename up to its first `.`, used as the worksheet name.
pub fn sheet_stem(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

/// Make `name` acceptable as an Excel worksheet name.
///
/// Apostrophes are trimmed after truncation, since cutting to 31 characters
/// can expose one at the end.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.is_empty() {
        return "Sheet".to_string();
    }
    if cleaned.eq_ignore_ascii_case(RESERVED_SHEET_NAME) {
        return format!("{cleaned}_");
    }
    cleaned.to_string()
}

/// Excel's sheet name comparison.
fn same_sheet_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Write a table as CSV: a `configuration` + metrics header, then one line
/// per row.
///
/// # Errors
///
/// Returns [`PerfError::Csv`] or [`PerfError::Io`] on write failure.
pub fn write_csv<W: io::Write>(writer: W, table: &SelectedTable) -> Result<(), PerfError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let header = std::iter::once(LABEL_HEADER).chain(table.metrics.iter().map(String::as_str));
    wtr.write_record(header)?;
    for (label, values) in table.iter_rows() {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(label.to_string());
        record.extend(values.iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a table to a CSV file, creating parent directories.
///
/// # Errors
///
/// As [`write_csv`], plus [`PerfError::Io`] if the file cannot be created.
pub fn write_csv_file(path: &Path, table: &SelectedTable) -> Result<(), PerfError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(io::BufWriter::new(file), table)
}

/// Read back a CSV written by [`write_csv`].
///
/// # Errors
///
/// Returns [`PerfError::Csv`] for malformed CSV and
/// [`PerfError::MalformedRecord`] for a cell that is not a number.
pub fn read_csv<R: io::Read>(reader: R) -> Result<SelectedTable, PerfError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let metrics: Vec<String> = rdr.headers()?.iter().skip(1).map(ToString::to_string).collect();

    let mut rows = Vec::new();
    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record
            .position()
            .map_or(0, |p| usize::try_from(p.line()).unwrap_or(usize::MAX));
        rows.push(record.get(0).unwrap_or_default().to_string());
        let parsed = record
            .iter()
            .skip(1)
            .map(|cell| {
                cell.parse::<f64>().map_err(|_| PerfError::MalformedRecord {
                    line,
                    field: cell.to_string(),
                    reason: "value is not a number",
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        values.push(parsed);
    }

    Ok(SelectedTable {
        rows,
        metrics,
        values,
    })
}

/// A fully written worksheet not yet attached to the workbook.
///
/// Nothing reaches the workbook until [`WorkbookExporter::push`], so a report
/// that fails between [`WorkbookExporter::prepare_sheet`] and the push leaves
/// no sheet behind.
pub struct PendingSheet {
    name: String,
    sheet: Worksheet,
}

impl PendingSheet {
    /// Name the sheet will carry.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Accumulates one worksheet per report into a single workbook.
pub struct WorkbookExporter {
    workbook: Workbook,
    header: Format,
    names: Vec<String>,
}

impl Default for WorkbookExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookExporter {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            header: Format::new().set_bold(),
            names: Vec::new(),
        }
    }

    /// Names of the sheets added so far, in order.
    pub fn sheet_names(&self) -> &[String] {
        &self.names
    }

    /// Pick a sheet name not yet used. Excel compares names
    /// case-insensitively, including non-ASCII letters.
    fn unique_name(&self, name: &str) -> String {
        let base = sanitize_sheet_name(name);
        let taken = |n: &str| self.names.iter().any(|t| same_sheet_name(t, n));
        if !taken(&base) {
            return base;
        }
        let mut i = 2;
        loop {
            let suffix = format!("~{i}");
            let keep = MAX_SHEET_NAME - suffix.len();
            let candidate = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
            if !taken(&candidate) {
                return candidate;
            }
            i += 1;
        }
    }

    /// Write `table` into a detached worksheet under a fresh name.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::Xlsx`] if the name is rejected or a cell cannot
    /// be written. The workbook is left unchanged.
    pub fn prepare_sheet(&self, name: &str, table: &SelectedTable) -> Result<PendingSheet, PerfError> {
        let name = self.unique_name(name);
        let mut sheet = Worksheet::new();
        sheet.set_name(&name)?;

        sheet.write_string_with_format(0, 0, LABEL_HEADER, &self.header)?;
        for (c, metric) in table.metrics.iter().enumerate() {
            sheet.write_string_with_format(0, col_num(c + 1)?, metric, &self.header)?;
        }
        for (r, (label, values)) in table.iter_rows().enumerate() {
            let row = row_num(r + 1)?;
            sheet.write_string(row, 0, label)?;
            for (c, value) in values.iter().enumerate() {
                sheet.write_number(row, col_num(c + 1)?, *value)?;
            }
        }
        let label_width = table
            .rows
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(LABEL_HEADER.len());
        sheet.set_column_width(0, u16::try_from(label_width + 2).unwrap_or(u16::MAX))?;

        Ok(PendingSheet { name, sheet })
    }

    /// Attach a prepared sheet and return its name.
    pub fn push(&mut self, pending: PendingSheet) -> String {
        let PendingSheet { name, sheet } = pending;
        self.workbook.push_worksheet(sheet);
        self.names.push(name.clone());
        name
    }

    /// Add `table` as a new worksheet and return the name it was given.
    ///
    /// # Errors
    ///
    /// As [`prepare_sheet`](Self::prepare_sheet).
    pub fn add_sheet(&mut self, name: &str, table: &SelectedTable) -> Result<String, PerfError> {
        let pending = self.prepare_sheet(name, table)?;
        Ok(self.push(pending))
    }

    /// Write the workbook to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::Io`] or [`PerfError::Xlsx`] on failure.
    pub fn save(mut self, path: &Path) -> Result<(), PerfError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.workbook.save(path)?;
        Ok(())
    }
}

fn row_num(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}
