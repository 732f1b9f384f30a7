//! Error types for report parsing, normalization, and export.

use std::fmt;
use std::io;

use rust_xlsxwriter::XlsxError;

/// Which side of the allow-list an entry was missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A configuration label (table row).
    Row,
    /// A metric name (table column).
    Metric,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => write!(f, "configuration"),
            Self::Metric => write!(f, "metric"),
        }
    }
}

/// Errors that can occur while turning a counter report into a table.
#[derive(Debug)]
pub enum PerfError {
    /// A run header was not followed by a timestamp line.
    MalformedHeader {
        /// 1-based line number of the header.
        line: usize,
        /// Configuration label declared by the header.
        label: String,
    },
    /// A data line did not split into a basic or extended record.
    MalformedRecord {
        /// 1-based line number of the data line.
        line: usize,
        /// The offending field (or the whole line when the field count is wrong).
        field: String,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// The baseline configuration has no row in the table.
    MissingBaseline {
        /// The baseline label that was looked up.
        baseline: String,
    },
    /// The baseline value for a metric is zero.
    DivisionByZero {
        /// The baseline label.
        baseline: String,
        /// The metric whose baseline is zero.
        metric: String,
    },
    /// A selected row or metric has no value after aggregation.
    MissingAllowListEntry {
        /// Row or metric.
        kind: EntryKind,
        /// The missing name. For metrics this is `row/metric`.
        name: String,
    },
    /// The selection itself is unusable.
    InvalidSelection(String),
    /// I/O error reading input or writing output.
    Io(io::Error),
    /// CSV encoding or decoding failure.
    Csv(csv::Error),
    /// Workbook construction or save failure.
    Xlsx(XlsxError),
}

impl fmt::Display for PerfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader { line, label } => {
                write!(f, "line {line}: header '{label}' is not followed by a timestamp")
            }
            Self::MalformedRecord { line, field, reason } => {
                write!(f, "line {line}: malformed record ({reason}): '{field}'")
            }
            Self::MissingBaseline { baseline } => {
                write!(f, "baseline configuration '{baseline}' not found")
            }
            Self::DivisionByZero { baseline, metric } => {
                write!(f, "baseline '{baseline}' has zero value for metric '{metric}'")
            }
            Self::MissingAllowListEntry { kind, name } => {
                write!(f, "selected {kind} '{name}' missing from table")
            }
            Self::InvalidSelection(msg) => write!(f, "invalid selection: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Csv(e) => write!(f, "CSV error: {e}"),
            Self::Xlsx(e) => write!(f, "workbook error: {e}"),
        }
    }
}

impl std::error::Error for PerfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Xlsx(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PerfError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for PerfError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<XlsxError> for PerfError {
    fn from(e: XlsxError) -> Self {
        Self::Xlsx(e)
    }
}
