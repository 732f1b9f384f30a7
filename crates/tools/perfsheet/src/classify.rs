//! Line classification and run discovery for counter reports.
//!
//! A report is a sequence of runs. Each run opens with a header line whose
//! first column is `#` followed by the configuration label, then a timestamp
//! line, then the `perf stat` output for that configuration:
//!
//! ```text
//! #gcc-c-minilua-O3
//! Thu Mar  9 10:12:01 UTC 2017
//! # started on Thu Mar  9 10:12:01 2017
//!
//!  Performance counter stats for './minilua bench.lua' (10 runs):
//!
//!      1,234,567,890      cycles:u                  ( +-  0.12% )
//!      ...
//!        0.523456789 seconds time elapsed           ( +-  0.30% )
//! ```
//!
//! Roles are decided by where the `#` marker sits, never by searching the
//! line for label text, so a counter whose name happens to contain a label
//! is still a data line.

use std::fmt;

use crate::error::PerfError;
use crate::record::{self, Derived, MetricRecord, Timing};

/// Prefix of the comment line `perf stat -o` writes at the top of its output.
const STARTED_MARKER: &str = "# started";

/// Leading word of the `Performance counter stats for ...` banner.
const BANNER_MARKER: &str = "Performance";

/// Summary line kept as the run's elapsed time.
const ELAPSED: &str = "time elapsed";

/// The role a single line plays in a report.
#[derive(Debug, Clone, PartialEq)]
pub enum LineRole<'a> {
    /// Column-0 `#` line opening a run. Holds the trimmed label.
    Header(&'a str),
    /// Empty or whitespace-only line.
    Blank,
    /// Column-0 `#` line that is not a header (`# started on ...`).
    Comment,
    /// The `Performance counter stats` banner.
    Banner,
    /// Indented `#` line carrying an extra derived ratio for the previous counter.
    Continuation,
    /// `<float> seconds <what>` summary.
    Timing(Timing),
    /// A counter line.
    Data,
}

/// Decide the role of one line, independent of its neighbours.
pub fn classify_line(line: &str) -> LineRole<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineRole::Blank;
    }
    if let Some(rest) = line.strip_prefix('#') {
        let label = rest.trim();
        if line.starts_with(STARTED_MARKER) || label.is_empty() {
            return LineRole::Comment;
        }
        return LineRole::Header(label);
    }
    if trimmed.starts_with(BANNER_MARKER) {
        return LineRole::Banner;
    }
    if trimmed.starts_with('#') {
        return LineRole::Continuation;
    }
    match record::parse_timing(trimmed) {
        Some(timing) => LineRole::Timing(timing),
        None => LineRole::Data,
    }
}

/// One labeled sampling session.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Configuration label, e.g. `gcc-hybrid-base-O3`.
    pub label: String,
    /// Timestamp line following the header, as written.
    pub timestamp: String,
    /// Counter lines, in report order.
    pub records: Vec<MetricRecord>,
    /// Ratios from indented `#` continuation lines, in report order.
    pub derived: Vec<Derived>,
    /// The `seconds time elapsed` summary, if the run printed one.
    pub elapsed: Option<Timing>,
}

impl Run {
    fn new(label: &str, timestamp: &str) -> Self {
        Self {
            label: label.to_string(),
            timestamp: timestamp.to_string(),
            records: Vec::new(),
            derived: Vec::new(),
            elapsed: None,
        }
    }
}

/// Why a non-blank line did not contribute to any run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Content appeared before the first header.
    BeforeFirstHeader,
    /// A header repeated a label already seen in this report.
    DuplicateHeader(String),
    /// Content belonging to a duplicate header.
    UnderDuplicateHeader(String),
    /// An indented `#` line without a `<number> <name>` ratio.
    UnparsedContinuation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeFirstHeader => write!(f, "content before first header"),
            Self::DuplicateHeader(label) => write!(f, "duplicate header '{label}'"),
            Self::UnderDuplicateHeader(label) => {
                write!(f, "belongs to duplicate header '{label}'")
            }
            Self::UnparsedContinuation => write!(f, "continuation without a ratio"),
        }
    }
}

/// A line the classifier ignored, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// Why it was ignored.
    pub reason: SkipReason,
}

/// All runs discovered in one report.
#[derive(Debug, Clone, Default)]
pub struct ParsedReport {
    /// Runs in the order their headers appear.
    pub runs: Vec<Run>,
    /// Lines that were ignored, with reasons.
    pub skipped: Vec<SkippedLine>,
}

impl ParsedReport {
    /// Look up a run by label.
    pub fn run(&self, label: &str) -> Option<&Run> {
        self.runs.iter().find(|r| r.label == label)
    }
}

/// Classifier position relative to run headers.
enum State {
    /// No header seen yet.
    Outside,
    /// Inside the run at this index.
    Inside(usize),
    /// Inside a repeated header whose content is discarded.
    Ignoring(String),
}

/// Parse a whole report into runs.
///
/// # Errors
///
/// Returns [`PerfError::MalformedHeader`] if a header is not followed by a
/// timestamp and [`PerfError::MalformedRecord`] for the first data line that
/// does not parse.
pub fn parse_report(text: &str) -> Result<ParsedReport, PerfError> {
    let mut report = ParsedReport::default();
    let mut state = State::Outside;
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    while let Some((line_no, line)) = lines.next() {
        let role = classify_line(line);

        if let LineRole::Header(label) = role {
            let timestamp = match lines.next() {
                Some((_, ts)) if !ts.trim().is_empty() => ts.trim(),
                _ => {
                    return Err(PerfError::MalformedHeader {
                        line: line_no,
                        label: label.to_string(),
                    });
                }
            };
            if report.run(label).is_some() {
                report.skipped.push(SkippedLine {
                    line: line_no,
                    reason: SkipReason::DuplicateHeader(label.to_string()),
                });
                state = State::Ignoring(label.to_string());
            } else {
                report.runs.push(Run::new(label, timestamp));
                state = State::Inside(report.runs.len() - 1);
            }
            continue;
        }

        if matches!(role, LineRole::Blank | LineRole::Comment | LineRole::Banner) {
            continue;
        }

        let run = match &state {
            State::Inside(idx) => &mut report.runs[*idx],
            State::Outside => {
                report.skipped.push(SkippedLine {
                    line: line_no,
                    reason: SkipReason::BeforeFirstHeader,
                });
                continue;
            }
            State::Ignoring(label) => {
                report.skipped.push(SkippedLine {
                    line: line_no,
                    reason: SkipReason::UnderDuplicateHeader(label.clone()),
                });
                continue;
            }
        };

        match role {
            LineRole::Data => run.records.push(record::parse_record(line_no, line)?),
            LineRole::Timing(timing) => {
                if timing.what == ELAPSED {
                    run.elapsed = Some(timing);
                }
            }
            LineRole::Continuation => {
                let body = line.trim().trim_start_matches('#').trim();
                match record::split_derived(first_column(body)) {
                    Some(derived) => run.derived.push(derived),
                    None => report.skipped.push(SkippedLine {
                        line: line_no,
                        reason: SkipReason::UnparsedContinuation,
                    }),
                }
            }
            LineRole::Header(_) | LineRole::Blank | LineRole::Comment | LineRole::Banner => {
                unreachable!("handled above")
            }
        }
    }

    Ok(report)
}

/// Text up to the first column gap of three or more spaces.
fn first_column(body: &str) -> &str {
    body.split("   ").next().unwrap_or(body).trim()
}
