//! Field-level parsing of `perf stat` counter lines.
//!
//! `perf stat` aligns its columns with wide runs of spaces, so a data line
//! such as
//!
//! ```text
//! 2,345,678,901      instructions:u      #    1.90  insn per cycle      ( +-  0.01% )
//! ```
//!
//! splits into value, event name, an optional derived ratio introduced by a
//! `#` separator, and an optional variance column.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::PerfError;

/// A column gap: any whitespace run containing a tab, or three or more
/// whitespace characters.
static WIDE_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\t\s*|\s{3,}").expect("valid wide gap regex"));

/// Fallback gap for hand-written reports that use two-space columns.
static NARROW_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\t\s*|\s{2,}").expect("valid narrow gap regex"));

/// First decimal number in a derived-ratio field.
static FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d*)?").expect("valid float regex"));

/// `<seconds> seconds <what>` summary lines.
static TIMING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s+seconds\s+(\S.*)$").expect("valid timing regex")
});

/// The derived half of an extended record, e.g. `1.90  insn per cycle`.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    /// Leading number of the derived field (a percentage or a ratio).
    pub percent: f64,
    /// Text following the number, e.g. `% of all branches`.
    pub name: String,
}

/// One parsed counter line.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// Raw counter value with thousands separators removed.
    pub value: u64,
    /// Event name, e.g. `cycles:u`.
    pub name: String,
    /// Secondary metric for extended records.
    pub extended: Option<Derived>,
    /// Variance column as printed, e.g. `( +-  0.01% )`.
    pub variance: Option<String>,
}

impl MetricRecord {
    /// Returns `true` if this record carries a secondary metric.
    pub fn is_extended(&self) -> bool {
        self.extended.is_some()
    }
}

/// A `<float> seconds <what>` summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    /// Seconds reported.
    pub seconds: f64,
    /// What was timed, e.g. `time elapsed`.
    pub what: String,
    /// Variance column, if present.
    pub variance: Option<String>,
}

/// Split a trimmed line on column gaps, falling back to narrow gaps when
/// the wide split is too short to be a record.
fn split_fields(line: &str) -> Vec<&str> {
    let wide: Vec<&str> = WIDE_GAP
        .split(line)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if wide.iter().filter(|f| **f != "#").count() >= 3 {
        return wide;
    }
    NARROW_GAP
        .split(line)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

/// Split a derived field into its leading number and trailing name.
///
/// Returns `None` when the field contains no number or nothing follows it.
pub fn split_derived(field: &str) -> Option<Derived> {
    let m = FLOAT.find(field)?;
    let percent = m.as_str().parse::<f64>().ok()?;
    let name = field[m.end()..].trim();
    if name.is_empty() {
        return None;
    }
    Some(Derived {
        percent,
        name: name.to_string(),
    })
}

/// Parse a counter value, ignoring `,` thousands separators.
fn parse_value(line_no: usize, field: &str) -> Result<u64, PerfError> {
    field
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| PerfError::MalformedRecord {
            line: line_no,
            field: field.to_string(),
            reason: "value is not an integer",
        })
}

fn parse_extended(line_no: usize, field: &str) -> Result<Derived, PerfError> {
    split_derived(field).ok_or_else(|| PerfError::MalformedRecord {
        line: line_no,
        field: field.to_string(),
        reason: "derived field has no number followed by a name",
    })
}

/// Parse one data line into a [`MetricRecord`].
///
/// Three fields form a basic record (`value name variance`), four fields an
/// extended one (`value name derived variance`). A three-field line whose
/// last field follows a `#` separator is an extended record printed without
/// a variance column.
///
/// # Errors
///
/// Returns [`PerfError::MalformedRecord`] if the field count is wrong or a
/// numeric field does not parse.
pub fn parse_record(line_no: usize, line: &str) -> Result<MetricRecord, PerfError> {
    let raw = split_fields(line.trim());
    let marker = raw.iter().position(|f| *f == "#");
    let fields: Vec<&str> = raw.into_iter().filter(|f| *f != "#").collect();

    match (fields.as_slice(), marker) {
        ([value, name, derived], Some(2)) => Ok(MetricRecord {
            value: parse_value(line_no, value)?,
            name: (*name).to_string(),
            extended: Some(parse_extended(line_no, derived)?),
            variance: None,
        }),
        ([value, name, variance], _) => Ok(MetricRecord {
            value: parse_value(line_no, value)?,
            name: (*name).to_string(),
            extended: None,
            variance: Some((*variance).to_string()),
        }),
        ([value, name, derived, variance], _) => Ok(MetricRecord {
            value: parse_value(line_no, value)?,
            name: (*name).to_string(),
            extended: Some(parse_extended(line_no, derived)?),
            variance: Some((*variance).to_string()),
        }),
        _ => Err(PerfError::MalformedRecord {
            line: line_no,
            field: line.trim().to_string(),
            reason: "expected 3 or 4 fields",
        }),
    }
}

/// Parse a `<float> seconds <what>` summary line, if `line` is one.
pub fn parse_timing(line: &str) -> Option<Timing> {
    let mut fields = WIDE_GAP.split(line.trim()).filter(|f| !f.trim().is_empty());
    let caps = TIMING.captures(fields.next()?.trim())?;
    let seconds = caps[1].parse::<f64>().ok()?;
    Some(Timing {
        seconds,
        what: caps[2].trim().to_string(),
        variance: fields.next().map(|v| v.trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_record_with_thousands_separators() {
        let rec = parse_record(1, "1,234,567      cycles:u      ( +-  0.12% )").unwrap();
        assert_eq!(rec.value, 1_234_567);
        assert_eq!(rec.name, "cycles:u");
        assert_eq!(rec.variance.as_deref(), Some("( +-  0.12% )"));
        assert!(!rec.is_extended());
    }

    #[test]
    fn basic_record_tab_separated() {
        let rec = parse_record(1, "42\tbranch-instructions:u\t0.5%").unwrap();
        assert_eq!(rec.value, 42);
        assert_eq!(rec.name, "branch-instructions:u");
        assert_eq!(rec.variance.as_deref(), Some("0.5%"));
    }

    #[test]
    fn two_space_columns_fall_back_to_narrow_split() {
        let rec = parse_record(3, "1000000  cycles:u  1.5%").unwrap();
        assert_eq!(rec.value, 1_000_000);
        assert_eq!(rec.name, "cycles:u");
    }

    #[test]
    fn extended_record_percentage() {
        let rec = parse_record(
            7,
            "3,456,789      branch-misses:u      #    1.00% of all branches      ( +-  0.20% )",
        )
        .unwrap();
        assert_eq!(rec.value, 3_456_789);
        let ext = rec.extended.unwrap();
        assert!((ext.percent - 1.0).abs() < f64::EPSILON);
        assert_eq!(ext.name, "% of all branches");
        assert_eq!(rec.variance.as_deref(), Some("( +-  0.20% )"));
    }

    #[test]
    fn extended_record_ratio_with_space() {
        let rec = parse_record(
            2,
            "2,345,678,901      instructions:u      #    1.90  insn per cycle      ( +-  0.01% )",
        )
        .unwrap();
        let ext = rec.extended.unwrap();
        assert!((ext.percent - 1.90).abs() < 1e-12);
        assert_eq!(ext.name, "insn per cycle");
    }

    #[test]
    fn extended_record_without_variance() {
        let rec =
            parse_record(4, "1,234      cache-misses:u      #   10.000 % of all cache refs").unwrap();
        assert_eq!(rec.variance, None);
        let ext = rec.extended.unwrap();
        assert!((ext.percent - 10.0).abs() < f64::EPSILON);
        assert_eq!(ext.name, "% of all cache refs");
    }

    #[test]
    fn two_fields_is_malformed() {
        let err = parse_record(9, "1000      cycles:u").unwrap_err();
        assert!(matches!(err, PerfError::MalformedRecord { line: 9, .. }));
    }

    #[test]
    fn too_many_fields_is_malformed() {
        let err = parse_record(1, "1   a   b   c   d").unwrap_err();
        assert!(matches!(err, PerfError::MalformedRecord { .. }));
    }

    #[test]
    fn non_integer_value_is_malformed() {
        let err = parse_record(5, "<not counted>      cache-misses:u      ( +- 1% )").unwrap_err();
        match err {
            PerfError::MalformedRecord { field, .. } => assert_eq!(field, "<not counted>"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn derived_field_without_number_is_malformed() {
        let err = parse_record(5, "10      cycles:u      #   n/a      ( +- 1% )").unwrap_err();
        assert!(matches!(err, PerfError::MalformedRecord { line: 5, .. }));
    }

    #[test]
    fn timing_line() {
        let t = parse_timing("       0.523456789 seconds time elapsed      ( +-  0.30% )").unwrap();
        assert!((t.seconds - 0.523_456_789).abs() < 1e-12);
        assert_eq!(t.what, "time elapsed");
        assert_eq!(t.variance.as_deref(), Some("( +-  0.30% )"));
    }

    #[test]
    fn counter_line_is_not_timing() {
        assert!(parse_timing("1,234      cycles:u      ( +- 1% )").is_none());
    }
}
