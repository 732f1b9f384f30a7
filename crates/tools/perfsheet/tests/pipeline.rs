//! End-to-end checks of the report → selected table → CSV path.

use perfsheet::classify::parse_report;
use perfsheet::export::{read_csv, write_csv, write_csv_file};
use perfsheet::normalize::normalize;
use perfsheet::{PerfError, Selection, Table, process_report};

/// A report in the shape `perf stat -r 10` produces, for two configurations.
const REPORT: &str = "\
#gcc-c-minilua-O3
Thu Mar  9 10:12:01 UTC 2017
# started on Thu Mar  9 10:12:01 2017


 Performance counter stats for './minilua bench/fannkuch.lua' (10 runs):

     4,000,000,000      instructions:u            #    2.00  insn per cycle           ( +-  0.01% )
     2,000,000,000      cycles:u                                                      ( +-  0.12% )
        10,000,000      cache-references:u                                            ( +-  0.50% )
           500,000      cache-misses:u            #    5.000 % of all cache refs      ( +-  1.00% )
       800,000,000      branch-instructions:u                                         ( +-  0.01% )
         8,000,000      branch-misses:u           #    1.00% of all branches          ( +-  0.20% )

       0.700000000 seconds time elapsed                                          ( +-  0.30% )

#gcc-hybrid-base-O3
Thu Mar  9 10:14:40 UTC 2017
# started on Thu Mar  9 10:14:40 2017


 Performance counter stats for './hybrid bench/fannkuch.lua' (10 runs):

     3,000,000,000      instructions:u            #    3.00  insn per cycle           ( +-  0.01% )
     1,000,000,000      cycles:u                                                      ( +-  0.12% )
        10,000,000      cache-references:u                                            ( +-  0.50% )
         1,000,000      cache-misses:u            #   10.000 % of all cache refs      ( +-  1.00% )
       400,000,000      branch-instructions:u                                         ( +-  0.01% )
         2,000,000      branch-misses:u           #    0.50% of all branches          ( +-  0.20% )

       0.350000000 seconds time elapsed                                          ( +-  0.30% )
";

fn selection(rows: &[&str]) -> Selection {
    Selection {
        baseline: "gcc-c-minilua-O3".into(),
        rows: rows.iter().map(ToString::to_string).collect(),
        metrics: perfsheet::selection::DEFAULT_METRICS
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

#[test]
fn perf_report_normalizes_against_baseline() {
    let processed = process_report(REPORT, &selection(&["gcc-hybrid-base-O3", "gcc-c-minilua-O3"]))
        .unwrap();
    let out = &processed.selected;

    assert_eq!(out.metrics, perfsheet::selection::DEFAULT_METRICS);
    assert_eq!(out.get("gcc-hybrid-base-O3", "instructions:u"), Some(0.75));
    assert_eq!(out.get("gcc-hybrid-base-O3", "insn per cycle"), Some(1.5));
    assert_eq!(out.get("gcc-hybrid-base-O3", "% of all cache refs"), Some(2.0));
    assert_eq!(out.get("gcc-hybrid-base-O3", "branch-instructions:u"), Some(0.5));
    assert_eq!(out.get("gcc-hybrid-base-O3", "% of all branches"), Some(0.5));
    assert!(out.values[1].iter().all(|v| v.to_bits() == 1.0f64.to_bits()));

    let base = processed.report.run("gcc-c-minilua-O3").unwrap();
    assert_eq!(base.records.len(), 6);
    assert!((base.elapsed.as_ref().unwrap().seconds - 0.7).abs() < 1e-12);
}

#[test]
fn two_section_cycles_scenario() {
    let text = "\
# gcc-c-minilua-O3
Mon Jan  2 10:00:00 UTC 2017
1000000   cycles:u   1.5%
# gcc-hybrid-base-O3
Mon Jan  2 10:01:00 UTC 2017
500000   cycles:u   1.5%
";
    let table = Table::from_report(&parse_report(text).unwrap());
    let normalized = normalize(&table, "gcc-c-minilua-O3").unwrap();
    assert_eq!(normalized.get("gcc-c-minilua-O3", "cycles:u"), Some(1.0));
    assert_eq!(normalized.get("gcc-hybrid-base-O3", "cycles:u"), Some(0.5));
}

#[test]
fn missing_baseline_produces_no_table() {
    let text = "#gcc-hybrid-base-O3\nts\n   500000   cycles:u   1.5%\n";
    let sel = Selection {
        baseline: "gcc-c-minilua-O3".into(),
        rows: vec!["gcc-hybrid-base-O3".into()],
        metrics: vec!["cycles:u".into()],
    };
    let err = process_report(text, &sel).unwrap_err();
    assert!(matches!(err, PerfError::MissingBaseline { .. }));
}

#[test]
fn two_field_line_is_malformed() {
    let text = "#gcc-c-minilua-O3\nts\n   500000   cycles:u\n";
    let err = process_report(text, &Selection::default()).unwrap_err();
    assert!(matches!(err, PerfError::MalformedRecord { line: 3, .. }));
}

#[test]
fn default_selection_needs_every_configuration() {
    let err = process_report(REPORT, &Selection::default()).unwrap_err();
    assert!(matches!(err, PerfError::MissingAllowListEntry { .. }));
}

#[test]
fn csv_file_round_trip() {
    let processed = process_report(REPORT, &selection(&["gcc-hybrid-base-O3"])).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("fannkuch.txt.csv");
    write_csv_file(&path, &processed.selected).unwrap();

    let back = read_csv(std::fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(back.rows, processed.selected.rows);
    assert_eq!(back.metrics, processed.selected.metrics);
    for (a, b) in back
        .values
        .iter()
        .flatten()
        .zip(processed.selected.values.iter().flatten())
    {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    let mut again = Vec::new();
    write_csv(&mut again, &back).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), again);
}
