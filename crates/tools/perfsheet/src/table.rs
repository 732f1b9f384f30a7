//! Per-report metric tables.
//!
//! A [`Table`] maps configuration label → metric name → value, keeping both
//! rows and metric columns in first-seen order. Missing cells are absent,
//! never zero. A [`SelectedTable`] is the dense, allow-list-ordered form
//! that gets exported.

use indexmap::{IndexMap, IndexSet};

use crate::classify::{ParsedReport, Run};

/// Metric names and values of one run, in aggregation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunColumn {
    /// Metric names.
    pub names: Vec<String>,
    /// Values, parallel to `names`.
    pub values: Vec<f64>,
}

impl RunColumn {
    /// Flatten a run: every counter first, then the secondary metric of each
    /// extended counter, then continuation ratios.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_run(run: &Run) -> Self {
        let mut column = Self::default();
        for record in &run.records {
            column.names.push(record.name.clone());
            column.values.push(record.value as f64);
        }
        for derived in run.records.iter().filter_map(|r| r.extended.as_ref()) {
            column.names.push(derived.name.clone());
            column.values.push(derived.percent);
        }
        for derived in &run.derived {
            column.names.push(derived.name.clone());
            column.values.push(derived.percent);
        }
        column
    }

    /// Iterate `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

/// Sparse configuration × metric table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: IndexMap<String, IndexMap<String, f64>>,
    metrics: IndexSet<String>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the runs of one report, one row per run.
    pub fn from_report(report: &ParsedReport) -> Self {
        Self::from_runs(&report.runs)
    }

    /// Join runs into a table. A metric repeated within a run keeps its
    /// first position and its last value.
    pub fn from_runs(runs: &[Run]) -> Self {
        let mut table = Self::new();
        for run in runs {
            table.insert_row(&run.label);
            for (name, value) in RunColumn::from_run(run).iter() {
                table.insert(&run.label, name, value);
            }
        }
        table
    }

    /// Add an empty row if `row` is not present yet.
    pub fn insert_row(&mut self, row: &str) {
        if !self.rows.contains_key(row) {
            self.rows.insert(row.to_string(), IndexMap::new());
        }
    }

    /// Set a cell, creating the row and column if needed.
    pub fn insert(&mut self, row: &str, metric: &str, value: f64) {
        self.metrics.insert(metric.to_string());
        self.rows
            .entry(row.to_string())
            .or_default()
            .insert(metric.to_string(), value);
    }

    /// Configuration labels in row order.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Metric names in column order.
    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(String::as_str)
    }

    /// All cells of one row.
    pub fn row(&self, label: &str) -> Option<&IndexMap<String, f64>> {
        self.rows.get(label)
    }

    /// A single cell.
    pub fn get(&self, row: &str, metric: &str) -> Option<f64> {
        self.rows.get(row)?.get(metric).copied()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only the listed metric columns. Rows are preserved even if they
    /// end up empty.
    #[must_use]
    pub fn retain_metrics(&self, keep: &[String]) -> Self {
        let mut out = Self::new();
        for (label, cells) in &self.rows {
            out.insert_row(label);
            for (metric, value) in cells {
                if keep.contains(metric) {
                    out.insert(label, metric, *value);
                }
            }
        }
        out.order_metrics_like(self);
        out
    }

    /// Reorder columns to follow `other`'s column order. Columns unknown to
    /// `other` go last.
    pub fn order_metrics_like(&mut self, other: &Table) {
        let pos = |m: &String| other.metrics.get_index_of(m).unwrap_or(usize::MAX);
        self.metrics.sort_by(|a, b| pos(a).cmp(&pos(b)));
    }
}

/// Dense table in allow-list order, ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTable {
    /// Configuration labels, one per row.
    pub rows: Vec<String>,
    /// Metric names, one per column.
    pub metrics: Vec<String>,
    /// `values[row][column]`.
    pub values: Vec<Vec<f64>>,
}

impl SelectedTable {
    /// A single cell by name.
    pub fn get(&self, row: &str, metric: &str) -> Option<f64> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.metrics.iter().position(|m| m == metric)?;
        Some(self.values[r][c])
    }

    /// Iterate rows as `(label, values)`.
    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.rows
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }
}
