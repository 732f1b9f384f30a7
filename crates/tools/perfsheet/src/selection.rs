//! Output allow-list: which configurations and metrics are exported, in
//! what order, and which configuration is the baseline.
//!
//! Deserialized from a TOML file such as:
//!
//! ```toml
//! baseline = "gcc-c-minilua-O3"
//! rows = ["gcc-hybrid-base-O3", "clang-hybrid-base-O3"]
//! metrics = ["instructions:u", "insn per cycle"]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{EntryKind, PerfError};
use crate::normalize::normalize;
use crate::table::{SelectedTable, Table};

/// Default baseline configuration.
pub const DEFAULT_BASELINE: &str = "gcc-c-minilua-O3";

/// Default exported configurations, in output order.
pub const DEFAULT_ROWS: [&str; 11] = [
    "gcc-c-minilua-O2",
    "gcc-hybrid-base-O2",
    "gcc-hybrid-base-prefetch-O2",
    "gcc-hybrid-base-O3",
    "gcc-hybrid-base-prefetch-O3",
    "clang-c-minilua-O2",
    "clang-hybrid-base-O2",
    "clang-hybrid-base-prefetch-O2",
    "clang-c-minilua-O3",
    "clang-hybrid-base-O3",
    "clang-hybrid-base-prefetch-O3",
];

/// Default exported metrics, in output order.
pub const DEFAULT_METRICS: [&str; 5] = [
    "instructions:u",
    "insn per cycle",
    "% of all cache refs",
    "branch-instructions:u",
    "% of all branches",
];

/// Baseline plus ordered row and metric allow-lists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selection {
    /// Configuration every other row is divided by.
    pub baseline: String,
    /// Configurations to export, in order. May include the baseline.
    pub rows: Vec<String>,
    /// Metrics to export, in order.
    pub metrics: Vec<String>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE.to_string(),
            rows: DEFAULT_ROWS.iter().map(ToString::to_string).collect(),
            metrics: DEFAULT_METRICS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Selection {
    /// Parse and validate a selection from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::InvalidSelection`] if the TOML does not parse or
    /// the selection is unusable.
    pub fn from_toml_str(text: &str) -> Result<Self, PerfError> {
        let selection: Self =
            toml::from_str(text).map_err(|e| PerfError::InvalidSelection(e.to_string()))?;
        selection.validate()?;
        Ok(selection)
    }

    /// Read a selection file.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::Io`] if the file cannot be read, otherwise as
    /// [`Selection::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, PerfError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that the selection names at least one row and metric and has
    /// no duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::InvalidSelection`] describing the first problem.
    pub fn validate(&self) -> Result<(), PerfError> {
        if self.baseline.trim().is_empty() {
            return Err(PerfError::InvalidSelection("baseline is empty".into()));
        }
        for (what, list) in [("rows", &self.rows), ("metrics", &self.metrics)] {
            if list.is_empty() {
                return Err(PerfError::InvalidSelection(format!("{what} is empty")));
            }
            for (i, name) in list.iter().enumerate() {
                if list[..i].contains(name) {
                    return Err(PerfError::InvalidSelection(format!(
                        "{what} lists '{name}' twice"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Restrict columns to the selected metrics, normalize against the
    /// baseline, and pick the selected rows.
    ///
    /// Metrics outside the allow-list never take part in the division, so a
    /// zero in an unexported counter cannot fail the report.
    ///
    /// # Errors
    ///
    /// Propagates [`normalize`] errors and [`Selection::select`] errors.
    pub fn normalize(&self, table: &Table) -> Result<SelectedTable, PerfError> {
        let projected = table.retain_metrics(&self.metrics);
        let normalized = normalize(&projected, &self.baseline)?;
        self.select(&normalized)
    }

    /// Pick the selected rows and metrics, in allow-list order.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::MissingAllowListEntry`] for the first selected
    /// row absent from `table`, or the first selected cell without a value.
    pub fn select(&self, table: &Table) -> Result<SelectedTable, PerfError> {
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let cells = table.row(row).ok_or_else(|| PerfError::MissingAllowListEntry {
                kind: EntryKind::Row,
                name: row.clone(),
            })?;
            let line = self
                .metrics
                .iter()
                .map(|metric| {
                    cells
                        .get(metric)
                        .copied()
                        .ok_or_else(|| PerfError::MissingAllowListEntry {
                            kind: EntryKind::Metric,
                            name: format!("{row}/{metric}"),
                        })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            values.push(line);
        }
        Ok(SelectedTable {
            rows: self.rows.clone(),
            metrics: self.metrics.clone(),
            values,
        })
    }
}
