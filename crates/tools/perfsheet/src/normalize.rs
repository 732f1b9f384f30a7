//! Ratio normalization against a baseline configuration.

use crate::error::PerfError;
use crate::table::Table;

/// Divide every row by the baseline row, metric by metric.
///
/// Returns a new table; the input is left untouched. Cells whose metric the
/// baseline lacks are dropped. The baseline row itself is set to exactly
/// `1.0` rather than divided by itself.
///
/// # Errors
///
/// Returns [`PerfError::MissingBaseline`] if `baseline` is not a row and
/// [`PerfError::DivisionByZero`] if a baseline cell that another row divides
/// by is zero.
pub fn normalize(table: &Table, baseline: &str) -> Result<Table, PerfError> {
    let base = table.row(baseline).ok_or_else(|| PerfError::MissingBaseline {
        baseline: baseline.to_string(),
    })?;

    let mut out = Table::new();
    for label in table.rows() {
        let Some(cells) = table.row(label) else {
            continue;
        };
        out.insert_row(label);
        if label == baseline {
            for metric in cells.keys() {
                out.insert(label, metric, 1.0);
            }
            continue;
        }
        for (metric, value) in cells {
            let Some(&divisor) = base.get(metric) else {
                continue;
            };
            if divisor == 0.0 {
                return Err(PerfError::DivisionByZero {
                    baseline: baseline.to_string(),
                    metric: metric.clone(),
                });
            }
            out.insert(label, metric, value / divisor);
        }
    }

    out.order_metrics_like(table);
    Ok(out)
}
