//! Row-wise outlier removal.
//!
//! Columns are processed in order and removals are cumulative: bounds for a later column are
//! computed on the rows that survived the earlier ones.

use serde::Serialize;

use crate::error::ColumnError;
use crate::processing::report::{fold_columns, ColumnOutcome, ColumnReport, ProgressSink};
use crate::stats;
use crate::types::{ColumnData, ColumnKind, Table};

/// Threshold used when the caller does not pick one.
pub const DEFAULT_THRESHOLD: f64 = 1.5;

named_options! {
    /// Outlier detection method.
    pub enum OutlierMethod ("method") {
        /// Outside `[Q1 - t*IQR, Q3 + t*IQR]`.
        #[default]
        Iqr = "iqr",
        /// `|x - mean| / std > t` with the sample standard deviation.
        Zscore = "zscore",
    }
}

/// Per-column metrics of an outlier pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierMetrics {
    pub method: OutlierMethod,
    pub outliers_removed: usize,
    pub threshold: f64,
    /// Values below this bound were removed. `None` if no bound could be computed.
    pub lower_bound: Option<f64>,
    /// Values above this bound were removed.
    pub upper_bound: Option<f64>,
}

/// Result of [`remove_outliers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub total_removed: usize,
    pub initial_rows: usize,
    pub final_rows: usize,
    pub column_results: ColumnReport<OutlierMetrics>,
}

/// Drop rows holding outliers in any of `columns`. `threshold` must already be validated.
pub fn remove_outliers(
    table: &mut Table,
    columns: &[String],
    method: OutlierMethod,
    threshold: f64,
    progress: &dyn ProgressSink,
) -> OutlierReport {
    let initial_rows = table.row_count();
    let column_results = fold_columns(columns, progress, "Processing", |name| {
        let values = numeric_values(table, name)?;
        let bounds = match method {
            OutlierMethod::Iqr => stats::iqr_bounds(&stats::present(values), threshold),
            OutlierMethod::Zscore => zscore_bounds(values, threshold),
        };
        let keep: Vec<bool> = match (method, bounds) {
            (_, None) => vec![true; values.len()],
            (OutlierMethod::Iqr, Some((lo, hi))) => values
                .iter()
                .map(|v| v.is_none_or(|v| v >= lo && v <= hi))
                .collect(),
            (OutlierMethod::Zscore, Some(_)) => {
                let present = stats::present(values);
                let (mean, std) = (stats::mean(&present), stats::std_sample(&present));
                values
                    .iter()
                    .map(|v| match (v, mean, std) {
                        (Some(v), Some(m), Some(s)) => {
                            stats::z_score(*v, m, s).is_none_or(|z| z <= threshold)
                        }
                        _ => true,
                    })
                    .collect()
            }
        };
        let removed = table.retain_rows(&keep);
        Ok(ColumnOutcome::Success(OutlierMetrics {
            method,
            outliers_removed: removed,
            threshold,
            lower_bound: bounds.and_then(|b| stats::finite(b.0)),
            upper_bound: bounds.and_then(|b| stats::finite(b.1)),
        }))
    });

    let final_rows = table.row_count();
    OutlierReport {
        total_removed: initial_rows - final_rows,
        initial_rows,
        final_rows,
        column_results,
    }
}

fn numeric_values<'a>(table: &'a Table, name: &str) -> Result<&'a [Option<f64>], ColumnError> {
    let column = table
        .column(name)
        .ok_or_else(|| ColumnError::Missing(name.to_string()))?;
    match &column.data {
        ColumnData::Numeric(values) => Ok(values),
        ColumnData::Categorical(_) => Err(ColumnError::TypeMismatch {
            column: name.to_string(),
            actual: ColumnKind::Categorical,
            expected: ColumnKind::Numeric,
        }),
    }
}

/// `mean ± t * std`, `None` when the deviation is zero or undefined.
fn zscore_bounds(values: &[Option<f64>], threshold: f64) -> Option<(f64, f64)> {
    let present = stats::present(values);
    let mean = stats::mean(&present)?;
    let std = stats::std_sample(&present).filter(|s| *s > 0.0 && s.is_finite())?;
    Some((mean - threshold * std, mean + threshold * std))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::report::{ColumnStatus, NoProgress};
    use crate::types::{Column, Value};

    fn ages() -> Table {
        Table::new(vec![
            Column::numeric("age", vec![Some(20.0), Some(21.0), None, Some(22.0), Some(1000.0)]),
            Column::categorical("city", vec![Some("A".to_string()); 5]),
        ])
        .unwrap()
    }

    fn run(table: &mut Table, names: &[&str], method: OutlierMethod, t: f64) -> OutlierReport {
        let cols: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        remove_outliers(table, &cols, method, t, &NoProgress)
    }

    #[test]
    fn iqr_removes_the_extreme_row_and_keeps_missing_values() {
        let mut t = ages();
        let report = run(&mut t, &["age"], OutlierMethod::Iqr, DEFAULT_THRESHOLD);
        assert_eq!(report.total_removed, 1);
        assert_eq!(report.initial_rows, 5);
        assert_eq!(report.final_rows, 4);
        let ages: Vec<Value> = (0..4).map(|r| t.row(r)[0].clone()).collect();
        assert_eq!(
            ages,
            vec![Value::Number(20.0), Value::Number(21.0), Value::Null, Value::Number(22.0)]
        );
        let metrics = report.column_results.get("age").unwrap().metrics().unwrap();
        assert_eq!(metrics.threshold, 1.5);
        assert_eq!(metrics.lower_bound, Some(-347.875));
        assert_eq!(metrics.upper_bound, Some(635.125));
    }

    #[test]
    fn iqr_never_removes_in_bounds_rows() {
        let mut t = Table::new(vec![Column::numeric(
            "x",
            (0..20).map(|i| Some(f64::from(i))).collect(),
        )])
        .unwrap();
        let report = run(&mut t, &["x"], OutlierMethod::Iqr, 1.5);
        assert_eq!(report.total_removed, 0);
    }

    #[test]
    fn zscore_uses_sample_std_and_the_given_threshold() {
        let mut t = ages();
        // mean 265.75, sample std ~489.5; z(1000) ~1.5
        let report = run(&mut t, &["age"], OutlierMethod::Zscore, 1.4);
        assert_eq!(report.total_removed, 1);

        let mut t = ages();
        let report = run(&mut t, &["age"], OutlierMethod::Zscore, 3.0);
        assert_eq!(report.total_removed, 0);
    }

    #[test]
    fn constant_columns_lose_nothing_under_zscore() {
        let mut t = Table::new(vec![Column::numeric("x", vec![Some(4.0); 6])]).unwrap();
        let report = run(&mut t, &["x"], OutlierMethod::Zscore, 0.5);
        assert_eq!(report.total_removed, 0);
        let m = report.column_results.get("x").unwrap().metrics().unwrap();
        assert_eq!(m.lower_bound, None);
    }

    #[test]
    fn removals_are_cumulative_across_columns() {
        let mut t = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(100.0)]),
            Column::numeric("b", vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0)]),
        ])
        .unwrap();
        let report = run(&mut t, &["a", "b"], OutlierMethod::Iqr, 1.5);
        assert_eq!(report.total_removed, 1);
        assert_eq!(
            report.column_results.get("b").unwrap().metrics().unwrap().outliers_removed,
            0
        );
    }

    #[test]
    fn categorical_targets_are_column_errors() {
        let mut t = ages();
        let report = run(&mut t, &["city", "age"], OutlierMethod::Iqr, 1.5);
        assert_eq!(report.column_results.get("city").unwrap().status(), ColumnStatus::Error);
        assert_eq!(report.total_removed, 1);
    }
}
