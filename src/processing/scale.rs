//! Normalization and scaling of numeric columns.

use serde::Serialize;

use crate::error::ColumnError;
use crate::processing::report::{fold_columns, ColumnOutcome, ColumnReport, ProgressSink, SkipDetail};
use crate::stats::{self, ColumnStats};
use crate::types::{ColumnData, ColumnKind, Table};

named_options! {
    /// Scaling method.
    pub enum ScaleMethod ("method") {
        /// `(x - mean) / std`, population deviation.
        #[default]
        Standard = "standard",
        /// `(x - min) / (max - min)`.
        Minmax = "minmax",
        /// `(x - median) / IQR`.
        Robust = "robust",
        /// `x / max|x|`.
        Maxabs = "maxabs",
    }
}

/// Before/after statistics of a scaled column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleMetrics {
    pub method: ScaleMethod,
    pub original_stats: ColumnStats,
    pub new_stats: ColumnStats,
}

/// Scale `columns` in place. Missing values stay missing.
pub fn normalize(
    table: &mut Table,
    columns: &[String],
    method: ScaleMethod,
    progress: &dyn ProgressSink,
) -> ColumnReport<ScaleMetrics> {
    fold_columns(columns, progress, "Normalizing", |name| {
        let column = table
            .column_mut(name)
            .ok_or_else(|| ColumnError::Missing(name.to_string()))?;
        let ColumnData::Numeric(values) = &mut column.data else {
            return Err(ColumnError::TypeMismatch {
                column: name.to_string(),
                actual: ColumnKind::Categorical,
                expected: ColumnKind::Numeric,
            });
        };

        let present = stats::present(values);
        let Some((center, scale)) = transform(&present, method) else {
            return Ok(ColumnOutcome::Skipped(SkipDetail::all_null()));
        };
        let scaled: Vec<Option<f64>> = values.iter().map(|v| v.map(|x| (x - center) / scale)).collect();
        if scaled.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ColumnError::NonFinite(name.to_string()));
        }
        let original_stats = ColumnStats::of(values);
        *values = scaled;
        Ok(ColumnOutcome::Success(ScaleMetrics {
            method,
            original_stats,
            new_stats: ColumnStats::of(values),
        }))
    })
}

/// `(center, scale)` such that `x' = (x - center) / scale`. `None` without present values.
fn transform(present: &[f64], method: ScaleMethod) -> Option<(f64, f64)> {
    let nonzero = |s: f64| if s == 0.0 || !s.is_finite() { 1.0 } else { s };
    Some(match method {
        ScaleMethod::Standard => (stats::mean(present)?, nonzero(stats::std_population(present)?)),
        ScaleMethod::Minmax => {
            let (lo, hi) = (stats::min(present)?, stats::max(present)?);
            (lo, nonzero(hi - lo))
        }
        ScaleMethod::Maxabs => {
            let peak = present.iter().map(|v| v.abs()).max_by(f64::total_cmp)?;
            (0.0, nonzero(peak))
        }
        ScaleMethod::Robust => {
            let median = stats::median(present)?;
            let iqr = stats::quantile(present, 0.75)? - stats::quantile(present, 0.25)?;
            if iqr == 0.0 { (0.0, 1.0) } else { (median, iqr) }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::report::{ColumnStatus, NoProgress};
    use crate::types::{Column, Value};

    fn run(values: Vec<Option<f64>>, method: ScaleMethod) -> (Table, ColumnReport<ScaleMetrics>) {
        let mut t = Table::new(vec![Column::numeric("x", values)]).unwrap();
        let report = normalize(&mut t, &["x".to_string()], method, &NoProgress);
        (t, report)
    }

    fn cells(t: &Table) -> Vec<Value> {
        (0..t.row_count()).map(|r| t.row(r)[0].clone()).collect()
    }

    #[test]
    fn standard_uses_population_std() {
        let (t, report) = run(vec![Some(1.0), None, Some(3.0)], ScaleMethod::Standard);
        assert_eq!(cells(&t), vec![Value::Number(-1.0), Value::Null, Value::Number(1.0)]);
        let m = report.get("x").unwrap().metrics().unwrap();
        assert_eq!(m.original_stats.mean, Some(2.0));
        assert_eq!(m.new_stats.mean, Some(0.0));
    }

    #[test]
    fn minmax_maps_to_unit_range_and_tolerates_constants() {
        let (t, _) = run(vec![Some(10.0), Some(20.0), Some(15.0)], ScaleMethod::Minmax);
        assert_eq!(
            cells(&t),
            vec![Value::Number(0.0), Value::Number(1.0), Value::Number(0.5)]
        );
        let (t, _) = run(vec![Some(7.0), Some(7.0)], ScaleMethod::Minmax);
        assert_eq!(cells(&t), vec![Value::Number(0.0), Value::Number(0.0)]);
    }

    #[test]
    fn maxabs_divides_by_the_largest_magnitude() {
        let (t, _) = run(vec![Some(-4.0), Some(2.0)], ScaleMethod::Maxabs);
        assert_eq!(cells(&t), vec![Value::Number(-1.0), Value::Number(0.5)]);
    }

    #[test]
    fn robust_is_a_no_op_for_zero_iqr() {
        let original = vec![Some(5.0), Some(5.0), Some(5.0), Some(5.0), Some(9.0)];
        let (t, _) = run(original.clone(), ScaleMethod::Robust);
        assert_eq!(t.column("x").unwrap().data, ColumnData::Numeric(original));
        let (t, _) = run(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)], ScaleMethod::Robust);
        assert_eq!(t.row(0)[0], Value::Number(-1.0));
        assert_eq!(t.row(4)[0], Value::Number(1.0));
    }

    #[test]
    fn all_missing_columns_are_skipped() {
        let (_, report) = run(vec![None, None], ScaleMethod::Standard);
        assert_eq!(report.get("x").unwrap().status(), ColumnStatus::Skipped);
    }

    #[test]
    fn overflowing_range_is_a_column_error() {
        let values = vec![Some(-f64::MAX), Some(f64::MAX), None];
        let (t, report) = run(values.clone(), ScaleMethod::Minmax);
        assert_eq!(report.get("x").unwrap().status(), ColumnStatus::Error);
        assert_eq!(t.column("x").unwrap().data, ColumnData::Numeric(values));
    }
}
