//! Missing-value imputation.

use serde::Serialize;

use crate::error::ColumnError;
use crate::processing::report::{fold_columns, ColumnOutcome, ColumnReport, ProgressSink, SkipDetail};
use crate::processing::ProcessingOptions;
use crate::stats;
use crate::types::{ColumnData, Table, Value};

/// Label used for categorical gaps that have no better candidate.
pub const UNKNOWN_LABEL: &str = "Unknown";

named_options! {
    /// How missing values are filled.
    pub enum ImputeStrategy ("strategy") {
        /// Mean of the present values (numeric).
        #[default]
        Mean = "mean",
        /// Median of the present values (numeric).
        Median = "median",
        /// Most frequent value.
        Mode = "mode",
        /// `0` for numeric columns, `"Unknown"` for categorical ones.
        Constant = "constant",
        /// Carry the previous value forward.
        ForwardFill = "forward_fill",
        /// Mean of the nearest donor rows.
        Knn = "knn",
    }
}

/// Metrics of a successfully imputed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputeMetrics {
    /// Number of cells that were missing before imputation.
    pub filled: usize,
    pub strategy: ImputeStrategy,
    /// The single value written into every gap, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<Value>,
}

/// Fill missing values of `columns` in place.
pub fn impute(
    table: &mut Table,
    columns: &[String],
    strategy: ImputeStrategy,
    options: &ProcessingOptions,
    progress: &dyn ProgressSink,
) -> ColumnReport<ImputeMetrics> {
    let rows = table.row_count();
    fold_columns(columns, progress, "Processing", |name| {
        let column = table
            .column_mut(name)
            .ok_or_else(|| ColumnError::Missing(name.to_string()))?;
        let missing = column.missing_count();
        if missing == 0 {
            return Ok(ColumnOutcome::NoMissing { filled: 0 });
        }
        let fill_value = match &mut column.data {
            ColumnData::Numeric(values) => {
                match impute_numeric(name, values, strategy, rows, options.knn_max_neighbors)? {
                    NumericFill::Scalar(fill) => Some(Value::Number(fill)),
                    NumericFill::PerRow => None,
                    NumericFill::AllMissing => {
                        return Ok(ColumnOutcome::Skipped(SkipDetail::all_null()));
                    }
                }
            }
            ColumnData::Categorical(values) => Some(impute_categorical(values, strategy)),
        };
        Ok(ColumnOutcome::Success(ImputeMetrics {
            filled: missing,
            strategy,
            fill_value,
        }))
    })
}

enum NumericFill {
    Scalar(f64),
    PerRow,
    AllMissing,
}

fn impute_numeric(
    name: &str,
    values: &mut [Option<f64>],
    strategy: ImputeStrategy,
    rows: usize,
    knn_max_neighbors: usize,
) -> Result<NumericFill, ColumnError> {
    let present = stats::present(values);
    let fill = match strategy {
        ImputeStrategy::Mean | ImputeStrategy::ForwardFill => stats::mean(&present),
        ImputeStrategy::Median => stats::median(&present),
        ImputeStrategy::Mode => Some(stats::mode(&present).unwrap_or(0.0)),
        ImputeStrategy::Constant => Some(0.0),
        ImputeStrategy::Knn => {
            let k = knn_max_neighbors.min(rows.saturating_sub(1));
            if k == 0 {
                return Err(ColumnError::NotEnoughRows { rows });
            }
            if present.is_empty() {
                return Ok(NumericFill::AllMissing);
            }
            let mut filled = values.to_vec();
            knn_fill(&mut filled, k);
            if filled.iter().flatten().any(|v| !v.is_finite()) {
                return Err(ColumnError::NonFinite(name.to_string()));
            }
            values.copy_from_slice(&filled);
            return Ok(NumericFill::PerRow);
        }
    };
    let Some(fill) = fill else {
        return Ok(NumericFill::AllMissing);
    };
    let fill = stats::finite(fill).ok_or_else(|| ColumnError::NonFinite(name.to_string()))?;
    for cell in values.iter_mut().filter(|c| c.is_none()) {
        *cell = Some(fill);
    }
    Ok(NumericFill::Scalar(fill))
}

/// NaN-euclidean distance between two rows, scaled up for missing coordinates.
///
/// `None` when the rows share no present coordinate.
fn nan_euclidean(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let mut shared = 0usize;
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b) {
        if let (Some(x), Some(y)) = (x, y) {
            shared += 1;
            sum += (x - y) * (x - y);
        }
    }
    if shared == 0 {
        return None;
    }
    Some((sum * a.len() as f64 / shared as f64).sqrt())
}

/// Fill each gap with the mean of its `k` nearest donors, falling back to the donor mean when no
/// donor has a defined distance.
fn knn_fill(values: &mut [Option<f64>], k: usize) {
    let donors: Vec<f64> = stats::present(values);
    let fallback = stats::mean(&donors);
    let snapshot = values.to_vec();

    for (row, cell) in values.iter_mut().enumerate() {
        if cell.is_some() {
            continue;
        }
        let receiver = [snapshot[row]];
        let mut nearest: Vec<(f64, f64)> = snapshot
            .iter()
            .flatten()
            .filter_map(|&donor| nan_euclidean(&receiver, &[Some(donor)]).map(|d| (d, donor)))
            .collect();
        nearest.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearest.truncate(k);
        let picked: Vec<f64> = nearest.into_iter().map(|(_, v)| v).collect();
        *cell = stats::mean(&picked).or(fallback);
    }
}

fn impute_categorical(values: &mut [Option<String>], strategy: ImputeStrategy) -> Value {
    match strategy {
        ImputeStrategy::Mode => {
            let fill = stats::mode_text(values.iter().flatten().map(String::as_str))
                .unwrap_or(UNKNOWN_LABEL)
                .to_string();
            fill_gaps(values, &fill);
            Value::Text(fill)
        }
        ImputeStrategy::Constant => {
            fill_gaps(values, UNKNOWN_LABEL);
            Value::Text(UNKNOWN_LABEL.to_string())
        }
        _ => {
            forward_fill(values);
            fill_gaps(values, UNKNOWN_LABEL);
            Value::Text(UNKNOWN_LABEL.to_string())
        }
    }
}

fn fill_gaps(values: &mut [Option<String>], fill: &str) {
    for cell in values.iter_mut().filter(|c| c.is_none()) {
        *cell = Some(fill.to_string());
    }
}

fn forward_fill(values: &mut [Option<String>]) {
    let mut last: Option<String> = None;
    for cell in values.iter_mut() {
        match cell {
            Some(v) => last = Some(v.clone()),
            None => *cell = last.clone(),
        }
    }
}
