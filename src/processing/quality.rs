//! Data quality scoring, issue detection and preprocessing suggestions.

use std::collections::HashSet;

use serde::Serialize;

use crate::processing::dedup::duplicate_row_count;
use crate::stats;
use crate::types::{Column, ColumnData, ColumnKind, Table};

const HIGH_MISSING_SHARE: f64 = 0.3;
const SEVERE_MISSING_PCT: f64 = 70.0;
const SEVERE_DUPLICATE_SHARE: f64 = 0.1;
const OUTLIER_SHARE: f64 = 0.05;
const SCALE_RATIO: f64 = 100.0;

/// How urgent a quality issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A detected quality problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityIssue {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
    pub severity: Severity,
    pub description: String,
}

/// A recommended preprocessing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Name of the engine operation that addresses the issue.
    pub step: &'static str,
    pub priority: Severity,
    pub description: String,
    pub recommended_strategy: &'static str,
}

/// Overall quality assessment of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    /// `0..=100`, higher is better.
    pub score: u32,
    pub total_cells: usize,
    pub missing_cells: usize,
    pub missing_percentage: f64,
    pub duplicate_rows: usize,
    pub constant_columns: Vec<String>,
    pub issues: Vec<QualityIssue>,
    pub suggestions: Vec<Suggestion>,
}

fn distinct_count(column: &Column) -> usize {
    match &column.data {
        ColumnData::Numeric(v) => v.iter().flatten().map(|n| n.to_bits()).collect::<HashSet<_>>().len(),
        ColumnData::Categorical(v) => v.iter().flatten().collect::<HashSet<_>>().len(),
    }
}

/// Present values outside the 1.5 IQR fences.
fn iqr_outlier_count(values: &[Option<f64>]) -> usize {
    let present = stats::present(values);
    match stats::iqr_bounds(&present, 1.5) {
        Some((lo, hi)) => present.iter().filter(|v| **v < lo || **v > hi).count(),
        None => 0,
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 * 100.0 / whole as f64 }
}

/// Assess `table`.
pub fn quality_report(table: &Table) -> QualityReport {
    let rows = table.row_count();
    let total_cells = rows * table.column_count();
    let missing_cells: usize = table.columns().iter().map(Column::missing_count).sum();
    let duplicate_rows = duplicate_row_count(table);
    let constant_columns: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| distinct_count(c) <= 1)
        .map(|c| c.name.clone())
        .collect();
    let outliers: Vec<(&str, usize)> = table
        .columns()
        .iter()
        .filter_map(|c| match &c.data {
            ColumnData::Numeric(v) => Some((c.name.as_str(), iqr_outlier_count(v))),
            ColumnData::Categorical(_) => None,
        })
        .filter(|(_, n)| *n as f64 > rows as f64 * OUTLIER_SHARE)
        .collect();

    let missing_pct = pct(missing_cells, total_cells);
    let penalty = missing_pct.min(50.0)
        + pct(duplicate_rows, rows).min(20.0)
        + pct(constant_columns.len(), table.column_count()).min(10.0);
    let score = (100.0 - penalty).max(0.0).round() as u32;

    QualityReport {
        score,
        total_cells,
        missing_cells,
        missing_percentage: (missing_pct * 100.0).round() / 100.0,
        duplicate_rows,
        issues: issues(table, duplicate_rows, &constant_columns, &outliers),
        suggestions: suggestions(table, missing_cells, duplicate_rows, &outliers),
        constant_columns,
    }
}

fn issues(
    table: &Table,
    duplicate_rows: usize,
    constant_columns: &[String],
    outliers: &[(&str, usize)],
) -> Vec<QualityIssue> {
    let rows = table.row_count();
    let mut out = Vec::new();

    for column in table.columns() {
        let missing = column.missing_count();
        if missing as f64 > rows as f64 * HIGH_MISSING_SHARE {
            let share = pct(missing, rows);
            out.push(QualityIssue {
                kind: format!("High missing values in {}", column.name),
                count: missing,
                severity: if share > SEVERE_MISSING_PCT { Severity::High } else { Severity::Medium },
                description: format!("{share:.1}% missing values"),
            });
        }
    }

    if duplicate_rows > 0 {
        out.push(QualityIssue {
            kind: "Duplicate rows".to_string(),
            count: duplicate_rows,
            severity: if duplicate_rows as f64 > rows as f64 * SEVERE_DUPLICATE_SHARE {
                Severity::High
            } else {
                Severity::Medium
            },
            description: format!("{:.1}% of rows are duplicates", pct(duplicate_rows, rows)),
        });
    }

    for name in constant_columns {
        out.push(QualityIssue {
            kind: format!("Constant column: {name}"),
            count: 1,
            severity: Severity::Low,
            description: "Column has only one unique value".to_string(),
        });
    }

    for (name, count) in outliers {
        out.push(QualityIssue {
            kind: format!("Outliers in {name}"),
            count: *count,
            severity: Severity::Medium,
            description: format!("{:.1}% potential outliers", pct(*count, rows)),
        });
    }
    out
}

fn suggestions(
    table: &Table,
    missing_cells: usize,
    duplicate_rows: usize,
    outliers: &[(&str, usize)],
) -> Vec<Suggestion> {
    let mut out = Vec::new();

    if missing_cells > 0 {
        let affected = table.columns().iter().filter(|c| c.missing_count() > 0).count();
        out.push(Suggestion {
            step: "impute",
            priority: Severity::High,
            description: format!("Handle {missing_cells} missing values across {affected} columns"),
            recommended_strategy: "mean for numerical, mode for categorical",
        });
    }

    if duplicate_rows > 0 {
        out.push(Suggestion {
            step: "remove_duplicates",
            priority: Severity::High,
            description: format!("Remove {duplicate_rows} duplicate rows"),
            recommended_strategy: "drop_duplicates",
        });
    }

    let ranges: Vec<f64> = table
        .columns()
        .iter()
        .filter_map(|c| match &c.data {
            ColumnData::Numeric(v) => {
                let p = stats::present(v);
                Some(stats::max(&p)? - stats::min(&p)?)
            }
            ColumnData::Categorical(_) => None,
        })
        .collect();
    if ranges.len() > 1 {
        let widest = ranges.iter().copied().fold(f64::MIN, f64::max);
        let narrowest = ranges.iter().copied().fold(f64::MAX, f64::min);
        // A zero-width range next to a non-zero one counts as a scale mismatch.
        let mismatch = if narrowest == 0.0 { widest > 0.0 } else { widest / narrowest > SCALE_RATIO };
        if mismatch {
            out.push(Suggestion {
                step: "normalize",
                priority: Severity::Medium,
                description: "Numerical features have very different scales".to_string(),
                recommended_strategy: "standard or minmax scaling",
            });
        }
    }

    let categorical = table.column_names_of(ColumnKind::Categorical).len();
    if categorical > 0 {
        out.push(Suggestion {
            step: "encode",
            priority: Severity::Medium,
            description: format!("Encode {categorical} categorical columns for ML compatibility"),
            recommended_strategy: "label encoding for ordinal, one-hot for nominal",
        });
    }

    if let Some((name, count)) = outliers.first() {
        out.push(Suggestion {
            step: "remove_outliers",
            priority: Severity::Low,
            description: format!("Column {name} has {count} potential outliers"),
            recommended_strategy: "IQR method or Z-score",
        });
    }
    out
}
