//! The operation set: in-place transformations over a [`crate::types::Table`].
//!
//! Each batch operation walks its target columns in order, reports progress through a
//! [`ProgressSink`] and returns an ordered per-column report. A failure in one column is recorded
//! in that column's outcome and never stops the others.
//!
//! Operations assume their column arguments were already checked with
//! [`crate::validation::validate_columns`]; the dataset layer does that under its lock.
//!
//! ## Example: impute, then encode
//!
//! ```rust
//! use dataprep_engine::processing::{
//!     encode, impute, EncodeMethod, ImputeStrategy, NoProgress, ProcessingOptions,
//! };
//! use dataprep_engine::types::{Column, Table};
//!
//! let mut table = Table::new(vec![
//!     Column::numeric("age", vec![Some(20.0), None, Some(22.0)]),
//!     Column::categorical("city", vec![Some("B".into()), Some("A".into()), None]),
//! ])
//! .unwrap();
//! let opts = ProcessingOptions::default();
//!
//! let filled = impute(&mut table, &["age".to_string()], ImputeStrategy::Mean, &opts, &NoProgress);
//! assert_eq!(filled.len(), 1);
//! assert_eq!(table.column("age").unwrap().missing_count(), 0);
//!
//! encode(&mut table, &["city".to_string()], EncodeMethod::Label, &opts, &NoProgress);
//! assert_eq!(table.row(1)[1], dataprep_engine::types::Value::Number(0.0));
//! ```

pub mod correlate;
pub mod dedup;
pub mod encode;
pub mod impute;
pub mod outliers;
pub mod quality;
pub mod report;
pub mod scale;
pub mod summary;

pub use correlate::{correlate, CorrelationCell, CorrelationMatrix, CorrelationResult, StrongCorrelation};
pub use dedup::{drop_missing_rows, duplicate_row_count, remove_duplicates, RowRemovalReport};
pub use encode::{encode, EncodeMethod, EncodeMetrics};
pub use impute::{impute, ImputeMetrics, ImputeStrategy};
pub use outliers::{remove_outliers, OutlierMethod, OutlierMetrics, OutlierReport};
pub use quality::{quality_report, QualityIssue, QualityReport, Severity, Suggestion};
pub use report::{
    ColumnMap, ColumnOutcome, ColumnReport, ColumnStatus, NoProgress, ProgressSink, SkipDetail,
    SkipReason,
};
pub use scale::{normalize, ScaleMethod, ScaleMetrics};
pub use summary::{summarize, CategoricalStats, DatasetSummary, ValueCount};

/// Tunables of the operation set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// One-hot encoding skips columns with more distinct values than this.
    pub max_onehot_categories: usize,
    /// Upper bound on the number of donors used by KNN imputation.
    pub knn_max_neighbors: usize,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            max_onehot_categories: 20,
            knn_max_neighbors: 5,
        }
    }
}
