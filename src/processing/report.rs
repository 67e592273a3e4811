//! Per-column result plumbing shared by the batch operations.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ColumnError;

/// Receives progress updates while an operation walks its columns.
pub trait ProgressSink {
    /// `progress` is a percentage in `[0, 100]`.
    fn report(&self, progress: u8, message: &str);
}

/// A sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: u8, _message: &str) {}
}

/// Status tag of a per-column outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStatus {
    Success,
    Skipped,
    Error,
    NoMissing,
}

/// Why a column was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Every value in the column is missing.
    AllNull,
    /// One-hot encoding would produce too many indicator columns.
    TooManyCategories,
}

/// Details attached to a skipped column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipDetail {
    pub reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_values: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl SkipDetail {
    pub(crate) fn all_null() -> Self {
        Self {
            reason: SkipReason::AllNull,
            unique_values: None,
            recommendation: None,
        }
    }
}

/// Outcome for one column of a batch operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ColumnOutcome<M> {
    /// The column was transformed; `M` holds the operation's metrics.
    Success(M),
    /// Nothing to impute.
    NoMissing { filled: usize },
    /// The column was deliberately left unchanged.
    Skipped(SkipDetail),
    /// The column failed; siblings were still processed.
    Error { reason: String },
}

impl<M> ColumnOutcome<M> {
    /// Status tag.
    pub fn status(&self) -> ColumnStatus {
        match self {
            Self::Success(_) => ColumnStatus::Success,
            Self::NoMissing { .. } => ColumnStatus::NoMissing,
            Self::Skipped(_) => ColumnStatus::Skipped,
            Self::Error { .. } => ColumnStatus::Error,
        }
    }

    /// Metrics of a successful column.
    pub fn metrics(&self) -> Option<&M> {
        match self {
            Self::Success(m) => Some(m),
            _ => None,
        }
    }
}

/// Map keyed by column name, in table column order.
pub type ColumnMap<T> = IndexMap<String, T>;

/// Ordered per-column outcomes of one operation.
pub type ColumnReport<M> = ColumnMap<ColumnOutcome<M>>;

/// `floor(100 * done / total)`, `0` when there is nothing to do.
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    u8::try_from(done.min(total) * 100 / total).unwrap_or(100)
}

/// Run `op` on every column, folding the outcomes into a [`ColumnReport`].
///
/// A failing column is recorded as [`ColumnOutcome::Error`]; the walk always continues.
pub(crate) fn fold_columns<M, F>(
    columns: &[String],
    progress: &dyn ProgressSink,
    verb: &str,
    mut op: F,
) -> ColumnReport<M>
where
    F: FnMut(&str) -> Result<ColumnOutcome<M>, ColumnError>,
{
    let total = columns.len();
    columns
        .iter()
        .enumerate()
        .fold(ColumnReport::new(), |mut report, (i, name)| {
            progress.report(percent(i, total), &format!("{verb} column: {name}"));
            let outcome = op(name).unwrap_or_else(|e| {
                tracing::warn!(column = %name, error = %e, "column processing failed");
                ColumnOutcome::Error {
                    reason: e.to_string(),
                }
            });
            report.insert(name.clone(), outcome);
            report
        })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(u8, String)>>);

    impl ProgressSink for Recorder {
        fn report(&self, progress: u8, message: &str) {
            self.0.borrow_mut().push((progress, message.to_string()));
        }
    }

    #[derive(Debug, PartialEq, Serialize)]
    struct Filled {
        filled: usize,
    }

    #[test]
    fn fold_isolates_failures_and_reports_progress() {
        let cols: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let rec = Recorder::default();
        let report = fold_columns(&cols, &rec, "Processing", |name| match name {
            "b" => Err(ColumnError::Missing("b".to_string())),
            _ => Ok(ColumnOutcome::Success(Filled { filled: 1 })),
        });

        assert_eq!(report.len(), 3);
        assert_eq!(report.get("a").unwrap().status(), ColumnStatus::Success);
        assert_eq!(report.get("b").unwrap().status(), ColumnStatus::Error);
        assert_eq!(report.get("c").unwrap().status(), ColumnStatus::Success);

        let progress: Vec<u8> = rec.0.borrow().iter().map(|(p, _)| *p).collect();
        assert_eq!(progress, vec![0, 33, 66]);
        assert_eq!(rec.0.borrow()[1].1, "Processing column: b");
    }

    #[test]
    fn outcomes_serialize_with_a_status_tag_in_column_order() {
        let mut report: ColumnReport<Filled> = ColumnReport::new();
        report.insert("z".to_string(), ColumnOutcome::Success(Filled { filled: 2 }));
        report.insert("a".to_string(), ColumnOutcome::NoMissing { filled: 0 });
        report.insert("m".to_string(), ColumnOutcome::Skipped(SkipDetail::all_null()));

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"z":{"status":"success","filled":2},"a":{"status":"no_missing","filled":0},"m":{"status":"skipped","reason":"all_null"}}"#
        );
    }

    #[test]
    fn percent_is_floored() {
        assert_eq!(percent(0, 3), 0);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(0, 0), 0);
    }
}
