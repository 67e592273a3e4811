//! A single uploaded dataset: its live table, the pristine original, the operation log, the
//! sample cache and the status tracker.
//!
//! Every mutating operation follows the same path under the dataset lock:
//!
//! 1. validate the arguments against the current table (errors leave everything untouched)
//! 2. mark the status `processing`
//! 3. run the operation on a working copy of the table, reporting progress
//! 4. commit the copy, clear the sample cache, append to the log and mark the status `completed`
//!
//! If step 3 fails the committed table is left as it was and the status becomes `error`.
//!
//! The status sits behind its own lock, so [`Dataset::status`] never waits on a running
//! operation.

mod history;
mod sample;
mod status;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult, ValidationError};
use crate::execution::{EngineEvent, EngineObserver};
use crate::operation::{Operation, OperationKind, OperationOutcome};
use crate::processing::{
    self, ColumnReport, CorrelationResult, DatasetSummary, EncodeMethod, EncodeMetrics,
    ImputeMetrics, ImputeStrategy, OutlierMethod, OutlierReport, ProcessingOptions, ProgressSink,
    QualityReport, RowRemovalReport, ScaleMethod, ScaleMetrics,
};
use crate::types::{ColumnKind, Table, Value};
use crate::validation::{columns_of_kind, validate_columns, validate_threshold};

pub use history::OperationRecord;
pub use sample::Sample;
pub use status::{ProcessingState, StatusReport, StatusTracker};

use sample::SampleCache;

/// Opaque dataset identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DatasetId(Uuid);

impl DatasetId {
    /// A fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight characters of the textual form.
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(8).collect()
    }
}

impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for DatasetId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ValidationError::InvalidDatasetId { id: s.to_string() })
    }
}

named_options! {
    /// Which rows a preview shows.
    pub enum PreviewView ("view") {
        /// Page through the table from the top.
        #[default]
        Head = "head",
        /// The last `per_page` rows.
        Tail = "tail",
        /// A random sample, served from the sample cache.
        Random = "random",
    }
}

/// Per-dataset tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSettings {
    pub processing: ProcessingOptions,
    /// How long a drawn sample is reused.
    pub sample_ttl: Duration,
    /// Upper bound on `per_page` in previews.
    pub max_preview_rows: usize,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            processing: ProcessingOptions::default(),
            sample_ttl: Duration::from_secs(30),
            max_preview_rows: 50,
        }
    }
}

/// One page of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub view: PreviewView,
    pub page: usize,
    pub per_page: usize,
    pub total_rows: usize,
    pub total_pages: usize,
}

/// The current table rendered as CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Descriptive metadata of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub id: DatasetId,
    pub name: Option<String>,
    pub shape: (usize, usize),
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Number of entries in the operation log.
    pub operations: usize,
}

struct DatasetState {
    table: Table,
    original: Table,
    log: Vec<OperationRecord>,
    sample: SampleCache,
    rng: Pcg64,
}

/// A registered dataset. Shared between callers as `Arc<Dataset>`.
pub struct Dataset {
    id: DatasetId,
    name: Option<String>,
    created_at: DateTime<Utc>,
    last_accessed: Mutex<DateTime<Utc>>,
    state: Mutex<DatasetState>,
    status: StatusTracker,
    settings: DatasetSettings,
    observer: Option<Arc<dyn EngineObserver>>,
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .field("observer_set", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

/// Forwards operation progress to the status tracker and the observer.
struct OperationProgress<'a> {
    dataset: &'a Dataset,
    operation: OperationKind,
}

impl ProgressSink for OperationProgress<'_> {
    fn report(&self, progress: u8, message: &str) {
        self.dataset.status.progress(progress, message);
        self.dataset.emit(EngineEvent::OperationProgress {
            dataset: self.dataset.id,
            operation: self.operation,
            progress,
        });
    }
}

impl Dataset {
    /// Wrap `table` as a new dataset with a fresh id and an OS-seeded sampler.
    pub fn new(table: Table, settings: DatasetSettings) -> Self {
        let now = Utc::now();
        Self {
            id: DatasetId::new(),
            name: None,
            created_at: now,
            last_accessed: Mutex::new(now),
            state: Mutex::new(DatasetState {
                original: table.clone(),
                table,
                log: Vec::new(),
                sample: SampleCache::new(settings.sample_ttl),
                rng: Pcg64::from_rng(&mut rand::rng()),
            }),
            status: StatusTracker::new(),
            settings,
            observer: None,
        }
    }

    /// Source name (usually the uploaded file name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Seed the sampler for reproducible samples.
    pub fn with_seed(self, seed: u64) -> Self {
        self.lock().rng = Pcg64::seed_from_u64(seed);
        self
    }

    /// Attach an observer for operation events.
    pub fn with_observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn info(&self) -> DatasetInfo {
        let state = self.lock();
        DatasetInfo {
            id: self.id,
            name: self.name.clone(),
            shape: state.table.shape(),
            created_at: self.created_at,
            last_accessed: *self.last_accessed.lock().unwrap_or_else(PoisonError::into_inner),
            operations: state.log.len(),
        }
    }

    /// Current status. Never waits on a running operation.
    pub fn status(&self) -> StatusReport {
        self.status.snapshot()
    }

    /// Copy of the current table.
    pub fn table(&self) -> Table {
        self.touch();
        self.lock().table.clone()
    }

    pub fn summary(&self) -> DatasetSummary {
        self.touch();
        processing::summarize(&self.lock().table)
    }

    pub fn quality_report(&self) -> QualityReport {
        self.touch();
        processing::quality_report(&self.lock().table)
    }

    /// Pairwise correlation of the numeric columns. Not recorded in the operation log.
    ///
    /// Runs on a snapshot of the table; the dataset lock is released before the kernel starts.
    pub fn correlate(&self) -> CorrelationResult {
        let table = self.table();
        processing::correlate(&table)
    }

    /// Entries of the operation log, oldest first.
    pub fn history(&self) -> Vec<OperationRecord> {
        self.touch();
        self.lock().log.clone()
    }

    /// Up to `n` random rows; see [`PreviewView::Random`] for the caching rules.
    pub fn sample(&self, n: usize, force_refresh: bool) -> Sample {
        self.touch();
        let mut guard = self.lock();
        let state = &mut *guard;
        state.sample.get(&state.table, n, force_refresh, &mut state.rng)
    }

    /// A page of rows.
    ///
    /// `page` counts from 1 (0 is treated as 1); `per_page` is clamped to
    /// `[1, max_preview_rows]`.
    pub fn preview(&self, page: usize, per_page: usize, view: PreviewView) -> Preview {
        self.touch();
        let page = page.max(1);
        let per_page = per_page.clamp(1, self.settings.max_preview_rows.max(1));

        let mut guard = self.lock();
        let state = &mut *guard;
        let total_rows = state.table.row_count();
        let rows = match view {
            PreviewView::Head => {
                let start = (page - 1).saturating_mul(per_page);
                state.table.rows(start..start.saturating_add(per_page))
            }
            PreviewView::Tail => state.table.rows(total_rows.saturating_sub(per_page)..total_rows),
            PreviewView::Random => {
                state
                    .sample
                    .get(&state.table, per_page, false, &mut state.rng)
                    .rows
            }
        };

        Preview {
            columns: state.table.column_names(),
            rows,
            view,
            page,
            per_page,
            total_rows,
            total_pages: total_rows.div_ceil(per_page),
        }
    }

    /// Render the current table as CSV. Missing values become empty fields.
    pub fn export(&self) -> EngineResult<Export> {
        self.touch();
        let state = self.lock();
        let table = &state.table;

        let write_err = |e: csv::Error| EngineError::internal(format!("failed to write csv: {e}"));
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(table.column_names()).map_err(write_err)?;
        for i in 0..table.row_count() {
            writer
                .write_record(table.row(i).iter().map(Value::to_cell_string))
                .map_err(write_err)?;
        }
        let content = writer
            .into_inner()
            .map_err(|e| EngineError::internal(format!("failed to flush csv: {e}")))?;

        let filename = match &self.name {
            Some(name) => format!("processed_{name}"),
            None => format!("processed_data_{}.csv", self.id.short()),
        };
        debug!(dataset = %self.id, bytes = content.len(), "dataset exported");
        Ok(Export { filename, content })
    }

    /// Restore the table ingested originally, clear the log and the sample cache.
    ///
    /// Returns the summary of the restored table, taken before the lock is released.
    pub fn reset(&self) -> DatasetSummary {
        self.touch();
        let mut guard = self.lock();
        let state = &mut *guard;
        state.table = state.original.clone();
        state.log.clear();
        state.sample.clear();
        let summary = processing::summarize(&state.table);
        drop(guard);

        self.status.reset();
        self.emit(EngineEvent::DatasetReset { dataset: self.id });
        info!(dataset = %self.id, "dataset reset to original state");
        summary
    }

    /// Fill missing values. `columns = None` targets every column.
    pub fn impute(
        &self,
        columns: Option<&[String]>,
        strategy: ImputeStrategy,
    ) -> EngineResult<ColumnReport<ImputeMetrics>> {
        let opts = &self.settings.processing;
        self.mutate(
            OperationKind::Impute,
            json!({ "columns": columns, "strategy": strategy }),
            |table| validate_columns(table, columns, None),
            |table, targets, progress| {
                let report = processing::impute(table, &targets, strategy, opts, progress);
                (report, "Missing value imputation completed".to_string())
            },
        )
    }

    /// Encode categorical columns. `columns = None` targets every categorical column.
    pub fn encode(
        &self,
        columns: Option<&[String]>,
        method: EncodeMethod,
    ) -> EngineResult<ColumnReport<EncodeMetrics>> {
        let opts = &self.settings.processing;
        self.mutate(
            OperationKind::Encode,
            json!({ "columns": columns, "method": method }),
            |table| columns_of_kind(table, columns, ColumnKind::Categorical),
            |table, targets, progress| {
                let report = processing::encode(table, &targets, method, opts, progress);
                (report, "Categorical encoding completed".to_string())
            },
        )
    }

    /// Drop rows holding outliers. `columns = None` targets every numeric column.
    pub fn remove_outliers(
        &self,
        columns: Option<&[String]>,
        method: OutlierMethod,
        threshold: f64,
    ) -> EngineResult<OutlierReport> {
        self.mutate(
            OperationKind::RemoveOutliers,
            json!({ "columns": columns, "method": method, "threshold": threshold }),
            |table| {
                let threshold = validate_threshold(threshold)?;
                Ok((columns_of_kind(table, columns, ColumnKind::Numeric)?, threshold))
            },
            |table, (targets, threshold), progress| {
                let report = processing::remove_outliers(table, &targets, method, threshold, progress);
                let message = format!("Outlier removal completed. Removed {} rows", report.total_removed);
                (report, message)
            },
        )
    }

    /// Drop exact duplicate rows, keeping the first occurrence.
    pub fn remove_duplicates(&self) -> EngineResult<RowRemovalReport> {
        self.mutate(
            OperationKind::RemoveDuplicates,
            json!({}),
            |_| Ok(()),
            |table, (), progress| {
                progress.report(50, OperationKind::RemoveDuplicates.start_message());
                let report = processing::remove_duplicates(table);
                let message = format!("Removed {} duplicate rows", report.removed_count);
                (report, message)
            },
        )
    }

    /// Drop rows with a missing value in `columns` (any column when `None`).
    pub fn drop_missing(&self, columns: Option<&[String]>) -> EngineResult<RowRemovalReport> {
        self.mutate(
            OperationKind::DropMissing,
            json!({ "columns": columns }),
            |table| validate_columns(table, columns, None),
            |table, targets, _| {
                let report = processing::drop_missing_rows(table, &targets);
                let message = format!("Removed {} rows with null values", report.removed_count);
                (report, message)
            },
        )
    }

    /// Scale numeric columns. `columns = None` targets every numeric column.
    pub fn normalize(
        &self,
        columns: Option<&[String]>,
        method: ScaleMethod,
    ) -> EngineResult<ColumnReport<ScaleMetrics>> {
        self.mutate(
            OperationKind::Normalize,
            json!({ "columns": columns, "method": method }),
            |table| columns_of_kind(table, columns, ColumnKind::Numeric),
            |table, targets, progress| {
                let report = processing::normalize(table, &targets, method, progress);
                (report, "Data normalization completed".to_string())
            },
        )
    }

    /// Run a typed operation request.
    pub fn apply(&self, operation: &Operation) -> EngineResult<OperationOutcome> {
        match operation {
            Operation::Impute { columns, strategy } => self
                .impute(columns.as_deref(), *strategy)
                .map(OperationOutcome::Impute),
            Operation::Encode { columns, method } => self
                .encode(columns.as_deref(), *method)
                .map(OperationOutcome::Encode),
            Operation::RemoveOutliers {
                columns,
                method,
                threshold,
            } => self
                .remove_outliers(columns.as_deref(), *method, *threshold)
                .map(OperationOutcome::Outliers),
            Operation::RemoveDuplicates => self.remove_duplicates().map(OperationOutcome::Rows),
            Operation::DropMissing { columns } => {
                self.drop_missing(columns.as_deref()).map(OperationOutcome::Rows)
            }
            Operation::Normalize { columns, method } => self
                .normalize(columns.as_deref(), *method)
                .map(OperationOutcome::Normalize),
        }
    }

    /// Validate, run on a working copy, then commit. See the module docs.
    fn mutate<P, R>(
        &self,
        operation: OperationKind,
        parameters: serde_json::Value,
        plan: impl FnOnce(&Table) -> Result<P, ValidationError>,
        run: impl FnOnce(&mut Table, P, &dyn ProgressSink) -> (R, String),
    ) -> EngineResult<R>
    where
        R: Serialize,
    {
        self.touch();
        let mut state = self.lock();
        let plan = plan(&state.table).inspect_err(|e| {
            debug!(dataset = %self.id, %operation, error = %e, "operation rejected");
        })?;

        self.status.begin(operation);
        self.emit(EngineEvent::OperationStarted {
            dataset: self.id,
            operation,
        });
        info!(dataset = %self.id, %operation, %parameters, "operation started");
        let start = Instant::now();

        let mut working = state.table.clone();
        let sink = OperationProgress {
            dataset: self,
            operation,
        };
        let (result, message) = panic::catch_unwind(AssertUnwindSafe(|| run(&mut working, plan, &sink)))
            .map_err(|_| self.fail(operation, EngineError::internal(format!("{operation} panicked"))))?;
        let results = serde_json::to_value(&result).map_err(|e| self.fail(operation, e.into()))?;

        state.table = working;
        state.sample.clear();
        state.log.push(OperationRecord {
            operation,
            parameters,
            results,
            timestamp: Utc::now(),
        });
        let shape = state.table.shape();
        drop(state);

        let elapsed = start.elapsed();
        self.status.complete(message);
        self.emit(EngineEvent::OperationFinished {
            dataset: self.id,
            operation,
            elapsed,
        });
        info!(dataset = %self.id, %operation, ?elapsed, rows = shape.0, columns = shape.1, "operation completed");
        Ok(result)
    }

    fn fail(&self, operation: OperationKind, err: EngineError) -> EngineError {
        error!(dataset = %self.id, %operation, error = %err, "operation failed");
        let message = err.public_message();
        self.status.fail(message.clone());
        self.emit(EngineEvent::OperationFailed {
            dataset: self.id,
            operation,
            message,
        });
        err
    }

    fn lock(&self) -> MutexGuard<'_, DatasetState> {
        // The committed table is only replaced after a run succeeds, so it survives a poisoning panic.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn touch(&self) {
        *self.last_accessed.lock().unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{ColumnStatus, NoProgress};
    use crate::types::Column;

    fn scenario() -> Dataset {
        Dataset::new(
            Table::new(vec![
                Column::numeric("age", vec![Some(20.0), Some(21.0), None, Some(22.0), Some(1000.0)]),
                Column::categorical(
                    "city",
                    vec![
                        Some("A".to_string()),
                        Some("B".to_string()),
                        Some("A".to_string()),
                        None,
                        Some("C".to_string()),
                    ],
                ),
            ])
            .unwrap(),
            DatasetSettings::default(),
        )
        .with_seed(11)
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ids_round_trip_through_text() {
        let id = DatasetId::new();
        assert_eq!(id.to_string().parse::<DatasetId>().unwrap(), id);
        assert_eq!(id.short().len(), 8);
        assert!(matches!(
            "not-a-uuid".parse::<DatasetId>(),
            Err(ValidationError::InvalidDatasetId { .. })
        ));
    }

    #[test]
    fn mean_imputation_fills_the_pre_imputation_mean() {
        let ds = scenario();
        let report = ds.impute(Some(&names(&["age"])), ImputeStrategy::Mean).unwrap();
        let m = report.get("age").unwrap().metrics().unwrap();
        assert_eq!(m.fill_value, Some(Value::Number(265.75)));
        assert_eq!(ds.table().column("age").unwrap().missing_count(), 0);

        let status = ds.status();
        assert_eq!(status.status, ProcessingState::Completed);
        assert_eq!(status.progress, 100);
        assert_eq!(status.message, "Missing value imputation completed");
    }

    #[test]
    fn validation_errors_leave_table_status_and_log_untouched() {
        let ds = scenario();
        let before = ds.table();
        let err = ds
            .remove_outliers(Some(&names(&["city"])), OutlierMethod::Iqr, 1.5)
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::WrongType { .. })));
        let err = ds.remove_outliers(None, OutlierMethod::Zscore, 0.0).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::NonPositiveThreshold { .. })
        ));

        assert_eq!(ds.table(), before);
        assert_eq!(ds.status().status, ProcessingState::Idle);
        assert!(ds.history().is_empty());
    }

    #[test]
    fn failed_runs_do_not_commit_the_working_copy() {
        let ds = scenario();
        let before = ds.table();
        let err = ds
            .mutate(
                OperationKind::Normalize,
                json!({}),
                |_| Ok(()),
                |table, (), _| -> (RowRemovalReport, String) {
                    table.retain_rows(&[false; 5]);
                    panic!("kernel bug")
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
        assert_eq!(ds.table(), before);
        assert_eq!(ds.status().status, ProcessingState::Error);
        assert!(ds.history().is_empty());

        // The dataset stays usable.
        assert!(ds.remove_duplicates().is_ok());
    }

    #[test]
    fn every_mutation_is_logged_and_reset_restores_the_original() {
        let ds = scenario();
        let original = ds.table();
        ds.remove_outliers(None, OutlierMethod::Iqr, 1.5).unwrap();
        ds.encode(None, EncodeMethod::Onehot).unwrap();
        assert_eq!(ds.table().row_count(), 4);

        let log = ds.history();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].operation, OperationKind::RemoveOutliers);
        assert_eq!(log[0].results["total_removed"], 1);
        assert_eq!(log[1].parameters["method"], "onehot");
        assert!(matches!(ds.correlate(), CorrelationResult::Computed(_)));
        assert_eq!(ds.history().len(), 2);

        let summary = ds.reset();
        assert_eq!(summary.shape, original.shape());
        assert_eq!(ds.table(), original);
        assert!(ds.history().is_empty());
        assert_eq!(ds.status().status, ProcessingState::Idle);
    }

    #[test]
    fn remove_duplicates_reports_the_count_in_its_status() {
        let ds = Dataset::new(
            Table::new(vec![Column::numeric("x", vec![Some(1.0), Some(1.0), Some(2.0)])]).unwrap(),
            DatasetSettings::default(),
        );
        assert_eq!(ds.remove_duplicates().unwrap().removed_count, 1);
        assert_eq!(ds.status().message, "Removed 1 duplicate rows");
        assert_eq!(ds.remove_duplicates().unwrap().removed_count, 0);
    }

    #[test]
    fn samples_are_cached_until_the_table_changes() {
        let ds = scenario();
        let first = ds.sample(3, false);
        let second = ds.sample(3, false);
        assert_eq!(first.row_indices, second.row_indices);
        assert!(second.cached);

        ds.remove_outliers(None, OutlierMethod::Iqr, 1.5).unwrap();
        let after = ds.sample(3, false);
        assert!(!after.cached);
        assert!(after.rows.iter().all(|r| r[0] != Value::Number(1000.0)));
    }

    #[test]
    fn preview_pages_and_views() {
        let ds = scenario();
        let p = ds.preview(2, 2, PreviewView::Head);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.rows[0][0], Value::Null);
        assert_eq!(p.rows.len(), 2);

        let p = ds.preview(0, 1_000, PreviewView::Tail);
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 50);
        assert_eq!(p.rows.len(), 5);

        let p = ds.preview(1, 2, PreviewView::Random);
        assert_eq!(p.rows.len(), 2);
        assert_eq!(p.view.as_str(), "random");
    }

    #[test]
    fn export_writes_csv_with_empty_missing_cells() {
        let ds = scenario().with_name("people.csv");
        let export = ds.export().unwrap();
        assert_eq!(export.filename, "processed_people.csv");
        let text = String::from_utf8(export.content).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "age,city");
        assert_eq!(lines[3], ",A");
        assert_eq!(lines[4], "22,");

        let unnamed = scenario();
        assert_eq!(
            unnamed.export().unwrap().filename,
            format!("processed_data_{}.csv", unnamed.id().short())
        );
    }

    #[test]
    fn progress_reaches_the_status_tracker() {
        let ds = scenario();
        let sink = OperationProgress {
            dataset: &ds,
            operation: OperationKind::Impute,
        };
        sink.report(40, "Processing column: city");
        assert_eq!(ds.status().progress, 40);
        NoProgress.report(90, "ignored");
        assert_eq!(ds.status().progress, 40);
    }

    #[test]
    fn apply_routes_typed_requests() {
        let ds = scenario();
        let op: Operation = serde_json::from_str(r#"{"operation": "encode", "columns": ["city"]}"#).unwrap();
        match ds.apply(&op).unwrap() {
            OperationOutcome::Encode(report) => {
                assert_eq!(report.get("city").unwrap().status(), ColumnStatus::Success);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ds.info().operations, 1);
    }
}
