//! The engine facade called by the HTTP layer.
//!
//! Every call names its dataset by the id string handed out by [`Engine::ingest`]; malformed ids
//! are validation errors and unknown ids are [`EngineError::NotFound`].

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::EngineOptions;
use crate::dataset::{
    Dataset, DatasetId, DatasetInfo, Export, OperationRecord, Preview, PreviewView, Sample, StatusReport,
};
use crate::error::{EngineError, EngineResult};
use crate::execution::{JobHandle, JobMetricsSnapshot, JobRunner};
use crate::ingestion::{self, IngestionFormat, IngestionOptions};
use crate::operation::{Operation, OperationOutcome};
use crate::processing::{
    ColumnReport, CorrelationResult, DatasetSummary, EncodeMethod, EncodeMetrics, ImputeMetrics, ImputeStrategy,
    OutlierMethod, OutlierReport, QualityReport, RowRemovalReport, ScaleMethod, ScaleMetrics,
};
use crate::registry::DatasetRegistry;
use crate::types::Table;

/// Rows included in an [`IngestResponse`].
pub const INGEST_PREVIEW_ROWS: usize = 10;

/// Answer to a successful ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResponse {
    pub id: DatasetId,
    pub summary: DatasetSummary,
    /// The first rows of the table.
    pub preview: Preview,
}

/// Owns the dataset registry and the worker pool.
#[derive(Debug)]
pub struct Engine {
    registry: DatasetRegistry,
    jobs: JobRunner,
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> EngineResult<Self> {
        let mut registry = DatasetRegistry::new(options.dataset_settings());
        if let Some(seed) = options.sample_seed {
            registry = registry.with_sample_seed(seed);
        }
        let mut jobs = JobRunner::new(options.num_threads, options.max_in_flight_jobs)?;
        if let Some(observer) = &options.observer {
            registry = registry.with_observer(Arc::clone(observer));
            jobs = jobs.with_observer(Arc::clone(observer));
        }
        info!(?options, "engine started");
        Ok(Self {
            registry,
            jobs,
            options,
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// Parse an uploaded payload and register it.
    ///
    /// `name` is the upload's file name; when `format` is `None` its extension selects the
    /// format.
    pub fn ingest(&self, bytes: &[u8], name: &str, format: Option<IngestionFormat>) -> EngineResult<IngestResponse> {
        let table = ingestion::ingest_from_bytes(bytes, name, &self.ingestion_options(format))?;
        Ok(self.register(table, name))
    }

    /// Read a file and register it under its file name.
    pub fn ingest_path(&self, path: impl AsRef<Path>, format: Option<IngestionFormat>) -> EngineResult<IngestResponse> {
        let path = path.as_ref();
        let table = ingestion::ingest_from_path(path, &self.ingestion_options(format))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.register(table, &name))
    }

    /// Register an already-built table.
    pub fn ingest_table(&self, table: Table, name: Option<String>) -> IngestResponse {
        let dataset = self.registry.register(table, name);
        ingest_response(&dataset)
    }

    /// Look up a dataset by its id string.
    pub fn dataset(&self, id: &str) -> EngineResult<Arc<Dataset>> {
        let id: DatasetId = id.parse()?;
        self.registry.get(&id)
    }

    /// Remove a dataset. Errors with `NotFound` if it was not registered.
    pub fn delete(&self, id: &str) -> EngineResult<()> {
        let parsed: DatasetId = id.parse()?;
        if self.registry.delete(&parsed) {
            Ok(())
        } else {
            Err(EngineError::NotFound { id: id.to_string() })
        }
    }

    pub fn get_status(&self, id: &str) -> EngineResult<StatusReport> {
        Ok(self.dataset(id)?.status())
    }

    pub fn get_summary(&self, id: &str) -> EngineResult<DatasetSummary> {
        Ok(self.dataset(id)?.summary())
    }

    pub fn get_preview(&self, id: &str, page: usize, per_page: usize, view: PreviewView) -> EngineResult<Preview> {
        Ok(self.dataset(id)?.preview(page, per_page, view))
    }

    pub fn info(&self, id: &str) -> EngineResult<DatasetInfo> {
        Ok(self.dataset(id)?.info())
    }

    pub fn impute(
        &self,
        id: &str,
        columns: Option<&[String]>,
        strategy: ImputeStrategy,
    ) -> EngineResult<ColumnReport<ImputeMetrics>> {
        self.dataset(id)?.impute(columns, strategy)
    }

    pub fn encode(
        &self,
        id: &str,
        columns: Option<&[String]>,
        method: EncodeMethod,
    ) -> EngineResult<ColumnReport<EncodeMetrics>> {
        self.dataset(id)?.encode(columns, method)
    }

    pub fn remove_outliers(
        &self,
        id: &str,
        columns: Option<&[String]>,
        method: OutlierMethod,
        threshold: f64,
    ) -> EngineResult<OutlierReport> {
        self.dataset(id)?.remove_outliers(columns, method, threshold)
    }

    pub fn remove_duplicates(&self, id: &str) -> EngineResult<RowRemovalReport> {
        self.dataset(id)?.remove_duplicates()
    }

    pub fn drop_missing(&self, id: &str, columns: Option<&[String]>) -> EngineResult<RowRemovalReport> {
        self.dataset(id)?.drop_missing(columns)
    }

    pub fn normalize(
        &self,
        id: &str,
        columns: Option<&[String]>,
        method: ScaleMethod,
    ) -> EngineResult<ColumnReport<ScaleMetrics>> {
        self.dataset(id)?.normalize(columns, method)
    }

    /// Correlation of the numeric columns, computed on the engine's worker pool.
    pub fn correlate(&self, id: &str) -> EngineResult<CorrelationResult> {
        let dataset = self.dataset(id)?;
        Ok(self.jobs.install(|| dataset.correlate()))
    }

    pub fn quality_report(&self, id: &str) -> EngineResult<QualityReport> {
        Ok(self.dataset(id)?.quality_report())
    }

    /// Restore the ingested table; answers with its summary.
    pub fn reset(&self, id: &str) -> EngineResult<DatasetSummary> {
        Ok(self.dataset(id)?.reset())
    }

    pub fn export(&self, id: &str) -> EngineResult<Export> {
        self.dataset(id)?.export()
    }

    pub fn history(&self, id: &str) -> EngineResult<Vec<OperationRecord>> {
        Ok(self.dataset(id)?.history())
    }

    pub fn sample(&self, id: &str, n: usize, force_refresh: bool) -> EngineResult<Sample> {
        Ok(self.dataset(id)?.sample(n, force_refresh))
    }

    /// Run a typed operation request on the calling thread.
    pub fn apply(&self, id: &str, operation: &Operation) -> EngineResult<OperationOutcome> {
        self.dataset(id)?.apply(operation)
    }

    /// Run a typed operation request on the worker pool.
    ///
    /// Returns once the job is queued; poll [`Engine::get_status`] or join the handle. Unknown
    /// ids fail here, before anything is queued.
    pub fn spawn(&self, id: &str, operation: Operation) -> EngineResult<JobHandle<OperationOutcome>> {
        let dataset = self.dataset(id)?;
        let kind = operation.kind();
        Ok(self
            .jobs
            .submit(dataset.id(), kind, move || dataset.apply(&operation)))
    }

    pub fn job_metrics(&self) -> JobMetricsSnapshot {
        self.jobs.metrics().snapshot()
    }

    fn ingestion_options(&self, format: Option<IngestionFormat>) -> IngestionOptions {
        IngestionOptions {
            format,
            excel_sheet: None,
            max_rows: self.options.max_rows,
            observer: self.options.ingestion_observer.clone(),
            alert_at_or_above: self.options.alert_at_or_above,
        }
    }

    fn register(&self, table: Table, name: &str) -> IngestResponse {
        let dataset = self.registry.register(table, Some(name.to_string()));
        ingest_response(&dataset)
    }
}

fn ingest_response(dataset: &Dataset) -> IngestResponse {
    IngestResponse {
        id: dataset.id(),
        summary: dataset.summary(),
        preview: dataset.preview(1, INGEST_PREVIEW_ROWS, PreviewView::Head),
    }
}
