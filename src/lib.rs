//! `dataprep-engine` is a stateful, in-memory dataset engine.
//!
//! A client uploads a tabular dataset once and then applies cleaning operations to it in place:
//! missing-value imputation, categorical encoding, outlier removal, deduplication, null-row
//! removal and scaling. Every dataset keeps a snapshot of what was ingested (so it can be reset),
//! an append-only log of the operations applied, and a status that can be polled while an
//! operation runs on the engine's worker pool.
//!
//! The primary entrypoint is [`Engine`]. HTTP routing, sessions and upload validation live in the
//! caller; every result type here implements `serde::Serialize`.
//!
//! ## What you can ingest
//!
//! - **CSV**: `.csv` (header row required)
//! - **JSON**: `.json` / `.ndjson` (array of objects, a single object, or newline-delimited objects;
//!   nested objects become dotted column names such as `user.name`)
//! - **Excel/workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! Column kinds are inferred: a column is numeric when every non-missing cell is a finite number,
//! otherwise categorical. Empty cells and markers like `NA` or `null` are missing values (see
//! [`ingestion::MISSING_MARKERS`]).
//!
//! ## Quick example
//!
//! ```rust
//! use dataprep_engine::processing::{ImputeStrategy, OutlierMethod};
//! use dataprep_engine::{Engine, EngineOptions};
//!
//! # fn main() -> Result<(), dataprep_engine::EngineError> {
//! let engine = Engine::new(EngineOptions::default())?;
//! let resp = engine.ingest(b"age,city\n20,A\n21,B\n,A\n22,\n1000,C\n", "people.csv", None)?;
//! let id = resp.id.to_string();
//!
//! engine.impute(&id, Some(&["age".to_string()]), ImputeStrategy::Mean)?;
//! let removed = engine.remove_outliers(&id, None, OutlierMethod::Iqr, 1.5)?;
//! assert_eq!(removed.total_removed, 1);
//!
//! // Undo everything.
//! let summary = engine.reset(&id)?;
//! assert_eq!(summary.shape, (5, 2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Background operations
//!
//! ```rust
//! use dataprep_engine::operation::Operation;
//! use dataprep_engine::{Engine, EngineOptions};
//!
//! # fn main() -> Result<(), dataprep_engine::EngineError> {
//! let engine = Engine::new(EngineOptions::default())?;
//! let id = engine.ingest(b"a\n1\n1\n", "dups.csv", None)?.id.to_string();
//!
//! // Requests can arrive as JSON from the HTTP layer.
//! let op: Operation = serde_json::from_str(r#"{"operation": "remove_duplicates"}"#)?;
//! let handle = engine.spawn(&id, op)?;
//! // Meanwhile `engine.get_status(&id)` reports progress.
//! handle.join()?;
//! assert_eq!(engine.get_status(&id)?.progress, 100);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: the facade
//! - [`registry`] and [`dataset`]: dataset storage, the per-dataset state machine, previews and samples
//! - [`processing`]: the operations and the summary/quality/correlation reports
//! - [`execution`]: the worker pool, job throttling, events and metrics
//! - [`ingestion`]: format readers and type inference
//! - [`config`], [`logging`], [`error`]

#[macro_use]
mod macros;

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod logging;
pub mod operation;
pub mod processing;
pub mod registry;
pub mod stats;
pub mod types;
pub mod validation;

pub use config::EngineOptions;
pub use dataset::{Dataset, DatasetId, PreviewView};
pub use engine::{Engine, IngestResponse};
pub use error::{EngineError, EngineResult, ErrorKind, IngestionError, IngestionResult, ValidationError};
pub use operation::{Operation, OperationKind, OperationOutcome};
pub use registry::DatasetRegistry;
