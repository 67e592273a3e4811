//! Unified ingestion entrypoint.
//!
//! [`ingest_from_path`] reads a file, [`ingest_from_bytes`] reads an uploaded payload. Both
//! produce a typed [`Table`] with inferred column kinds.
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension (or
//!   the upload's file name).
//! - If an [`IngestionObserver`] is provided, success/failure/alerts are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::Table;

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects, a single object, or NDJSON.
    Json,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<IngestionFormat>,
    /// Sheet to read from a workbook; the first sheet when `None`.
    pub excel_sheet: Option<String>,
    /// Payloads with more data rows are rejected. `None` disables the limit.
    pub max_rows: Option<usize>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("excel_sheet", &self.excel_sheet)
            .field("max_rows", &self.max_rows)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            excel_sheet: None,
            max_rows: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with the table shape
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use dataprep_engine::ingestion::{ingest_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), dataprep_engine::IngestionError> {
/// // Uses `.csv` to select CSV ingestion.
/// let table = ingest_from_path("people.csv", &IngestionOptions::default())?;
/// println!("rows={}", table.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Table> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };
    let ctx = IngestionContext {
        source: path.display().to_string(),
        format: fmt,
    };

    let result = match fmt {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path, options.max_rows),
        IngestionFormat::Json => json::ingest_json_from_path(path, options.max_rows),
        IngestionFormat::Excel => excel_from_path(path, options),
    };
    report(&ctx, &result, options);
    result
}

/// Ingest an uploaded payload.
///
/// `source` names the upload in observer callbacks; when `options.format` is `None` its extension
/// selects the format.
pub fn ingest_from_bytes(bytes: &[u8], source: &str, options: &IngestionOptions) -> IngestionResult<Table> {
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(Path::new(source))?,
    };
    let ctx = IngestionContext {
        source: source.to_string(),
        format: fmt,
    };

    let result = match fmt {
        IngestionFormat::Csv => csv::ingest_csv_from_bytes(bytes, options.max_rows),
        IngestionFormat::Json => json::ingest_json_from_bytes(bytes, options.max_rows),
        IngestionFormat::Excel => excel_from_bytes(bytes, options),
    };
    report(&ctx, &result, options);
    result
}

fn report(ctx: &IngestionContext, result: &IngestionResult<Table>, options: &IngestionOptions) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(table) => {
            let (rows, columns) = table.shape();
            obs.on_success(ctx, IngestionStats { rows, columns });
        }
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        _ => IngestionSeverity::Error,
    }
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::UnsupportedFormat {
            message: format!("cannot infer format: path has no extension ({})", path.display()),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::UnsupportedFormat {
        message: format!("cannot infer format from extension '{ext}' ({})", path.display()),
    })
}

#[cfg(feature = "excel")]
fn excel_from_path(path: &Path, options: &IngestionOptions) -> IngestionResult<Table> {
    super::excel::ingest_excel_from_path(path, options.excel_sheet.as_deref(), options.max_rows)
}

#[cfg(feature = "excel")]
fn excel_from_bytes(bytes: &[u8], options: &IngestionOptions) -> IngestionResult<Table> {
    super::excel::ingest_excel_from_bytes(bytes, options.excel_sheet.as_deref(), options.max_rows)
}

#[cfg(not(feature = "excel"))]
fn excel_from_path(_path: &Path, _options: &IngestionOptions) -> IngestionResult<Table> {
    Err(excel_disabled())
}

#[cfg(not(feature = "excel"))]
fn excel_from_bytes(_bytes: &[u8], _options: &IngestionOptions) -> IngestionResult<Table> {
    Err(excel_disabled())
}

#[cfg(not(feature = "excel"))]
fn excel_disabled() -> IngestionError {
    IngestionError::UnsupportedFormat {
        message: "excel ingestion not enabled (enable cargo feature 'excel')".to_string(),
    }
}
