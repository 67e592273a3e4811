use thiserror::Error;

use crate::types::ColumnKind;

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Coarse classification of an [`EngineError`], used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was wrong; fixing the arguments fixes the call.
    Validation,
    /// The dataset id is unknown.
    NotFound,
    /// Something unexpected failed inside the engine.
    Internal,
}

/// Top-level error returned by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad arguments (columns, types, enum names, thresholds).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Ingested content could not be turned into a table.
    #[error("ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    /// No dataset is registered under this id.
    #[error("dataset '{id}' not found")]
    NotFound { id: String },

    /// The background worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A configuration value could not be parsed.
    #[error("invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },

    /// Unexpected failure (serialization, lost worker, ...).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify this error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Ingestion(e) => e.kind(),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ThreadPool(_) | Self::Config { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Message safe to hand to an external caller.
    ///
    /// Internal errors are reduced to an opaque string; their detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "internal error while processing the dataset".to_string(),
            ErrorKind::Validation | ErrorKind::NotFound => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("failed to serialize operation record: {e}"))
    }
}

/// User-fixable argument errors. Every variant carries the offending identifiers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Requested columns that do not exist in the table.
    #[error("invalid columns: {columns:?}")]
    InvalidColumns { columns: Vec<String> },

    /// Requested columns whose logical type does not match the operation.
    #[error("columns {columns:?} are not {expected}")]
    WrongType {
        columns: Vec<String>,
        expected: ColumnKind,
    },

    /// An enum argument (strategy, method, view) with an unknown name.
    #[error("invalid {field} '{value}'; expected one of {allowed:?}")]
    InvalidOption {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// Outlier threshold must be a finite, strictly positive number.
    #[error("threshold must be a positive number, got {threshold}")]
    NonPositiveThreshold { threshold: f64 },

    /// A dataset id that is not a valid identifier.
    #[error("invalid dataset id '{id}'")]
    InvalidDatasetId { id: String },

    /// A table was assembled from columns that disagree on row count or names.
    #[error("malformed table: {message}")]
    MalformedTable { message: String },
}

/// Error type returned by ingestion functions.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse error (ragged rows, bad quoting, invalid UTF-8).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The payload parsed but does not describe a usable table.
    #[error("malformed payload: {message}")]
    Malformed { message: String },

    /// The payload has a header but no data rows.
    #[error("payload contains no data rows")]
    Empty,

    /// The payload exceeds the configured row limit.
    #[error("payload has more than {max} rows")]
    TooManyRows { max: usize },

    /// The payload format is not supported (unknown extension or disabled feature).
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
}

impl IngestionError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// I/O failures are infrastructure problems; everything else is a bad payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Internal,
            Self::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => ErrorKind::Internal,
                _ => ErrorKind::Validation,
            },
            _ => ErrorKind::Validation,
        }
    }
}

/// Failure confined to a single column of a batch operation.
///
/// These never escape an operation; they are recorded in that column's result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// The column disappeared from the working table (e.g. replaced by an earlier encoding).
    #[error("column '{0}' is no longer present")]
    Missing(String),

    /// The column's current type does not support the requested transformation.
    #[error("column '{column}' is {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        actual: ColumnKind,
        expected: ColumnKind,
    },

    /// Encoding would create a column whose name is already taken.
    #[error("generated column '{0}' collides with an existing column")]
    NameCollision(String),

    /// KNN imputation needs at least one donor row.
    #[error("knn imputation needs at least 2 rows, got {rows}")]
    NotEnoughRows { rows: usize },

    /// The transformation overflowed; the column is left unchanged.
    #[error("column '{0}' would hold non-finite values")]
    NonFinite(String),
}
