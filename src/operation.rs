//! Typed requests for the mutating operations, so a caller can route any of them through one
//! entry point ([`crate::dataset::Dataset::apply`], [`crate::engine::Engine::spawn`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::processing::outliers::DEFAULT_THRESHOLD;
use crate::processing::{
    ColumnReport, EncodeMethod, EncodeMetrics, ImputeMetrics, ImputeStrategy, OutlierMethod,
    OutlierReport, RowRemovalReport, ScaleMethod, ScaleMetrics,
};

/// Name of a mutating operation, as recorded in the operation log and status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Impute,
    Encode,
    RemoveOutliers,
    RemoveDuplicates,
    DropMissing,
    Normalize,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Impute => "impute",
            Self::Encode => "encode",
            Self::RemoveOutliers => "remove_outliers",
            Self::RemoveDuplicates => "remove_duplicates",
            Self::DropMissing => "drop_missing",
            Self::Normalize => "normalize",
        }
    }

    /// Status message shown while the operation starts.
    pub fn start_message(self) -> &'static str {
        match self {
            Self::Impute => "Starting missing value imputation...",
            Self::Encode => "Starting categorical encoding...",
            Self::RemoveOutliers => "Starting outlier removal...",
            Self::RemoveDuplicates => "Removing duplicate rows...",
            Self::DropMissing => "Starting null value removal...",
            Self::Normalize => "Starting data normalization...",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// A mutating operation with its arguments.
///
/// Deserializes from objects tagged by `operation`; omitted arguments take their defaults:
///
/// ```rust
/// use dataprep_engine::operation::Operation;
/// use dataprep_engine::processing::OutlierMethod;
///
/// let op: Operation =
///     serde_json::from_str(r#"{"operation": "remove_outliers", "columns": ["age"]}"#).unwrap();
/// assert_eq!(
///     op,
///     Operation::RemoveOutliers {
///         columns: Some(vec!["age".to_string()]),
///         method: OutlierMethod::Iqr,
///         threshold: 1.5,
///     }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    Impute {
        #[serde(default)]
        columns: Option<Vec<String>>,
        #[serde(default)]
        strategy: ImputeStrategy,
    },
    Encode {
        #[serde(default)]
        columns: Option<Vec<String>>,
        #[serde(default)]
        method: EncodeMethod,
    },
    RemoveOutliers {
        #[serde(default)]
        columns: Option<Vec<String>>,
        #[serde(default)]
        method: OutlierMethod,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    RemoveDuplicates,
    DropMissing {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    Normalize {
        #[serde(default)]
        columns: Option<Vec<String>>,
        #[serde(default)]
        method: ScaleMethod,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Impute { .. } => OperationKind::Impute,
            Self::Encode { .. } => OperationKind::Encode,
            Self::RemoveOutliers { .. } => OperationKind::RemoveOutliers,
            Self::RemoveDuplicates => OperationKind::RemoveDuplicates,
            Self::DropMissing { .. } => OperationKind::DropMissing,
            Self::Normalize { .. } => OperationKind::Normalize,
        }
    }
}

/// Result of [`Operation`], serialized exactly like the per-operation result it wraps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationOutcome {
    Impute(ColumnReport<ImputeMetrics>),
    Encode(ColumnReport<EncodeMetrics>),
    Outliers(OutlierReport),
    /// Duplicate or null-row removal.
    Rows(RowRemovalReport),
    Normalize(ColumnReport<ScaleMetrics>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_fill_in_default_arguments() {
        let op: Operation = serde_json::from_str(r#"{"operation": "impute"}"#).unwrap();
        assert_eq!(
            op,
            Operation::Impute {
                columns: None,
                strategy: ImputeStrategy::Mean
            }
        );
        assert_eq!(op.kind(), OperationKind::Impute);

        let op: Operation =
            serde_json::from_str(r#"{"operation": "normalize", "method": "robust"}"#).unwrap();
        assert_eq!(op.kind().to_string(), "normalize");
    }

    #[test]
    fn unknown_method_names_are_rejected() {
        let err = serde_json::from_str::<Operation>(r#"{"operation": "encode", "method": "hash"}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<Operation>(r#"{"operation": "shuffle"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn unit_operations_need_only_the_tag() {
        let op: Operation = serde_json::from_str(r#"{"operation": "remove_duplicates"}"#).unwrap();
        assert_eq!(op, Operation::RemoveDuplicates);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            serde_json::json!({"operation": "remove_duplicates"})
        );
    }
}
