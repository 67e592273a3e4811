use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::operation::OperationKind;

/// One entry of a dataset's append-only operation log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    pub operation: OperationKind,
    /// Arguments as passed by the caller; `columns: null` means the operation default.
    pub parameters: serde_json::Value,
    pub results: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
