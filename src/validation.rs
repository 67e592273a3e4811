//! Column-name and column-type validation shared by every operation.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{ColumnKind, Table};

/// Resolve the columns an operation should touch.
///
/// - `requested = None` returns every column name, in table order.
/// - Unknown names fail with [`ValidationError::InvalidColumns`] listing all of them.
/// - With `required`, columns of another kind fail with [`ValidationError::WrongType`].
pub fn validate_columns(
    table: &Table,
    requested: Option<&[String]>,
    required: Option<ColumnKind>,
) -> Result<Vec<String>, ValidationError> {
    let Some(requested) = requested else {
        return Ok(table.column_names());
    };

    let invalid: Vec<String> = requested
        .iter()
        .filter(|name| table.column(name).is_none())
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(ValidationError::InvalidColumns { columns: invalid });
    }

    if let Some(kind) = required {
        let wrong: Vec<String> = requested
            .iter()
            .filter(|name| table.column(name).is_some_and(|c| c.kind() != kind))
            .cloned()
            .collect();
        if !wrong.is_empty() {
            return Err(ValidationError::WrongType {
                columns: wrong,
                expected: kind,
            });
        }
    }

    let mut seen = HashSet::new();
    Ok(requested
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect())
}

/// Resolve target columns, defaulting to every column of `kind` when none are requested.
pub fn columns_of_kind(
    table: &Table,
    requested: Option<&[String]>,
    kind: ColumnKind,
) -> Result<Vec<String>, ValidationError> {
    match requested {
        None => Ok(table.column_names_of(kind)),
        Some(_) => validate_columns(table, requested, Some(kind)),
    }
}

/// Outlier thresholds must be finite and strictly positive.
pub fn validate_threshold(threshold: f64) -> Result<f64, ValidationError> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(threshold)
    } else {
        Err(ValidationError::NonPositiveThreshold { threshold })
    }
}
