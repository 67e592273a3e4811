//! Categorical encoding: label codes and one-hot indicator columns.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::error::ColumnError;
use crate::processing::report::{
    fold_columns, ColumnOutcome, ColumnReport, ProgressSink, SkipDetail, SkipReason,
};
use crate::processing::ProcessingOptions;
use crate::types::{Column, ColumnData, ColumnKind, Table};

named_options! {
    /// Encoding method.
    pub enum EncodeMethod ("method") {
        /// One integer code per distinct value, in sorted order.
        #[default]
        Label = "label",
        /// One indicator column per distinct value, plus one for missing values.
        Onehot = "onehot",
    }
}

/// Metrics of a successfully encoded column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeMetrics {
    pub method: EncodeMethod,
    /// Number of distinct non-missing values.
    pub unique_values: usize,
    /// Label encoding: the value of each code, indexed by code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
    /// One-hot encoding: the indicator columns appended to the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_columns: Option<Vec<String>>,
}

/// Encode `columns` in place.
pub fn encode(
    table: &mut Table,
    columns: &[String],
    method: EncodeMethod,
    options: &ProcessingOptions,
    progress: &dyn ProgressSink,
) -> ColumnReport<EncodeMetrics> {
    fold_columns(columns, progress, "Encoding", |name| match method {
        EncodeMethod::Label => label_encode(table, name),
        EncodeMethod::Onehot => onehot_encode(table, name, options.max_onehot_categories),
    })
}

fn categorical_values<'a>(table: &'a Table, name: &str) -> Result<&'a [Option<String>], ColumnError> {
    let column = table
        .column(name)
        .ok_or_else(|| ColumnError::Missing(name.to_string()))?;
    match &column.data {
        ColumnData::Categorical(values) => Ok(values),
        ColumnData::Numeric(_) => Err(ColumnError::TypeMismatch {
            column: name.to_string(),
            actual: ColumnKind::Numeric,
            expected: ColumnKind::Categorical,
        }),
    }
}

fn sorted_classes(values: &[Option<String>]) -> Vec<String> {
    values
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn label_encode(table: &mut Table, name: &str) -> Result<ColumnOutcome<EncodeMetrics>, ColumnError> {
    let values = categorical_values(table, name)?;
    let classes = sorted_classes(values);
    if classes.is_empty() {
        return Ok(ColumnOutcome::Skipped(SkipDetail::all_null()));
    }

    let codes: Vec<Option<f64>> = values
        .iter()
        .map(|v| {
            v.as_deref()
                .and_then(|v| classes.binary_search_by(|c| c.as_str().cmp(v)).ok())
                .map(|code| code as f64)
        })
        .collect();

    let column = table
        .column_mut(name)
        .ok_or_else(|| ColumnError::Missing(name.to_string()))?;
    column.data = ColumnData::Numeric(codes);

    Ok(ColumnOutcome::Success(EncodeMetrics {
        method: EncodeMethod::Label,
        unique_values: classes.len(),
        classes: Some(classes),
        new_columns: None,
    }))
}

fn onehot_encode(
    table: &mut Table,
    name: &str,
    max_categories: usize,
) -> Result<ColumnOutcome<EncodeMetrics>, ColumnError> {
    let values = categorical_values(table, name)?;
    let classes = sorted_classes(values);
    if classes.len() > max_categories {
        return Ok(ColumnOutcome::Skipped(SkipDetail {
            reason: SkipReason::TooManyCategories,
            unique_values: Some(classes.len()),
            recommendation: Some("Use label encoding or reduce categories".to_string()),
        }));
    }

    let mut indicators: Vec<Column> = classes
        .iter()
        .map(|class| {
            Column::numeric(
                format!("{name}_{class}"),
                indicator(values, |v| v == Some(class.as_str())),
            )
        })
        .collect();
    indicators.push(Column::numeric(format!("{name}_nan"), indicator(values, |v| v.is_none())));

    let mut taken: HashSet<&str> = table
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .filter(|n| *n != name)
        .collect();
    if let Some(dup) = indicators.iter().find(|c| !taken.insert(c.name.as_str())) {
        return Err(ColumnError::NameCollision(dup.name.clone()));
    }

    let new_columns: Vec<String> = indicators.iter().map(|c| c.name.clone()).collect();
    table.remove_column(name);
    for column in indicators {
        // Names were checked above and lengths come from the same column.
        if let Err(e) = table.push_column(column) {
            tracing::error!(column = %name, error = %e, "one-hot column rejected after checks");
            return Err(ColumnError::NameCollision(e.to_string()));
        }
    }

    Ok(ColumnOutcome::Success(EncodeMetrics {
        method: EncodeMethod::Onehot,
        unique_values: classes.len(),
        classes: None,
        new_columns: Some(new_columns),
    }))
}

fn indicator(values: &[Option<String>], hit: impl Fn(Option<&str>) -> bool) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|v| Some(if hit(v.as_deref()) { 1.0 } else { 0.0 }))
        .collect()
}
