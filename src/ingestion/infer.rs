//! Turns raw parsed cells into a typed [`Table`].
//!
//! A column is numeric when every non-missing cell is a finite number (or text that parses as
//! one); otherwise it is categorical and numbers are kept as their text form.

use std::collections::HashSet;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{format_number, Column, Table};

/// Text cells treated as missing, after trimming surrounding whitespace.
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "#NA",
    "<NA>", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// A cell as produced by a format reader, before typing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawCell {
    Missing,
    Number(f64),
    Text(String),
}

impl RawCell {
    /// Classify a text cell: missing markers become [`RawCell::Missing`].
    pub(crate) fn from_text(s: &str) -> Self {
        if is_missing(s) {
            Self::Missing
        } else {
            Self::Text(s.to_string())
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Missing => None,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Number(n) => Some(format_number(n)),
            Self::Text(s) => Some(s),
        }
    }
}

pub fn is_missing(s: &str) -> bool {
    MISSING_MARKERS.contains(&s.trim())
}

/// Check header names: none blank, none repeated.
pub(crate) fn validate_headers(headers: &[String]) -> IngestionResult<()> {
    if headers.is_empty() {
        return Err(IngestionError::malformed("no header row"));
    }
    let mut seen = HashSet::with_capacity(headers.len());
    for (i, h) in headers.iter().enumerate() {
        if h.trim().is_empty() {
            return Err(IngestionError::malformed(format!("column {} has a blank name", i + 1)));
        }
        if !seen.insert(h.as_str()) {
            return Err(IngestionError::malformed(format!("duplicate column name '{h}'")));
        }
    }
    Ok(())
}

/// Fails once more than `max_rows` rows have been seen.
pub(crate) fn check_row_limit(rows: usize, max_rows: Option<usize>) -> IngestionResult<()> {
    match max_rows {
        Some(max) if rows > max => Err(IngestionError::TooManyRows { max }),
        _ => Ok(()),
    }
}

/// Build a typed table from row-major cells.
///
/// Every row must have exactly `headers.len()` cells.
pub(crate) fn build_table(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> IngestionResult<Table> {
    validate_headers(&headers)?;
    if rows.is_empty() {
        return Err(IngestionError::Empty);
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != headers.len()) {
        return Err(IngestionError::malformed(format!(
            "row {} has {} fields, expected {}",
            i + 1,
            row.len(),
            headers.len()
        )));
    }

    let mut cells: Vec<Vec<RawCell>> = (0..headers.len()).map(|_| Vec::with_capacity(rows.len())).collect();
    for row in rows {
        for (column, cell) in cells.iter_mut().zip(row) {
            column.push(cell);
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| type_column(name, values))
        .collect();
    Table::new(columns).map_err(|e| IngestionError::malformed(e.to_string()))
}

fn type_column(name: String, values: Vec<RawCell>) -> Column {
    let numeric: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|cell| match cell {
            RawCell::Missing => Some(None),
            other => other.as_number().filter(|n| n.is_finite()).map(Some),
        })
        .collect();
    match numeric {
        Some(numbers) => Column::numeric(name, numbers),
        None => Column::categorical(name, values.into_iter().map(RawCell::into_text).collect()),
    }
}
