//! Core data model: typed columns and the in-memory [`Table`].
//!
//! A [`Table`] is column-major. Each [`Column`] carries a closed [`ColumnData`] variant, so
//! type-specific code matches on the variant instead of inspecting values at runtime.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ValidationError;

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Floating point values.
    Numeric,
    /// Free-form text labels.
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::Categorical => f.write_str("categorical"),
        }
    }
}

/// A single cell, as seen through a row view.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// Numeric value.
    Number(f64),
    /// Categorical value.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render the value the way exports write it (missing values become an empty string).
    pub fn to_cell_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Self::Number(_) => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Format a float without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        // Exact: integral and well inside i64 range.
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Backing storage of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Numeric cells; `None` marks a missing value. Stored values are always finite.
    Numeric(Vec<Option<f64>>),
    /// Categorical cells; `None` marks a missing value.
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    /// Logical type of this storage.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    /// Returns `true` if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        match self {
            Self::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            Self::Categorical(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Cell at `row` as a [`Value`].
    pub fn value(&self, row: usize) -> Value {
        match self {
            Self::Numeric(v) => match v.get(row) {
                Some(Some(n)) => Value::Number(*n),
                _ => Value::Null,
            },
            Self::Categorical(v) => match v.get(row) {
                Some(Some(s)) => Value::Text(s.clone()),
                _ => Value::Null,
            },
        }
    }

    fn retain(&mut self, keep: &[bool]) {
        fn retain_vec<T>(values: &mut Vec<T>, keep: &[bool]) {
            let mut idx = 0usize;
            values.retain(|_| {
                let k = keep.get(idx).copied().unwrap_or(true);
                idx += 1;
                k
            });
        }
        match self {
            Self::Numeric(v) => retain_vec(v, keep),
            Self::Categorical(v) => retain_vec(v, keep),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Typed cells.
    pub data: ColumnData,
}

impl Column {
    /// Create a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Create a categorical column.
    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Logical type.
    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.data.missing_count()
    }

    /// Storage label reported in summaries: `int64`, `float64` or `object`.
    pub fn dtype_label(&self) -> &'static str {
        match &self.data {
            ColumnData::Numeric(v) => {
                let integral = v.iter().all(|c| matches!(c, Some(n) if n.fract() == 0.0));
                if integral && !v.is_empty() { "int64" } else { "float64" }
            }
            ColumnData::Categorical(_) => "object",
        }
    }

    /// Rough in-memory footprint in bytes.
    pub fn estimated_bytes(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len() * std::mem::size_of::<Option<f64>>(),
            ColumnData::Categorical(v) => {
                v.len() * std::mem::size_of::<Option<String>>()
                    + v.iter().flatten().map(String::len).sum::<usize>()
            }
        }
    }
}

/// In-memory column-major table.
///
/// Invariants: column names are unique and all columns have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking the name/length invariants.
    pub fn new(columns: Vec<Column>) -> Result<Self, ValidationError> {
        let mut table = Self::default();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Names of columns of the given kind, in order.
    pub fn column_names_of(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind() == kind)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Mutable column by name.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Append a column at the end.
    pub fn push_column(&mut self, column: Column) -> Result<(), ValidationError> {
        if self.index_of(&column.name).is_some() {
            return Err(ValidationError::MalformedTable {
                message: format!("duplicate column name '{}'", column.name),
            });
        }
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(ValidationError::MalformedTable {
                message: format!(
                    "column '{}' has {} rows, table has {}",
                    column.name,
                    column.len(),
                    self.row_count()
                ),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column by name, returning it.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.index_of(name)?;
        Some(self.columns.remove(idx))
    }

    /// Row at `idx` as values, in column order.
    pub fn row(&self, idx: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.data.value(idx)).collect()
    }

    /// Rows `range` as values.
    pub fn rows(&self, range: std::ops::Range<usize>) -> Vec<Vec<Value>> {
        let end = range.end.min(self.row_count());
        (range.start.min(end)..end).map(|i| self.row(i)).collect()
    }

    /// Keep only rows whose entry in `keep` is `true`. Returns the number of dropped rows.
    pub fn retain_rows(&mut self, keep: &[bool]) -> usize {
        let before = self.row_count();
        for column in &mut self.columns {
            column.data.retain(keep);
        }
        before - self.row_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::new(vec![
            Column::numeric("age", vec![Some(20.0), None, Some(22.5)]),
            Column::categorical(
                "city",
                vec![Some("A".to_string()), Some("B".to_string()), None],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn table_rejects_ragged_and_duplicate_columns() {
        let err = Table::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("b", vec![Some(1.0), Some(2.0)]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("has 2 rows"));

        let err = Table::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::categorical("a", vec![None]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate column name 'a'"));
    }

    #[test]
    fn rows_are_materialized_in_column_order() {
        let t = people();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(
            t.row(0),
            vec![Value::Number(20.0), Value::Text("A".to_string())]
        );
        assert_eq!(t.row(2), vec![Value::Number(22.5), Value::Null]);
        assert_eq!(t.rows(1..10).len(), 2);
    }

    #[test]
    fn retain_rows_drops_masked_rows_in_every_column() {
        let mut t = people();
        let dropped = t.retain_rows(&[true, false, true]);
        assert_eq!(dropped, 1);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.row(1), vec![Value::Number(22.5), Value::Null]);
    }

    #[test]
    fn dtype_labels_follow_storage() {
        let t = people();
        assert_eq!(t.column("age").unwrap().dtype_label(), "float64");
        assert_eq!(t.column("city").unwrap().dtype_label(), "object");
        let ints = Column::numeric("n", vec![Some(1.0), Some(2.0)]);
        assert_eq!(ints.dtype_label(), "int64");
    }

    #[test]
    fn numbers_format_without_trailing_zero() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(265.75), "265.75");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(Value::Null.to_cell_string(), "");
    }

    #[test]
    fn non_finite_numbers_serialize_as_null() {
        let json = serde_json::to_string(&vec![
            Value::Number(f64::NAN),
            Value::Number(1.5),
            Value::Text("x".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,1.5,"x"]"#);
    }
}
