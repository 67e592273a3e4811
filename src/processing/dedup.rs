//! Row removal: exact duplicates and rows with missing values.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::{ColumnData, Table};

/// Row counts before and after a row-removal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowRemovalReport {
    pub initial_rows: usize,
    pub final_rows: usize,
    pub removed_count: usize,
}

/// Hashable image of a cell. Floats compare by bit pattern with `-0.0` folded into `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Number(u64),
    Text(&'a str),
}

fn row_keys(table: &Table) -> Vec<Vec<CellKey<'_>>> {
    let mut keys: Vec<Vec<CellKey<'_>>> = (0..table.row_count())
        .map(|_| Vec::with_capacity(table.column_count()))
        .collect();
    for column in table.columns() {
        match &column.data {
            ColumnData::Numeric(values) => {
                for (key, v) in keys.iter_mut().zip(values) {
                    key.push(match v {
                        Some(n) if *n == 0.0 => CellKey::Number(0.0f64.to_bits()),
                        Some(n) => CellKey::Number(n.to_bits()),
                        None => CellKey::Null,
                    });
                }
            }
            ColumnData::Categorical(values) => {
                for (key, v) in keys.iter_mut().zip(values) {
                    key.push(v.as_deref().map_or(CellKey::Null, CellKey::Text));
                }
            }
        }
    }
    keys
}

/// `true` for every row that repeats an earlier row exactly.
fn duplicate_mask(table: &Table) -> Vec<bool> {
    let keys = row_keys(table);
    let mut seen = HashSet::with_capacity(keys.len());
    keys.into_iter().map(|k| !seen.insert(k)).collect()
}

/// Number of rows that repeat an earlier row.
pub fn duplicate_row_count(table: &Table) -> usize {
    duplicate_mask(table).into_iter().filter(|d| *d).count()
}

/// Drop exact duplicate rows, keeping the first occurrence.
pub fn remove_duplicates(table: &mut Table) -> RowRemovalReport {
    let keep: Vec<bool> = duplicate_mask(table).into_iter().map(|d| !d).collect();
    apply(table, &keep)
}

/// Drop rows with a missing value in any of `columns`.
pub fn drop_missing_rows(table: &mut Table, columns: &[String]) -> RowRemovalReport {
    let mut keep = vec![true; table.row_count()];
    for column in table.columns().iter().filter(|c| columns.contains(&c.name)) {
        let present: Vec<bool> = match &column.data {
            ColumnData::Numeric(v) => v.iter().map(Option::is_some).collect(),
            ColumnData::Categorical(v) => v.iter().map(Option::is_some).collect(),
        };
        for (k, p) in keep.iter_mut().zip(present) {
            *k &= p;
        }
    }
    apply(table, &keep)
}

fn apply(table: &mut Table, keep: &[bool]) -> RowRemovalReport {
    let initial_rows = table.row_count();
    let removed_count = table.retain_rows(keep);
    RowRemovalReport {
        initial_rows,
        final_rows: table.row_count(),
        removed_count,
    }
}
