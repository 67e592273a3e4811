//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object, read as one row: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested objects are flattened into dot-path column names (`{"user":{"name":"x"}}` becomes the
//! column `user.name`). Columns appear in first-seen order; keys absent from a record are missing
//! values.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use crate::error::{IngestionError, IngestionResult};
use crate::types::Table;

use super::infer::{build_table, check_row_limit, RawCell};

/// Ingest a JSON file into an in-memory [`Table`].
pub fn ingest_json_from_path(path: impl AsRef<Path>, max_rows: Option<usize>) -> IngestionResult<Table> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text, max_rows)
}

/// Ingest JSON content held in memory (e.g. an uploaded file).
pub fn ingest_json_from_bytes(bytes: &[u8], max_rows: Option<usize>) -> IngestionResult<Table> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IngestionError::malformed(format!("json input is not valid utf-8: {e}")))?;
    ingest_json_from_str(text, max_rows)
}

/// Ingest JSON from an in-memory string into a [`Table`].
pub fn ingest_json_from_str(input: &str, max_rows: Option<usize>) -> IngestionResult<Table> {
    let records = parse_records(input.trim())?;
    if records.is_empty() {
        return Err(IngestionError::Empty);
    }
    check_row_limit(records.len(), max_rows)?;

    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut sparse: Vec<Vec<(usize, RawCell)>> = Vec::with_capacity(records.len());

    for (idx0, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or_else(|| IngestionError::malformed(format!("row {} is not a json object", idx0 + 1)))?;

        let mut fields = Vec::new();
        flatten("", obj, &mut fields);
        let row = fields
            .into_iter()
            .map(|(name, cell)| {
                let next = headers.len();
                let pos = *positions.entry(name.clone()).or_insert(next);
                if pos == next {
                    headers.push(name);
                }
                (pos, cell)
            })
            .collect();
        sparse.push(row);
    }

    if headers.is_empty() {
        return Err(IngestionError::malformed("json records have no fields"));
    }

    let rows = sparse
        .into_iter()
        .map(|fields| {
            let mut row = vec![RawCell::Missing; headers.len()];
            for (pos, cell) in fields {
                row[pos] = cell;
            }
            row
        })
        .collect();
    build_table(headers, rows)
}

fn parse_records(trimmed: &str) -> IngestionResult<Vec<JsonValue>> {
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<JsonValue>(trimmed) {
        return match v {
            JsonValue::Array(items) => Ok(items),
            JsonValue::Object(_) => Ok(vec![v]),
            _ => Err(IngestionError::malformed(
                "json must be an object, an array of objects, or NDJSON",
            )),
        };
    }

    // Fall back to NDJSON.
    let mut values = Vec::new();
    for (i, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<JsonValue>(line)
            .map_err(|e| IngestionError::malformed(format!("invalid ndjson at line {}: {e}", i + 1)))?;
        values.push(v);
    }
    Ok(values)
}

/// Append `(dotted name, cell)` for every leaf of `obj`, in key order.
fn flatten(prefix: &str, obj: &Map<String, JsonValue>, out: &mut Vec<(String, RawCell)>) {
    for (key, value) in obj {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            JsonValue::Object(inner) => flatten(&name, inner, out),
            leaf => out.push((name, leaf_cell(leaf))),
        }
    }
}

fn leaf_cell(v: &JsonValue) -> RawCell {
    match v {
        JsonValue::Null => RawCell::Missing,
        JsonValue::Bool(b) => RawCell::Text(b.to_string()),
        JsonValue::Number(n) => n.as_f64().map_or(RawCell::Missing, RawCell::Number),
        JsonValue::String(s) => RawCell::from_text(s),
        // Arrays are kept as their JSON text.
        other => RawCell::Text(other.to_string()),
    }
}
