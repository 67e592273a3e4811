#![cfg(feature = "excel")]

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::types::Table;

use super::infer::{build_table, check_row_limit, RawCell};

/// Ingest an Excel document (`.xlsx`, `.xls`, `.ods`, etc.) into an in-memory [`Table`].
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Skips fully empty data rows and infers column types from the remaining cells
pub fn ingest_excel_from_path(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    max_rows: Option<usize>,
) -> IngestionResult<Table> {
    let mut workbook = open_workbook_auto(path)?;
    ingest_workbook(&mut workbook, sheet_name, max_rows)
}

/// Ingest an in-memory workbook (e.g. an uploaded file).
pub fn ingest_excel_from_bytes(
    bytes: &[u8],
    sheet_name: Option<&str>,
    max_rows: Option<usize>,
) -> IngestionResult<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    ingest_workbook(&mut workbook, sheet_name, max_rows)
}

fn ingest_workbook<RS, R>(workbook: &mut R, sheet_name: Option<&str>, max_rows: Option<usize>) -> IngestionResult<Table>
where
    RS: Read + Seek,
    R: Reader<RS>,
    IngestionError: From<R::Error>,
{
    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IngestionError::malformed("workbook has no sheets"))?,
    };
    let range = workbook.worksheet_range(&sheet)?;
    ingest_sheet_range(&range, max_rows).map_err(|e| with_sheet(&sheet, e))
}

fn ingest_sheet_range(range: &Range<Data>, max_rows: Option<usize>) -> IngestionResult<Table> {
    let mut rows = range.rows().skip_while(|row| is_blank(row));
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| IngestionError::malformed("sheet has no non-empty rows (no header row found)"))?
        .iter()
        .map(cell_to_header_string)
        .collect();

    let mut out: Vec<Vec<RawCell>> = Vec::new();
    for row in rows.filter(|row| !is_blank(row)) {
        out.push(row.iter().map(convert_cell).collect());
        check_row_limit(out.len(), max_rows)?;
    }
    build_table(headers, out)
}

fn with_sheet(sheet: &str, err: IngestionError) -> IngestionError {
    match err {
        IngestionError::Malformed { message } => IngestionError::Malformed {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|c| matches!(c, Data::Empty))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => crate::types::format_number(*f),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(c: &Data) -> RawCell {
    match c {
        Data::Empty | Data::Error(_) => RawCell::Missing,
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::String(s) => RawCell::from_text(s),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        other => RawCell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn range(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut r = Range::new((0, 0), (height.saturating_sub(1), width.saturating_sub(1)));
        for (i, row) in rows.into_iter().enumerate() {
            for (j, cell) in row.into_iter().enumerate() {
                r.set_value((i as u32, j as u32), cell);
            }
        }
        r
    }

    #[test]
    fn header_is_the_first_non_empty_row() {
        let r = range(vec![
            vec![Data::Empty, Data::Empty],
            vec![Data::String("id".into()), Data::String("city".into())],
            vec![Data::Float(1.0), Data::String("A".into())],
            vec![Data::Empty, Data::Empty],
            vec![Data::Int(2), Data::Error(calamine::CellErrorType::NA)],
        ]);
        let t = ingest_sheet_range(&r, None).unwrap();
        assert_eq!(t.column_names(), vec!["id", "city"]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.row(1), vec![Value::Number(2.0), Value::Null]);
    }

    #[test]
    fn blank_sheets_are_malformed() {
        let r = range(vec![vec![Data::Empty]]);
        let err = ingest_sheet_range(&r, None).unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }
}
