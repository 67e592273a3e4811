//! CSV ingestion implementation.

use std::io::Read;
use std::path::Path;

use crate::error::IngestionResult;
use crate::types::Table;

use super::infer::{build_table, check_row_limit, RawCell};

/// Ingest a CSV file into an in-memory [`Table`].
///
/// Rules:
///
/// - CSV must have a header row; names must be non-blank and unique.
/// - Every record must have as many fields as the header.
/// - Column types are inferred (see [`super::infer`]).
pub fn ingest_csv_from_path(path: impl AsRef<Path>, max_rows: Option<usize>) -> IngestionResult<Table> {
    let mut rdr = reader_builder().from_path(path)?;
    ingest_csv_from_reader(&mut rdr, max_rows)
}

/// Ingest CSV content held in memory (e.g. an uploaded file).
pub fn ingest_csv_from_bytes(bytes: &[u8], max_rows: Option<usize>) -> IngestionResult<Table> {
    let mut rdr = reader_builder().from_reader(bytes);
    ingest_csv_from_reader(&mut rdr, max_rows)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    max_rows: Option<usize>,
) -> IngestionResult<Table> {
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(RawCell::from_text).collect());
        check_row_limit(rows.len(), max_rows)?;
    }

    build_table(headers, rows)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(false);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestionError;
    use crate::types::{ColumnKind, Value};

    #[test]
    fn reads_quoted_fields_and_infers_types() {
        let t = ingest_csv_from_bytes(b"name,score\n\"Smith, J\",1.5\nLee,NA\n", None).unwrap();
        assert_eq!(t.shape(), (2, 2));
        assert_eq!(t.row(0)[0], Value::Text("Smith, J".to_string()));
        assert_eq!(t.column("score").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(t.row(1)[1], Value::Null);
    }

    #[test]
    fn ragged_records_are_csv_errors() {
        let err = ingest_csv_from_bytes(b"a,b\n1,2\n3\n", None).unwrap_err();
        assert!(matches!(err, IngestionError::Csv(_)));
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn header_only_and_empty_inputs_are_rejected() {
        assert!(matches!(ingest_csv_from_bytes(b"a,b\n", None), Err(IngestionError::Empty)));
        assert!(matches!(
            ingest_csv_from_bytes(b"", None),
            Err(IngestionError::Malformed { .. })
        ));
    }

    #[test]
    fn stops_reading_past_the_row_limit() {
        let err = ingest_csv_from_bytes(b"a\n1\n2\n3\n", Some(2)).unwrap_err();
        assert!(matches!(err, IngestionError::TooManyRows { max: 2 }));
        assert!(ingest_csv_from_bytes(b"a\n1\n2\n", Some(2)).is_ok());
    }
}
