use dataprep_engine::ingestion::csv::{ingest_csv_from_bytes, ingest_csv_from_path, ingest_csv_from_reader};
use dataprep_engine::types::{ColumnKind, Value};
use dataprep_engine::IngestionError;

#[test]
fn ingest_csv_from_path_happy_path() {
    let table = ingest_csv_from_path("tests/fixtures/people.csv", None).unwrap();

    assert_eq!(table.shape(), (4, 4));
    assert_eq!(table.column_names(), vec!["id", "name", "score", "active"]);
    assert_eq!(
        table.row(0),
        vec![
            Value::Number(1.0),
            Value::Text("Ada".to_string()),
            Value::Number(98.5),
            Value::Text("true".to_string()),
        ]
    );
    assert_eq!(table.row(3)[1], Value::Text("Hopper, G".to_string()));
}

#[test]
fn ingest_csv_infers_kinds_and_missing_values() {
    let table = ingest_csv_from_path("tests/fixtures/people.csv", None).unwrap();

    assert_eq!(table.column("id").unwrap().kind(), ColumnKind::Numeric);
    assert_eq!(table.column("score").unwrap().kind(), ColumnKind::Numeric);
    assert_eq!(table.column("name").unwrap().kind(), ColumnKind::Categorical);
    assert_eq!(table.column("active").unwrap().kind(), ColumnKind::Categorical);

    // An empty field and "NA" are both missing.
    assert_eq!(table.column("score").unwrap().missing_count(), 2);
    assert_eq!(table.column("active").unwrap().missing_count(), 1);
}

#[test]
fn ingest_csv_from_custom_reader() {
    let input = "a;b\n1;x\n2;y\n";
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(input.as_bytes());

    let table = ingest_csv_from_reader(&mut rdr, None).unwrap();
    assert_eq!(table.shape(), (2, 2));
    assert_eq!(table.row(1), vec![Value::Number(2.0), Value::Text("y".to_string())]);
}

#[test]
fn ingest_csv_errors_on_duplicate_headers() {
    let err = ingest_csv_from_bytes(b"id,id\n1,2\n", None).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("malformed payload"));
    assert!(msg.contains("duplicate column name 'id'"));
}

#[test]
fn ingest_csv_errors_on_header_only_payload() {
    let err = ingest_csv_from_bytes(b"id,name\n", None).unwrap_err();
    assert!(matches!(err, IngestionError::Empty));
}

#[test]
fn ingest_csv_missing_file_is_an_io_error() {
    let err = ingest_csv_from_path("tests/fixtures/does_not_exist.csv", None).unwrap_err();
    assert_eq!(err.kind(), dataprep_engine::ErrorKind::Internal);
}
