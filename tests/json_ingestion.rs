use dataprep_engine::ingestion::json::{ingest_json_from_path, ingest_json_from_str};
use dataprep_engine::types::{ColumnKind, Value};

#[test]
fn ingest_json_array_flattens_nested_objects() {
    let table = ingest_json_from_path("tests/fixtures/orders.json", None).unwrap();

    assert_eq!(
        table.column_names(),
        vec!["order", "customer.name", "customer.country", "total", "paid"]
    );
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.row(2)[2], Value::Null);
    assert_eq!(table.row(0)[4], Value::Text("true".to_string()));
}

#[test]
fn ingest_json_treats_missing_markers_as_null() {
    let table = ingest_json_from_path("tests/fixtures/orders.json", None).unwrap();

    // "N/A" is missing, so the column stays numeric.
    let total = table.column("total").unwrap();
    assert_eq!(total.kind(), ColumnKind::Numeric);
    assert_eq!(total.missing_count(), 1);
    assert_eq!(table.row(2)[3], Value::Number(12.0));
}

#[test]
fn ingest_ndjson_skips_blank_lines() {
    let table = ingest_json_from_path("tests/fixtures/events.ndjson", None).unwrap();

    assert_eq!(table.shape(), (3, 4));
    assert_eq!(table.column_names(), vec!["id", "user.name", "user.plan", "amount"]);
    assert_eq!(table.row(1)[2], Value::Null);
    assert_eq!(table.row(1)[3], Value::Null);
    assert_eq!(table.row(2)[3], Value::Number(7.0));
}

#[test]
fn ingest_json_errors_on_non_object_records() {
    let err = ingest_json_from_str(r#"[{"a": 1}, [1, 2]]"#, None).unwrap_err();
    assert!(err.to_string().contains("row 2 is not a json object"));
}

#[test]
fn ingest_json_errors_when_records_have_no_fields() {
    let err = ingest_json_from_str("[{}, {}]", None).unwrap_err();
    assert!(err.to_string().contains("json records have no fields"));
}
