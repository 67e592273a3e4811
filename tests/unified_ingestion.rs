use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dataprep_engine::ingestion::{ingest_from_bytes, ingest_from_path, IngestionFormat, IngestionOptions};
use dataprep_engine::types::Value;
use dataprep_engine::IngestionError;

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("dataprep-engine-unified-{nanos}.{ext}"))
}

#[test]
fn unified_csv_auto_detects_by_extension() {
    let table = ingest_from_path("tests/fixtures/people.csv", &IngestionOptions::default()).unwrap();
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.row(1)[1], Value::Text("Grace".to_string()));
}

#[test]
fn unified_json_and_ndjson_auto_detect_by_extension() {
    let opts = IngestionOptions::default();
    let orders = ingest_from_path("tests/fixtures/orders.json", &opts).unwrap();
    assert_eq!(orders.row_count(), 3);

    let events = ingest_from_path("tests/fixtures/events.ndjson", &opts).unwrap();
    assert_eq!(events.column("user.name").unwrap().len(), 3);
}

#[test]
fn unified_format_override_for_files_without_extension() {
    let path = tmp_file("data");
    std::fs::write(&path, "id,name\n1,Ada\n").unwrap();

    let err = ingest_from_path(&path, &IngestionOptions::default()).unwrap_err();
    assert!(matches!(err, IngestionError::UnsupportedFormat { .. }));

    let opts = IngestionOptions {
        format: Some(IngestionFormat::Csv),
        ..Default::default()
    };
    let table = ingest_from_path(&path, &opts).unwrap();
    assert_eq!(table.shape(), (1, 2));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn unified_bytes_use_the_upload_name() {
    let opts = IngestionOptions::default();
    let table = ingest_from_bytes(b"{\"a\": 1}\n{\"a\": 2}\n", "upload.ndjson", &opts).unwrap();
    assert_eq!(table.row_count(), 2);

    let err = ingest_from_bytes(b"a\n1\n", "upload.txt", &opts).unwrap_err();
    assert!(err.to_string().contains("cannot infer format from extension 'txt'"));
}

#[test]
fn unified_row_limit_applies_to_every_format() {
    let opts = IngestionOptions {
        max_rows: Some(2),
        ..Default::default()
    };
    for path in ["tests/fixtures/people.csv", "tests/fixtures/orders.json", "tests/fixtures/events.ndjson"] {
        let err = ingest_from_path(path, &opts).unwrap_err();
        assert!(matches!(err, IngestionError::TooManyRows { max: 2 }), "{path}");
    }
}
