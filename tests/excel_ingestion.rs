#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dataprep_engine::ingestion::excel::{ingest_excel_from_bytes, ingest_excel_from_path};
use dataprep_engine::ingestion::IngestionFormat;
use dataprep_engine::types::{ColumnKind, Value};
use dataprep_engine::{Engine, EngineOptions};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("dataprep-engine-{name}-{nanos}.xlsx"))
}

fn write_people_xlsx(path: &PathBuf, leading_blank_rows: u32) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Sheet1").unwrap();

    let h = leading_blank_rows;
    ws.write_string(h, 0, "id").unwrap();
    ws.write_string(h, 1, "name").unwrap();
    ws.write_string(h, 2, "score").unwrap();
    ws.write_string(h, 3, "active").unwrap();

    ws.write_number(h + 1, 0, 1).unwrap();
    ws.write_string(h + 1, 1, "Ada").unwrap();
    ws.write_number(h + 1, 2, 98.5).unwrap();
    ws.write_boolean(h + 1, 3, true).unwrap();

    // Score left blank.
    ws.write_string(h + 2, 0, "2").unwrap();
    ws.write_string(h + 2, 1, "Grace").unwrap();
    ws.write_boolean(h + 2, 3, false).unwrap();

    wb.save(path).unwrap();
}

fn write_multi_sheet_xlsx(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws1 = wb.add_worksheet();
    ws1.set_name("Sheet1").unwrap();
    ws1.write_string(0, 0, "a").unwrap();
    ws1.write_number(1, 0, 1).unwrap();

    let ws2 = wb.add_worksheet();
    ws2.set_name("Second").unwrap();
    ws2.write_string(0, 0, "b").unwrap();
    ws2.write_string(1, 0, "x").unwrap();
    ws2.write_string(2, 0, "y").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn ingest_excel_happy_path() {
    let path = tmp_file("people");
    write_people_xlsx(&path, 0);

    let table = ingest_excel_from_path(&path, None, None).unwrap();
    assert_eq!(table.shape(), (2, 4));
    assert_eq!(table.row(0)[0], Value::Number(1.0));
    assert_eq!(table.row(0)[1], Value::Text("Ada".to_string()));
    assert_eq!(table.row(1)[2], Value::Null);
    assert_eq!(table.row(1)[3], Value::Text("false".to_string()));

    // "2" written as a string still makes a numeric column.
    assert_eq!(table.column("id").unwrap().kind(), ColumnKind::Numeric);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_header_is_first_non_empty_row() {
    let path = tmp_file("offset");
    write_people_xlsx(&path, 2);

    let table = ingest_excel_from_path(&path, None, None).unwrap();
    assert_eq!(table.column_names(), vec!["id", "name", "score", "active"]);
    assert_eq!(table.row_count(), 2);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_selected_sheet_only() {
    let path = tmp_file("multi");
    write_multi_sheet_xlsx(&path);

    let first = ingest_excel_from_path(&path, None, None).unwrap();
    assert_eq!(first.column_names(), vec!["a"]);

    let second = ingest_excel_from_path(&path, Some("Second"), None).unwrap();
    assert_eq!(second.column_names(), vec!["b"]);
    assert_eq!(second.row_count(), 2);

    assert!(ingest_excel_from_path(&path, Some("Missing"), None).is_err());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_from_uploaded_bytes() {
    let path = tmp_file("upload");
    write_people_xlsx(&path, 0);
    let bytes = std::fs::read(&path).unwrap();

    let table = ingest_excel_from_bytes(&bytes, None, Some(5)).unwrap();
    assert_eq!(table.row_count(), 2);

    let engine = Engine::new(EngineOptions::default()).unwrap();
    let resp = engine.ingest(&bytes, "people.xlsx", None).unwrap();
    assert_eq!(resp.summary.shape, (2, 4));
    let resp = engine.ingest(&bytes, "upload", Some(IngestionFormat::Excel)).unwrap();
    assert_eq!(resp.preview.rows.len(), 2);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_respects_the_row_limit() {
    let path = tmp_file("limit");
    write_people_xlsx(&path, 0);

    let err = ingest_excel_from_path(&path, None, Some(1)).unwrap_err();
    assert!(err.to_string().contains("more than 1 rows"));

    let _ = std::fs::remove_file(&path);
}
