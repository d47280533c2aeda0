//! Integration tests for source loading.

use std::fs;

use sift_ingest::{IngestOptions, SourceFormat, build_column_hints, read_table_file};
use sift_model::SiftError;

#[test]
fn reads_csv_with_provenance() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("enrollees.csv");
    fs::write(
        &path,
        "enrollee_id,city,experience\n1,city_103,>20\n2,city_40,15\n3,city_103,\n",
    )
    .expect("write csv");

    let loaded = read_table_file(&path, &IngestOptions::default()).expect("read table");
    assert_eq!(loaded.raw.headers, vec!["enrollee_id", "city", "experience"]);
    assert_eq!(loaded.raw.rows.len(), 3);
    assert_eq!(loaded.raw.rows[2], vec!["3", "city_103", ""]);
    assert_eq!(loaded.info.format, SourceFormat::Delimited);
    assert_eq!(
        loaded.info.bytes,
        fs::metadata(&path).expect("metadata").len()
    );

    let hints = build_column_hints(&loaded.raw);
    assert!(hints.get("enrollee_id").expect("id hint").is_numeric);
    // ">20" keeps the column non-numeric until coercion remaps it
    assert!(!hints.get("experience").expect("experience hint").is_numeric);
}

#[test]
fn digest_is_the_sha256_of_the_file_bytes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tiny.csv");
    fs::write(&path, "a,b\n1,2\n").expect("write csv");

    let loaded = read_table_file(&path, &IngestOptions::default()).expect("read table");
    assert_eq!(
        loaded.info.sha256,
        "492d5ea496056f1a6a6592241032fab764c321596317930b4fa0e1e8bc3b7470"
    );
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.csv");
    let err = read_table_file(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, SiftError::Load { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn unsupported_extension_is_a_load_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("notes.pdf");
    fs::write(&path, "not a table").expect("write file");
    let err = read_table_file(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, SiftError::Load { .. }));
}

#[test]
fn underscore_headers_rewrite_spaced_names() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("heart.csv");
    fs::write(&path, " Max Heart Rate ,Resting BP\n150,120\n").expect("write csv");

    let options = IngestOptions {
        underscore_headers: true,
        ..IngestOptions::default()
    };
    let loaded = read_table_file(&path, &options).expect("read table");
    assert_eq!(loaded.raw.headers, vec!["Max_Heart_Rate", "Resting_BP"]);
}

#[test]
fn bom_and_blank_lines_are_stripped() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bom.csv");
    fs::write(&path, "\u{feff}id,score\n1,10\n,\n2,20\n").expect("write csv");

    let loaded = read_table_file(&path, &IngestOptions::default()).expect("read table");
    assert_eq!(loaded.raw.headers, vec!["id", "score"]);
    assert_eq!(loaded.raw.rows.len(), 2);
}
