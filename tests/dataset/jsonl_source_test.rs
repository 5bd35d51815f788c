//! Local JSONL document source.

use std::io::Write;

use stylesim::dataset::{DocumentSource, JsonlSource, SourceError};

fn jsonl(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
    for line in lines {
        writeln!(file, "{line}").expect("temp file should be writable");
    }
    file
}

#[tokio::test]
async fn reads_string_and_numeric_ids() {
    let file = jsonl(&[
        r#"{"id": "abc", "text": "First document."}"#,
        r#"{"id": 42, "text": "Second document."}"#,
    ]);
    let source = JsonlSource::new(file.path());

    let docs = source.fetch(10).await.expect("fetch should succeed");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "abc");
    assert_eq!(docs[0].text, "First document.");
    assert_eq!(docs[1].id, "42");
}

#[tokio::test]
async fn missing_id_falls_back_to_line_index() {
    let file = jsonl(&[
        r#"{"text": "zero"}"#,
        "",
        r#"{"text": "two"}"#,
    ]);
    let docs = JsonlSource::new(file.path())
        .fetch(10)
        .await
        .expect("fetch should succeed");

    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "2"]);
}

#[tokio::test]
async fn stops_at_limit() {
    let file = jsonl(&[
        r#"{"text": "a"}"#,
        r#"{"text": "b"}"#,
        r#"{"text": "c"}"#,
    ]);
    let docs = JsonlSource::new(file.path())
        .fetch(2)
        .await
        .expect("fetch should succeed");
    assert_eq!(docs.len(), 2);
}

#[tokio::test]
async fn malformed_line_reports_location() {
    let file = jsonl(&[r#"{"text": "ok"}"#, r#"{"id": 1}"#]);
    let err = JsonlSource::new(file.path())
        .fetch(10)
        .await
        .expect_err("line without text must fail");

    match err {
        SourceError::Malformed { location, .. } => assert!(location.ends_with(":2")),
        other => panic!("expected malformed error, got {other}"),
    }
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let source = JsonlSource::new(dir.path().join("absent.jsonl"));
    let err = source.fetch(1).await.expect_err("missing file must fail");
    assert!(matches!(err, SourceError::Io { .. }));
    assert!(source.describe().ends_with("absent.jsonl"));
}
