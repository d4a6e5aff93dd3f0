//! End-to-end tests for the docmorph public API.
//!
//! Everything here runs hermetically: local conversions are pure, and remote
//! paths go through a scripted in-memory backend rather than a live vendor.

use async_trait::async_trait;
use docmorph::{
    convert, convert_local, encoding, formats, merge_documents, split_document, summarize,
    summarize_document, Conversion, ConversionBackend, DocMorphError, JobRequest, JobStatus,
    PageRange, RemoteConfig, RemoteFile, SourceFile, SplitSpec,
};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn payload(text: &str) -> String {
    encoding::encode_payload(text)
}

fn decode(b64: &str) -> String {
    encoding::decode_payload(b64).unwrap()
}

fn source(name: &str) -> SourceFile {
    SourceFile {
        payload: payload("%PDF-stand-in"),
        file_name: name.into(),
    }
}

/// Backend that finishes any job on the first poll, producing `files` results.
struct ScriptedBackend {
    files: u32,
}

#[async_trait]
impl ConversionBackend for ScriptedBackend {
    async fn submit_job(&self, _request: &JobRequest) -> Result<String, DocMorphError> {
        Ok("scripted-job".into())
    }

    async fn poll_status(&self, _job_id: &str) -> Result<JobStatus, DocMorphError> {
        Ok(JobStatus::Finished)
    }

    async fn fetch_results(&self, job_id: &str) -> Result<Vec<RemoteFile>, DocMorphError> {
        Ok((0..self.files)
            .map(|i| RemoteFile {
                download_url: format!("https://vendor.example/files/{job_id}/{i}"),
                filename: "deck.pptx".into(),
            })
            .collect())
    }
}

fn fast_config() -> RemoteConfig {
    RemoteConfig::builder()
        .poll_interval_ms(0)
        .max_poll_attempts(3)
        .build()
        .unwrap()
}

// ── Scenario A: txt → html ───────────────────────────────────────────────────

#[test]
fn txt_to_html_wraps_each_line() {
    let out = convert_local(&payload("Hello\nWorld"), "note.txt", "text/plain", "html").unwrap();
    assert_eq!(out.filename, "note.html");
    let html = decode(&out.content);
    assert!(html.contains("<p>Hello</p>"), "got: {html}");
    assert!(html.contains("<p>World</p>"));
    assert!(html.contains("<!DOCTYPE html>"));
}

// ── Scenario B: csv → json ───────────────────────────────────────────────────

#[test]
fn csv_to_json_produces_indexed_objects() {
    let out = convert_local(
        &payload("name,age\nAlice,30\nBob,25"),
        "people.csv",
        "text/csv",
        "json",
    )
    .unwrap();
    assert_eq!(out.filename, "people.json");

    let rows: serde_json::Value = serde_json::from_str(&decode(&out.content)).unwrap();
    assert_eq!(
        rows,
        serde_json::json!([
            {"name": "Alice", "age": "30", "_rowIndex": 1},
            {"name": "Bob", "age": "25", "_rowIndex": 2}
        ])
    );
}

/// csv → json keeps the header set and row count recoverable.
#[test]
fn csv_to_json_preserves_headers_and_row_count() {
    let csv = "city,country,population\nOslo,Norway,700000\nTurin,Italy,840000\nGhent,Belgium,270000";
    let out = convert_local(&payload(csv), "cities.csv", "csv", "json").unwrap();
    let rows: serde_json::Value = serde_json::from_str(&decode(&out.content)).unwrap();

    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    let mut derived: Vec<&str> = rows[0]
        .as_object()
        .unwrap()
        .keys()
        .filter(|k| *k != "_rowIndex")
        .map(String::as_str)
        .collect();
    derived.sort_unstable();
    assert_eq!(derived, vec!["city", "country", "population"]);
}

// ── Scenario C: malformed JSON ───────────────────────────────────────────────

#[test]
fn malformed_json_yields_malformed_input() {
    let err = convert_local(&payload("{bad"), "data.json", "application/json", "csv").unwrap_err();
    match err {
        DocMorphError::MalformedInput { format, .. } => assert_eq!(format, "JSON"),
        other => panic!("expected MalformedInput, got {other:?}"),
    }
}

// ── Scenario D: pdf → pptx routes remotely ───────────────────────────────────

#[test]
fn pdf_to_pptx_is_not_local() {
    let err = convert_local(&payload("x"), "deck.pdf", "application/pdf", "pptx").unwrap_err();
    assert!(matches!(err, DocMorphError::UnsupportedConversion { .. }));
    assert!(!formats::is_local_pair("pdf", "pptx"));
}

#[tokio::test]
async fn pdf_to_pptx_falls_through_to_the_backend() {
    let result = convert(
        &payload("%PDF-stand-in"),
        "deck.pdf",
        "application/pdf",
        "pptx",
        Arc::new(ScriptedBackend { files: 1 }),
        &fast_config(),
    )
    .await
    .unwrap();

    match result {
        Conversion::Remote(file) => {
            assert_eq!(file.filename, "deck.pptx");
            assert!(file.download_url.contains("scripted-job"));
        }
        Conversion::Local(_) => panic!("pdf → pptx must not be converted locally"),
    }
}

// ── Merge and split ──────────────────────────────────────────────────────────

#[tokio::test]
async fn merging_stamps_the_output_name() {
    let merged = merge_documents(
        vec![source("a.pdf"), source("b.pdf"), source("c.pdf")],
        Arc::new(ScriptedBackend { files: 1 }),
        &fast_config(),
    )
    .await
    .unwrap();

    assert!(merged.filename.starts_with("merged_"), "got: {}", merged.filename);
    assert!(merged.filename.ends_with(".pdf"));
    assert!(merged.download_url.contains("scripted-job"));
}

#[tokio::test]
async fn merging_one_file_is_rejected_before_submission() {
    let err = merge_documents(
        vec![source("only.pdf")],
        Arc::new(ScriptedBackend { files: 1 }),
        &fast_config(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DocMorphError::InvalidJobRequest(_)));
    assert!(err.to_string().contains("at least 2"), "got: {err}");
}

#[tokio::test]
async fn merging_eleven_files_is_rejected() {
    let files = (0..11).map(|i| source(&format!("{i}.pdf"))).collect();
    let err = merge_documents(files, Arc::new(ScriptedBackend { files: 1 }), &fast_config())
        .await
        .unwrap_err();
    assert!(matches!(err, DocMorphError::InvalidJobRequest(_)));
}

#[tokio::test]
async fn splitting_numbers_the_parts_after_the_input() {
    let parts = split_document(
        source("contract.pdf"),
        SplitSpec::Ranges(vec![
            PageRange { start: 1, end: 3 },
            PageRange { start: 4, end: 6 },
        ]),
        Arc::new(ScriptedBackend { files: 2 }),
        &fast_config(),
    )
    .await
    .unwrap();

    let names: Vec<&str> = parts.iter().map(|p| p.filename.as_str()).collect();
    assert_eq!(names, vec!["contract_part_1.pdf", "contract_part_2.pdf"]);
}

#[tokio::test]
async fn splitting_with_an_inverted_range_is_rejected() {
    let err = split_document(
        source("contract.pdf"),
        SplitSpec::Ranges(vec![PageRange { start: 6, end: 2 }]),
        Arc::new(ScriptedBackend { files: 1 }),
        &fast_config(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DocMorphError::InvalidJobRequest(_)));
}

#[tokio::test]
async fn splitting_by_page_list_accepts_the_documented_grammar() {
    let parts = split_document(
        source("contract.pdf"),
        SplitSpec::Pages("1-5,7-10".into()),
        Arc::new(ScriptedBackend { files: 2 }),
        &fast_config(),
    )
    .await
    .unwrap();
    assert_eq!(parts.len(), 2);

    let err = split_document(
        source("contract.pdf"),
        SplitSpec::Pages("pages one and two".into()),
        Arc::new(ScriptedBackend { files: 1 }),
        &fast_config(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DocMorphError::InvalidJobRequest(_)));
}

#[tokio::test]
async fn local_pairs_never_reach_the_backend() {
    /// Backend that fails the test if anything calls it.
    struct PanickingBackend;

    #[async_trait]
    impl ConversionBackend for PanickingBackend {
        async fn submit_job(&self, _: &JobRequest) -> Result<String, DocMorphError> {
            panic!("local conversion must not submit a remote job");
        }
        async fn poll_status(&self, _: &str) -> Result<JobStatus, DocMorphError> {
            panic!("local conversion must not poll");
        }
        async fn fetch_results(&self, _: &str) -> Result<Vec<RemoteFile>, DocMorphError> {
            panic!("local conversion must not fetch");
        }
    }

    let result = convert(
        &payload("a,b\n1,2"),
        "t.csv",
        "csv",
        "xml",
        Arc::new(PanickingBackend),
        &fast_config(),
    )
    .await
    .unwrap();
    assert!(matches!(result, Conversion::Local(_)));
}

// ── Dispatcher exhaustiveness ────────────────────────────────────────────────

#[test]
fn every_unsupported_pair_is_rejected_cleanly() {
    for (from, to) in [
        ("html", "csv"),
        ("html", "json"),
        ("xml", "csv"),
        ("xml", "html"),
        ("csv", "txt"),
        ("txt", "txt"),
        ("docx", "pdf"),
    ] {
        let err = convert_local(&payload("content here"), "f.bin", from, to).unwrap_err();
        assert!(
            matches!(err, DocMorphError::UnsupportedConversion { .. }),
            "pair ({from}, {to}) should be unsupported, got: {err:?}"
        );
    }
}

// ── Summarizer properties ────────────────────────────────────────────────────

const LONG_TEXT: &str = "The research team spent three years collecting field data across four \
    regions. Rainfall in the northern sites increased by 14 percent over the study period, a \
    significant departure from the historical record. Two of the monitoring stations failed \
    during the second winter. However, the remaining stations produced consistent measurements \
    throughout. The final dataset covers more than two hundred thousand observations. Early \
    results suggest a clear seasonal pattern. The team plans to publish the complete analysis \
    next spring.";

#[test]
fn summary_is_bounded_and_shorter() {
    let out = summarize(LONG_TEXT);
    assert!(out.len() < LONG_TEXT.len());
    assert!(out.split(". ").count() <= 4, "got: {out}");
    assert!(out.ends_with('.'));
}

#[test]
fn summary_keeps_source_order() {
    let out = summarize(LONG_TEXT);
    let sentences: Vec<&str> = out.trim_end_matches('.').split(". ").collect();
    let mut last = 0usize;
    for s in sentences {
        let probe: String = s.chars().take(25).collect();
        let pos = LONG_TEXT.find(probe.trim()).expect("sentence must come from the source");
        assert!(pos >= last, "out of order: {out}");
        last = pos;
    }
}

#[test]
fn short_input_short_circuits() {
    assert_eq!(summarize("  Tiny input. "), "Tiny input.");
}

#[test]
fn summarizing_binary_garbage_fails_loudly() {
    use base64::Engine;
    let bin = base64::engine::general_purpose::STANDARD.encode([0xFFu8, 0x00, 0x13, 0x37]);
    let err = summarize_document(&bin).unwrap_err();
    assert!(matches!(
        err,
        DocMorphError::Decode { .. } | DocMorphError::EmptyOrUnreadableInput
    ));
}

// ── Output handling ──────────────────────────────────────────────────────────

#[test]
fn data_url_carries_the_media_type() {
    let out = convert_local(&payload("Hello"), "h.txt", "txt", "xml").unwrap();
    let url = out.to_data_url();
    assert!(url.starts_with("data:application/xml;base64,"), "got: {url}");
}

#[test]
fn converted_output_can_be_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let out = convert_local(&payload("a,b\n1,2"), "t.csv", "csv", "html").unwrap();
    let path = dir.path().join(&out.filename);
    std::fs::write(&path, decode(&out.content)).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("<table>"));
}
