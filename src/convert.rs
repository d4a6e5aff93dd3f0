//! Public entry points: conversion, merge, split, summarization, translation,
//! and atomic output writing.
//!
//! ## Local first, remote as fallthrough
//!
//! [`convert_local`] is the heart of the crate: a synchronous, pure
//! dispatcher over the text-format toolkit. It never touches the network —
//! when a pair has no local converter it returns
//! [`DocMorphError::UnsupportedConversion`] and nothing else. The async
//! [`convert`] wraps it and routes exactly that error to the remote job
//! orchestrator, so callers who only want offline behavior simply never
//! construct a backend.

use crate::classify::looks_like_text;
use crate::config::RemoteConfig;
use crate::encoding::{
    canonical_extension, decode_payload, encode_payload, media_type_for, output_filename,
};
use crate::error::DocMorphError;
use crate::formats::{self, Format};
use crate::remote::{
    ConversionBackend, JobOrchestrator, JobRequest, RemoteFile, SourceFile, SplitSpec,
    Translation, Translator,
};
use crate::summarize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A locally converted file, transport-encoded for the caller.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    /// Base64-encoded converted content.
    pub content: String,
    /// Derived output filename (`base.target`).
    pub filename: String,
    /// Media type of the converted content.
    pub media_type: &'static str,
}

impl ConvertedFile {
    /// Render as a `data:` URL, the shape browser callers download directly.
    pub fn to_data_url(&self) -> String {
        crate::encoding::data_url(self.media_type, &self.content)
    }
}

/// The outcome of [`convert`]: handled locally, or delegated to the vendor.
#[derive(Debug, Clone)]
pub enum Conversion {
    /// Converted by the local toolkit; content travels inline.
    Local(ConvertedFile),
    /// Converted by the remote vendor; content is behind a download URL.
    Remote(RemoteFile),
}

/// Convert a transport-encoded document between two local text formats.
///
/// `source_format` may be a MIME type or a bare extension; `target_format`
/// must be one of the lowercase tokens `txt`, `html`, `csv`, `json`, `xml`.
/// This function performs no I/O and never calls the network.
///
/// # Errors
/// * [`DocMorphError::UnsupportedConversion`] — no local converter for the
///   pair; route to the remote vendor or reject.
/// * [`DocMorphError::Decode`] / [`DocMorphError::EmptyOrUnreadableInput`] —
///   the payload is not readable text.
/// * [`DocMorphError::MalformedInput`] — invalid JSON into a json→* converter.
pub fn convert_local(
    content: &str,
    file_name: &str,
    source_format: &str,
    target_format: &str,
) -> Result<ConvertedFile, DocMorphError> {
    let start = Instant::now();

    // ── Step 1: Canonicalise the pair ────────────────────────────────────
    let source_ext = canonical_extension(source_format);
    let unsupported = || DocMorphError::UnsupportedConversion {
        from: source_ext.clone(),
        to: target_format.to_string(),
    };
    let from = Format::from_str(&source_ext).map_err(|_| unsupported())?;
    let to = Format::from_str(target_format).map_err(|_| unsupported())?;

    // ── Step 2: Decode the transport payload ─────────────────────────────
    let text = decode_payload(content)?;
    if !looks_like_text(&text) {
        return Err(DocMorphError::EmptyOrUnreadableInput);
    }

    // ── Step 3: Run the converter and re-encode ──────────────────────────
    let converted = formats::convert(&text, from, to)?;
    let filename = output_filename(file_name, to.extension());
    debug!(
        "Converted {file_name} ({from} → {to}) locally in {:?}",
        start.elapsed()
    );

    Ok(ConvertedFile {
        content: encode_payload(&converted),
        filename,
        media_type: media_type_for(to.extension()),
    })
}

/// Convert a document, locally when possible, otherwise through the remote
/// vendor.
///
/// The decision is exactly [`convert_local`]'s: only an
/// [`DocMorphError::UnsupportedConversion`] outcome reaches the backend.
/// Every other local failure (bad payload, malformed JSON) is returned as-is
/// — a file the local toolkit could not read will not fare better remotely.
pub async fn convert(
    content: &str,
    file_name: &str,
    source_format: &str,
    target_format: &str,
    backend: Arc<dyn ConversionBackend>,
    config: &RemoteConfig,
) -> Result<Conversion, DocMorphError> {
    match convert_local(content, file_name, source_format, target_format) {
        Ok(file) => Ok(Conversion::Local(file)),
        Err(DocMorphError::UnsupportedConversion { from, to }) => {
            info!("No local converter for {from} → {to}; submitting remote job");
            let request = JobRequest::Convert {
                file: SourceFile {
                    payload: content.to_string(),
                    file_name: file_name.to_string(),
                },
                target_format: target_format.to_string(),
            };
            let mut orchestrator = JobOrchestrator::new(backend, config);
            let file = first_result(orchestrator.run(&request).await?)?;
            Ok(Conversion::Remote(file))
        }
        Err(e) => Err(e),
    }
}

/// Merge 2–10 PDF documents into one, in the given order, through the remote
/// vendor.
///
/// The result filename is stamped `merged_<unix-seconds>.pdf`, so repeated
/// merges in the same directory do not collide.
///
/// # Errors
/// [`DocMorphError::InvalidJobRequest`] when the file count is outside the
/// 2–10 bound (checked before any network traffic), plus the usual remote
/// job errors.
pub async fn merge_documents(
    files: Vec<SourceFile>,
    backend: Arc<dyn ConversionBackend>,
    config: &RemoteConfig,
) -> Result<RemoteFile, DocMorphError> {
    info!("Merging {} documents", files.len());
    let mut orchestrator = JobOrchestrator::new(backend, config);
    let mut file = first_result(orchestrator.run(&JobRequest::Merge { files }).await?)?;
    file.filename = format!("merged_{}.pdf", chrono::Utc::now().timestamp());
    Ok(file)
}

/// Split a PDF document through the remote vendor, one result file per page
/// group.
///
/// Result filenames follow the input: `<base>_part_1.pdf`, `<base>_part_2.pdf`,
/// and so on, in the vendor's output order.
///
/// # Errors
/// [`DocMorphError::InvalidJobRequest`] when the page list or ranges are
/// malformed (checked before any network traffic), plus the usual remote
/// job errors.
pub async fn split_document(
    file: SourceFile,
    spec: SplitSpec,
    backend: Arc<dyn ConversionBackend>,
    config: &RemoteConfig,
) -> Result<Vec<RemoteFile>, DocMorphError> {
    let base = {
        let b = file.file_name.split('.').next().unwrap_or("").trim();
        if b.is_empty() { "split" } else { b }.to_string()
    };
    info!("Splitting {} ({spec:?})", file.file_name);

    let mut orchestrator = JobOrchestrator::new(backend, config);
    let parts = orchestrator.run(&JobRequest::Split { file, spec }).await?;
    Ok(parts
        .into_iter()
        .enumerate()
        .map(|(i, mut f)| {
            f.filename = format!("{base}_part_{}.pdf", i + 1);
            f
        })
        .collect())
}

fn first_result(mut files: Vec<RemoteFile>) -> Result<RemoteFile, DocMorphError> {
    if files.is_empty() {
        return Err(DocMorphError::RemoteService {
            detail: "finished job produced no files".into(),
        });
    }
    Ok(files.swap_remove(0))
}

/// Write `bytes` to `path` atomically: temp file in the target directory,
/// then rename. Parent directories are created as needed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocMorphError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|source| DocMorphError::OutputWriteFailed {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| DocMorphError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(())
}

/// Summarize a transport-encoded document.
///
/// Decodes the payload, rejects anything that does not read as text, and
/// runs the extractive summarizer. The summarizer itself is infallible; the
/// `Result` reflects only the input checks.
pub fn summarize_document(content: &str) -> Result<String, DocMorphError> {
    let text = decode_payload(content)?;
    if !looks_like_text(&text) {
        return Err(DocMorphError::EmptyOrUnreadableInput);
    }
    Ok(summarize::summarize(&text))
}

/// Translate a transport-encoded document into `target_lang`.
///
/// Same input checks as [`summarize_document`]; the configured
/// [`Translator`] handles truncation and vendor quirks.
pub async fn translate_document(
    content: &str,
    target_lang: &str,
    translator: &Translator,
) -> Result<Translation, DocMorphError> {
    let text = decode_payload(content)?;
    if !looks_like_text(&text) {
        return Err(DocMorphError::EmptyOrUnreadableInput);
    }
    translator.translate(&text, target_lang).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_payload;

    #[test]
    fn local_conversion_end_to_end() {
        let payload = encode_payload("Hello\nWorld");
        let out = convert_local(&payload, "greeting.txt", "text/plain", "html").unwrap();
        assert_eq!(out.filename, "greeting.html");
        assert_eq!(out.media_type, "text/html");
        let html = decode_payload(&out.content).unwrap();
        assert!(html.contains("<p>Hello</p>"));
        assert!(html.contains("<p>World</p>"));
    }

    #[test]
    fn remote_pair_is_signalled_not_attempted() {
        let payload = encode_payload("irrelevant");
        let err = convert_local(&payload, "deck.pdf", "application/pdf", "pptx").unwrap_err();
        assert!(matches!(err, DocMorphError::UnsupportedConversion { .. }));
    }

    #[test]
    fn target_format_token_is_case_sensitive() {
        let payload = encode_payload("text");
        let err = convert_local(&payload, "a.txt", "txt", "HTML").unwrap_err();
        assert!(matches!(err, DocMorphError::UnsupportedConversion { .. }));
    }

    #[test]
    fn binary_payload_is_rejected_before_conversion() {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        let payload = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
        let err = convert_local(&payload, "photo.txt", "txt", "html").unwrap_err();
        assert!(matches!(
            err,
            DocMorphError::Decode { .. } | DocMorphError::EmptyOrUnreadableInput
        ));
    }

    #[test]
    fn summarize_document_rejects_empty_input() {
        let payload = encode_payload("   ");
        let err = summarize_document(&payload).unwrap_err();
        assert!(matches!(err, DocMorphError::EmptyOrUnreadableInput));
    }

    #[test]
    fn summarize_document_passes_text_through_the_summarizer() {
        let payload = encode_payload("A short note.");
        assert_eq!(summarize_document(&payload).unwrap(), "A short note.");
    }

    #[tokio::test]
    async fn write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        write_atomic(&path, b"<p>Hello</p>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>Hello</p>");
        assert!(!dir.path().join("out.html.tmp").exists());
    }

    #[tokio::test]
    async fn write_atomic_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        // A file where a directory is needed makes the write fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let err = write_atomic(&blocker.join("out.txt"), b"y").await.unwrap_err();
        match err {
            DocMorphError::OutputWriteFailed { path, .. } => {
                assert!(path.to_string_lossy().contains("out.txt"), "got: {path:?}")
            }
            other => panic!("expected OutputWriteFailed, got {other:?}"),
        }
    }
}
