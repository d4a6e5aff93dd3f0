//! Error types for the docmorph library.
//!
//! One enum covers the whole taxonomy, but the variants fall into two groups
//! with different retry semantics:
//!
//! * **Local failures** (`Decode`, `UnsupportedConversion`, `MalformedInput`,
//!   `EmptyOrUnreadableInput`) — deterministic: the same input fails the same
//!   way every time. Never retried; reported straight back to the caller.
//!
//! * **Remote failures** (`RemoteService`, `Timeout`, `DownloadFailed`) —
//!   produced while talking to the conversion or translation vendor.
//!   `Timeout` is deliberately distinct from `RemoteService` so callers can
//!   retry a timed-out job but abort on a vendor-reported error.
//!
//! Local converters never panic on well-formed input: every failure is
//! returned as a value so the calling layer decides the user-facing behavior.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docmorph library.
#[derive(Debug, Error)]
pub enum DocMorphError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The transport-encoded payload could not be decoded to text.
    #[error("Could not decode file content: {detail}\nExpected base64 (optionally data-URL prefixed) text.")]
    Decode { detail: String },

    /// Decoded content is empty or fails the printable-text heuristic.
    #[error("The file appears to be empty or does not contain readable text. Use a plain-text document.")]
    EmptyOrUnreadableInput,

    /// Structured input (JSON) could not be parsed by a converter.
    #[error("Malformed {format} input: {detail}")]
    MalformedInput { format: String, detail: String },

    // ── Dispatch errors ───────────────────────────────────────────────────
    /// The requested (source, target) pair has no local converter.
    ///
    /// Callers route these to the remote conversion vendor or reject them.
    #[error("No local converter for '{from}' → '{to}'. Locally supported formats: txt, html, csv, json, xml.")]
    UnsupportedConversion { from: String, to: String },

    /// A remote job request failed validation before submission.
    #[error("Invalid job request: {0}")]
    InvalidJobRequest(String),

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The conversion or translation vendor returned a non-success response.
    #[error("Remote service error: {detail}")]
    RemoteService { detail: String },

    /// Polling a remote job exceeded the configured attempt bound.
    #[error("Remote job '{job_id}' did not finish within {attempts} poll attempts")]
    Timeout { job_id: String, attempts: u32 },

    /// Result download failed after the job itself finished.
    #[error("Failed to download converted file from '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocMorphError {
    /// Shortcut for the common "invalid JSON" case of [`DocMorphError::MalformedInput`].
    pub(crate) fn bad_json(e: impl std::fmt::Display) -> Self {
        DocMorphError::MalformedInput {
            format: "JSON".into(),
            detail: e.to_string(),
        }
    }
}
