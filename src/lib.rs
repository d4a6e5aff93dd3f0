//! # docmorph
//!
//! Document utility toolkit: convert files between text formats, summarize
//! them, and translate them — locally where a pure converter exists, through
//! an external vendor where it does not.
//!
//! ## Why this crate?
//!
//! Most "document converter" services are a pile of near-identical request
//! handlers, each re-implementing the same base64 plumbing, the same CSV
//! parsing, and the same error strings. This crate collapses that into one
//! shared toolkit: a table of pure text-format converters, one extractive
//! summarizer, one printable-text classifier, and a thin orchestrator for
//! the work only a real engine can do — conversions between binary formats
//! (PDF, Office), PDF merge, and PDF split — which is delegated to a vendor
//! job API.
//!
//! ## Pipeline Overview
//!
//! ```text
//! payload (base64)
//!  │
//!  ├─ 1. Decode    transport encoding off, printable-text check
//!  ├─ 2. Dispatch  (source, target) looked up in the local pair table
//!  ├─ 3a. Local    pure converter runs, result re-encoded        ─┐
//!  ├─ 3b. Remote   submit → poll (bounded) → fetch download URL  ─┴─ result
//!  └─ 4. Output    `${base}.${target}` + media type
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use docmorph::{convert_local, encoding};
//!
//! let payload = encoding::encode_payload("name,age\nAlice,30");
//! let out = convert_local(&payload, "people.csv", "text/csv", "json").unwrap();
//! assert_eq!(out.filename, "people.json");
//! ```
//!
//! Remote conversion, summarization, and translation are async and take an
//! injected [`RemoteConfig`] — no credentials are ever baked in:
//!
//! ```rust,no_run
//! use docmorph::{convert, HttpBackend, RemoteConfig};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RemoteConfig::from_env();
//! let backend = Arc::new(HttpBackend::new(&config)?);
//! let result = convert("<base64>", "report.pdf", "pdf", "docx", backend, &config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docmorph` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docmorph = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod classify;
pub mod config;
pub mod convert;
pub mod encoding;
pub mod error;
pub mod formats;
pub mod remote;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RemoteConfig, RemoteConfigBuilder};
pub use convert::{
    convert, convert_local, merge_documents, split_document, summarize_document,
    translate_document, write_atomic,
};
pub use convert::{ConvertedFile, Conversion};
pub use error::DocMorphError;
pub use formats::Format;
pub use remote::{
    ConversionBackend, HttpBackend, JobOrchestrator, JobPhase, JobRequest, JobStatus, PageRange,
    RemoteFile, SourceFile, SplitSpec, Translation, Translator,
};
pub use summarize::summarize;
