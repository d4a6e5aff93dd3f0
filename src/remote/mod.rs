//! The remote vendor boundary: conversion, merge, and split jobs, plus
//! translation.
//!
//! Nothing in here contains business logic. The orchestrator sequences the
//! vendor's submit → poll → fetch contract and maps every distinguishable
//! vendor failure onto the crate's error taxonomy; the translator is a single
//! request/response call with truncation. Both take their endpoints and
//! credentials from an injected [`crate::RemoteConfig`].

pub mod http;
pub mod job;
pub mod translate;

pub use http::HttpBackend;
pub use job::{
    ConversionBackend, JobOrchestrator, JobPhase, JobRequest, JobStatus, PageRange, RemoteFile,
    SourceFile, SplitSpec,
};
pub use translate::{Translation, Translator};
