//! Remote jobs: the backend contract, job requests, and the polling
//! orchestrator.
//!
//! ## Job kinds
//!
//! The vendor runs three kinds of document job, all sharing one lifecycle:
//! format conversion, PDF merge, and PDF split. [`JobRequest`] captures the
//! kind plus its inputs, and validates them **before** submission — a merge
//! of one file or a split with an inverted page range never reaches the
//! network.
//!
//! ## Polling strategy
//!
//! The vendor job API is poll-only: submit, then ask for status until the job
//! reaches a terminal state. The loop uses a **fixed** delay with a bounded
//! attempt count — conversion jobs have fairly uniform latency, so
//! exponential backoff would only delay the answer. Exceeding the bound is a
//! [`DocMorphError::Timeout`], never a hang and never a silent success.
//!
//! There is no cancellation primitive. "Stopping" a job means no longer
//! polling it; the vendor keeps working server-side.
//!
//! The delay and attempt bound are injected via [`crate::RemoteConfig`], so
//! tests drive the orchestrator with a scripted fake backend and a zero
//! interval instead of real clocks.

use crate::config::RemoteConfig;
use crate::error::DocMorphError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// How many files a merge job accepts.
pub const MIN_MERGE_FILES: usize = 2;
pub const MAX_MERGE_FILES: usize = 10;

/// `"1,3,5"` or `"1-5,7-10"` — comma-separated pages and inclusive ranges.
static RE_PAGE_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(-\d+)?(,\d+(-\d+)?)*$").unwrap());

/// One transport-encoded input file for a remote job.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Base64-encoded content.
    pub payload: String,
    pub file_name: String,
}

/// An inclusive 1-based page range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

/// How a split job divides its input.
#[derive(Debug, Clone)]
pub enum SplitSpec {
    /// A page-list expression such as `"1,3,5"` or `"1-5,7-10"`.
    Pages(String),
    /// Explicit inclusive page ranges, one output file per range.
    Ranges(Vec<PageRange>),
}

/// A validated-on-submit description of one remote job.
#[derive(Debug, Clone)]
pub enum JobRequest {
    /// Convert one file to `target_format`.
    Convert {
        file: SourceFile,
        target_format: String,
    },
    /// Merge 2–10 PDFs into one, in the given order.
    Merge { files: Vec<SourceFile> },
    /// Split one PDF according to `spec`.
    Split { file: SourceFile, spec: SplitSpec },
}

impl JobRequest {
    /// Check the request's own invariants, without touching the network.
    pub fn validate(&self) -> Result<(), DocMorphError> {
        match self {
            JobRequest::Convert { target_format, .. } => {
                if target_format.trim().is_empty() {
                    return Err(DocMorphError::InvalidJobRequest(
                        "target format must not be empty".into(),
                    ));
                }
            }
            JobRequest::Merge { files } => {
                if files.len() < MIN_MERGE_FILES {
                    return Err(DocMorphError::InvalidJobRequest(format!(
                        "merging requires at least {MIN_MERGE_FILES} files, got {}",
                        files.len()
                    )));
                }
                if files.len() > MAX_MERGE_FILES {
                    return Err(DocMorphError::InvalidJobRequest(format!(
                        "at most {MAX_MERGE_FILES} files can be merged, got {}",
                        files.len()
                    )));
                }
            }
            JobRequest::Split { spec, .. } => match spec {
                SplitSpec::Pages(pages) => {
                    if !RE_PAGE_LIST.is_match(pages.trim()) {
                        return Err(DocMorphError::InvalidJobRequest(format!(
                            "invalid page list '{pages}' (expected e.g. '1,3,5' or '1-5,7-10')"
                        )));
                    }
                }
                SplitSpec::Ranges(ranges) => {
                    if ranges.is_empty() {
                        return Err(DocMorphError::InvalidJobRequest(
                            "split by range requires at least one page range".into(),
                        ));
                    }
                    for r in ranges {
                        if r.start == 0 || r.start > r.end {
                            return Err(DocMorphError::InvalidJobRequest(format!(
                                "invalid page range {}-{} (pages are 1-based, start ≤ end)",
                                r.start, r.end
                            )));
                        }
                    }
                }
            },
        }
        Ok(())
    }

    /// Short label for logs.
    fn kind(&self) -> &'static str {
        match self {
            JobRequest::Convert { .. } => "convert",
            JobRequest::Merge { .. } => "merge",
            JobRequest::Split { .. } => "split",
        }
    }
}

/// Vendor-reported job status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Waiting,
    Processing,
    Finished,
    /// Vendor-side failure, with detail text when the vendor provides one.
    Error(Option<String>),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Error(_))
    }
}

/// Where the orchestrator is in a job's lifecycle.
///
/// Exposed so callers (and tests) can observe how a job ended without parsing
/// error strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPhase {
    Submitted,
    Polling { attempt: u32 },
    Finished,
    Failed,
    TimedOut,
}

/// Handle to one file produced by a finished remote job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Where the file can be downloaded from.
    pub download_url: String,
    /// Suggested output filename.
    pub filename: String,
}

/// The vendor contract: submit a job, poll its status, fetch the results
/// once finished.
///
/// Object-safe so orchestrators hold an `Arc<dyn ConversionBackend>` and
/// tests substitute a scripted fake.
#[async_trait]
pub trait ConversionBackend: Send + Sync {
    /// Submit a job. The request has already been validated. Returns the
    /// vendor job id.
    async fn submit_job(&self, request: &JobRequest) -> Result<String, DocMorphError>;

    /// Ask the vendor for the job's current status.
    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, DocMorphError>;

    /// Resolve the download handles. Only valid once status is `Finished`.
    /// Conversion and merge jobs produce one file; split produces one per
    /// page group.
    async fn fetch_results(&self, job_id: &str) -> Result<Vec<RemoteFile>, DocMorphError>;
}

/// Sequences submit → poll → fetch against a [`ConversionBackend`].
pub struct JobOrchestrator {
    backend: Arc<dyn ConversionBackend>,
    poll_interval: Duration,
    max_attempts: u32,
    phase: JobPhase,
}

impl JobOrchestrator {
    pub fn new(backend: Arc<dyn ConversionBackend>, config: &RemoteConfig) -> Self {
        Self {
            backend,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_poll_attempts,
            phase: JobPhase::Submitted,
        }
    }

    /// The phase the most recent [`JobOrchestrator::run`] ended in.
    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    /// Run one remote job to completion.
    ///
    /// # Errors
    /// * [`DocMorphError::InvalidJobRequest`] — the request failed validation
    ///   and was never submitted.
    /// * [`DocMorphError::RemoteService`] — the vendor rejected the job or
    ///   reported a failed run.
    /// * [`DocMorphError::Timeout`] — the job did not reach a terminal state
    ///   within the attempt bound.
    pub async fn run(&mut self, request: &JobRequest) -> Result<Vec<RemoteFile>, DocMorphError> {
        request.validate()?;

        self.phase = JobPhase::Submitted;
        let job_id = self.backend.submit_job(request).await?;
        info!("Remote {} job submitted: {job_id}", request.kind());

        for attempt in 1..=self.max_attempts {
            self.phase = JobPhase::Polling { attempt };
            sleep(self.poll_interval).await;

            match self.backend.poll_status(&job_id).await {
                Ok(JobStatus::Finished) => {
                    debug!("Job {job_id} finished after {attempt} polls");
                    self.phase = JobPhase::Finished;
                    return self.backend.fetch_results(&job_id).await;
                }
                Ok(JobStatus::Error(detail)) => {
                    self.phase = JobPhase::Failed;
                    return Err(DocMorphError::RemoteService {
                        detail: detail
                            .unwrap_or_else(|| "job failed on the remote service".into()),
                    });
                }
                Ok(status) => {
                    debug!("Job {job_id} status: {status:?} (attempt {attempt}/{})",
                        self.max_attempts);
                }
                // A single failed poll is not a failed job; the next tick
                // may succeed.
                Err(e) => {
                    warn!("Job {job_id}: status poll {attempt} failed: {e}");
                }
            }
        }

        self.phase = JobPhase::TimedOut;
        Err(DocMorphError::Timeout {
            job_id,
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn src(name: &str) -> SourceFile {
        SourceFile {
            payload: "cGF5bG9hZA==".into(),
            file_name: name.into(),
        }
    }

    fn convert_request() -> JobRequest {
        JobRequest::Convert {
            file: src("doc.pdf"),
            target_format: "docx".into(),
        }
    }

    /// Scripted backend: pops one status per poll, in order.
    struct FakeBackend {
        statuses: Mutex<Vec<JobStatus>>,
        submit_fails: bool,
        result_files: u32,
    }

    impl FakeBackend {
        fn with_statuses(statuses: Vec<JobStatus>) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses),
                submit_fails: false,
                result_files: 1,
            })
        }
    }

    #[async_trait]
    impl ConversionBackend for FakeBackend {
        async fn submit_job(&self, _: &JobRequest) -> Result<String, DocMorphError> {
            if self.submit_fails {
                return Err(DocMorphError::RemoteService {
                    detail: "service unavailable".into(),
                });
            }
            Ok("job-1".into())
        }

        async fn poll_status(&self, _: &str) -> Result<JobStatus, DocMorphError> {
            let mut s = self.statuses.lock().unwrap();
            if s.is_empty() {
                Ok(JobStatus::Processing)
            } else {
                Ok(s.remove(0))
            }
        }

        async fn fetch_results(&self, job_id: &str) -> Result<Vec<RemoteFile>, DocMorphError> {
            Ok((0..self.result_files)
                .map(|i| RemoteFile {
                    download_url: format!("https://vendor.example/{job_id}/{i}"),
                    filename: format!("out-{i}.pdf"),
                })
                .collect())
        }
    }

    fn test_config(max_attempts: u32) -> RemoteConfig {
        RemoteConfig::builder()
            .poll_interval_ms(0)
            .max_poll_attempts(max_attempts)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn finishes_after_a_few_polls() {
        let backend = FakeBackend::with_statuses(vec![
            JobStatus::Waiting,
            JobStatus::Processing,
            JobStatus::Finished,
        ]);
        let mut orch = JobOrchestrator::new(backend, &test_config(10));
        let files = orch.run(&convert_request()).await.unwrap();
        assert_eq!(files[0].download_url, "https://vendor.example/job-1/0");
        assert_eq!(orch.phase(), &JobPhase::Finished);
    }

    #[tokio::test]
    async fn vendor_error_maps_to_remote_service() {
        let backend = FakeBackend::with_statuses(vec![
            JobStatus::Waiting,
            JobStatus::Error(Some("unsupported codec".into())),
        ]);
        let mut orch = JobOrchestrator::new(backend, &test_config(10));
        let err = orch.run(&convert_request()).await.unwrap_err();
        match err {
            DocMorphError::RemoteService { detail } => {
                assert!(detail.contains("unsupported codec"))
            }
            other => panic!("expected RemoteService, got {other:?}"),
        }
        assert_eq!(orch.phase(), &JobPhase::Failed);
    }

    #[tokio::test]
    async fn exceeding_the_bound_is_a_timeout() {
        // Backend never leaves Processing.
        let backend = FakeBackend::with_statuses(vec![]);
        let mut orch = JobOrchestrator::new(backend, &test_config(5));
        let err = orch.run(&convert_request()).await.unwrap_err();
        match err {
            DocMorphError::Timeout { attempts, .. } => assert_eq!(attempts, 5),
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert_eq!(orch.phase(), &JobPhase::TimedOut);
    }

    #[tokio::test]
    async fn submit_failure_propagates() {
        let backend = Arc::new(FakeBackend {
            statuses: Mutex::new(vec![]),
            submit_fails: true,
            result_files: 1,
        });
        let mut orch = JobOrchestrator::new(backend, &test_config(3));
        let err = orch.run(&convert_request()).await.unwrap_err();
        assert!(matches!(err, DocMorphError::RemoteService { .. }));
    }

    #[tokio::test]
    async fn transient_poll_errors_do_not_abort_the_job() {
        struct FlakyBackend {
            polls: Mutex<u32>,
        }

        #[async_trait]
        impl ConversionBackend for FlakyBackend {
            async fn submit_job(&self, _: &JobRequest) -> Result<String, DocMorphError> {
                Ok("job-2".into())
            }
            async fn poll_status(&self, _: &str) -> Result<JobStatus, DocMorphError> {
                let mut n = self.polls.lock().unwrap();
                *n += 1;
                if *n == 1 {
                    Err(DocMorphError::RemoteService {
                        detail: "502 bad gateway".into(),
                    })
                } else {
                    Ok(JobStatus::Finished)
                }
            }
            async fn fetch_results(&self, _: &str) -> Result<Vec<RemoteFile>, DocMorphError> {
                Ok(vec![RemoteFile {
                    download_url: "https://vendor.example/job-2".into(),
                    filename: "out.docx".into(),
                }])
            }
        }

        let backend = Arc::new(FlakyBackend {
            polls: Mutex::new(0),
        });
        let mut orch = JobOrchestrator::new(backend, &test_config(5));
        let files = orch.run(&convert_request()).await.unwrap();
        assert_eq!(files[0].filename, "out.docx");
    }

    #[tokio::test]
    async fn split_job_returns_one_file_per_part() {
        let backend = Arc::new(FakeBackend {
            statuses: Mutex::new(vec![JobStatus::Finished]),
            submit_fails: false,
            result_files: 3,
        });
        let mut orch = JobOrchestrator::new(backend, &test_config(5));
        let request = JobRequest::Split {
            file: src("book.pdf"),
            spec: SplitSpec::Ranges(vec![
                PageRange { start: 1, end: 3 },
                PageRange { start: 4, end: 6 },
                PageRange { start: 7, end: 9 },
            ]),
        };
        let files = orch.run(&request).await.unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn merge_requires_two_to_ten_files() {
        let one = JobRequest::Merge {
            files: vec![src("a.pdf")],
        };
        assert!(matches!(
            one.validate().unwrap_err(),
            DocMorphError::InvalidJobRequest(_)
        ));

        let eleven = JobRequest::Merge {
            files: (0..11).map(|i| src(&format!("{i}.pdf"))).collect(),
        };
        assert!(matches!(
            eleven.validate().unwrap_err(),
            DocMorphError::InvalidJobRequest(_)
        ));

        let two = JobRequest::Merge {
            files: vec![src("a.pdf"), src("b.pdf")],
        };
        assert!(two.validate().is_ok());
    }

    #[test]
    fn split_page_list_is_validated() {
        let ok = |p: &str| JobRequest::Split {
            file: src("x.pdf"),
            spec: SplitSpec::Pages(p.into()),
        };
        assert!(ok("1,3,5").validate().is_ok());
        assert!(ok("1-5,7-10").validate().is_ok());
        assert!(ok("2").validate().is_ok());
        assert!(ok("").validate().is_err());
        assert!(ok("1,,3").validate().is_err());
        assert!(ok("one-two").validate().is_err());
    }

    #[test]
    fn split_ranges_are_validated() {
        let with = |ranges: Vec<PageRange>| JobRequest::Split {
            file: src("x.pdf"),
            spec: SplitSpec::Ranges(ranges),
        };
        assert!(with(vec![]).validate().is_err());
        assert!(with(vec![PageRange { start: 0, end: 2 }]).validate().is_err());
        assert!(with(vec![PageRange { start: 5, end: 2 }]).validate().is_err());
        assert!(with(vec![PageRange { start: 1, end: 1 }]).validate().is_ok());
    }

    #[tokio::test]
    async fn invalid_merge_never_reaches_the_backend() {
        struct PanicBackend;

        #[async_trait]
        impl ConversionBackend for PanicBackend {
            async fn submit_job(&self, _: &JobRequest) -> Result<String, DocMorphError> {
                panic!("invalid request must not be submitted");
            }
            async fn poll_status(&self, _: &str) -> Result<JobStatus, DocMorphError> {
                panic!("invalid request must not be polled");
            }
            async fn fetch_results(&self, _: &str) -> Result<Vec<RemoteFile>, DocMorphError> {
                panic!("invalid request must not be fetched");
            }
        }

        let mut orch = JobOrchestrator::new(Arc::new(PanicBackend), &test_config(3));
        let request = JobRequest::Merge {
            files: vec![src("only.pdf")],
        };
        let err = orch.run(&request).await.unwrap_err();
        assert!(matches!(err, DocMorphError::InvalidJobRequest(_)));
    }
}
