//! HTTP implementation of [`ConversionBackend`] for a CloudConvert-style
//! job API.
//!
//! Every job is a small graph of chained vendor tasks ending in an
//! `export/url` step:
//!
//! * convert — import the base64 payload, convert to the target format,
//!   export;
//! * merge — one import task per input file, a `merge` task consuming all of
//!   them in order, export;
//! * split — import, a `split` task carrying the page list or page ranges,
//!   export (one result file per page group).
//!
//! The backend never interprets the produced bytes — it only shuttles jobs
//! through their lifecycle and hands back the export URLs.

use crate::config::RemoteConfig;
use crate::error::DocMorphError;
use crate::remote::job::{ConversionBackend, JobRequest, JobStatus, RemoteFile, SplitSpec};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Name of the terminal export task in every job body.
const EXPORT_TASK: &str = "export-file";

/// Conversion backend speaking the vendor's HTTP job API.
#[derive(Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

// ── Vendor response shapes (only the fields we read) ─────────────────────

#[derive(Deserialize)]
struct JobEnvelope {
    data: JobData,
}

#[derive(Deserialize)]
struct JobData {
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    tasks: Vec<TaskData>,
}

#[derive(Deserialize)]
struct TaskData {
    name: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<TaskResult>,
}

#[derive(Deserialize)]
struct TaskResult {
    #[serde(default)]
    files: Vec<TaskFile>,
}

#[derive(Deserialize)]
struct TaskFile {
    url: String,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Deserialize)]
struct VendorError {
    #[serde(default)]
    message: Option<String>,
}

impl HttpBackend {
    /// Build a backend from the injected config.
    ///
    /// # Errors
    /// [`DocMorphError::InvalidConfig`] when no API key is configured — the
    /// vendor rejects unauthenticated jobs, so failing here gives a clearer
    /// message than a 401 later.
    pub fn new(config: &RemoteConfig) -> Result<Self, DocMorphError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            DocMorphError::InvalidConfig(
                "remote conversion requires an API key (set DOCMORPH_API_KEY or RemoteConfig::api_key)"
                    .into(),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DocMorphError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.conversion_api_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get_job(&self, job_id: &str) -> Result<JobData, DocMorphError> {
        let response = self
            .client
            .get(format!("{}/jobs/{job_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DocMorphError::RemoteService {
                detail: format!("status request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(DocMorphError::RemoteService {
                detail: format!("status request returned HTTP {}", response.status()),
            });
        }

        let envelope: JobEnvelope =
            response
                .json()
                .await
                .map_err(|e| DocMorphError::RemoteService {
                    detail: format!("unreadable status response: {e}"),
                })?;
        Ok(envelope.data)
    }

    /// Build the vendor task graph for a request.
    fn job_body(request: &JobRequest) -> Value {
        let mut tasks = Map::new();
        match request {
            JobRequest::Convert {
                file,
                target_format,
            } => {
                tasks.insert(
                    "import-file".into(),
                    json!({
                        "operation": "import/base64",
                        "file": file.payload,
                        "filename": file.file_name,
                    }),
                );
                tasks.insert(
                    "convert-file".into(),
                    json!({
                        "operation": "convert",
                        "input": "import-file",
                        "output_format": target_format,
                        "depends_on": ["import-file"],
                    }),
                );
                tasks.insert(
                    EXPORT_TASK.into(),
                    json!({
                        "operation": "export/url",
                        "input": "convert-file",
                        "depends_on": ["convert-file"],
                    }),
                );
            }
            JobRequest::Merge { files } => {
                let import_names: Vec<String> = (0..files.len())
                    .map(|i| format!("import-file-{i}"))
                    .collect();
                for (name, file) in import_names.iter().zip(files) {
                    tasks.insert(
                        name.clone(),
                        json!({
                            "operation": "import/base64",
                            "file": file.payload,
                            "filename": file.file_name,
                        }),
                    );
                }
                // Input order is merge order.
                tasks.insert(
                    "merge-files".into(),
                    json!({
                        "operation": "merge",
                        "input": import_names,
                        "output_format": "pdf",
                        "depends_on": import_names,
                    }),
                );
                tasks.insert(
                    EXPORT_TASK.into(),
                    json!({
                        "operation": "export/url",
                        "input": "merge-files",
                        "depends_on": ["merge-files"],
                    }),
                );
            }
            JobRequest::Split { file, spec } => {
                tasks.insert(
                    "import-file".into(),
                    json!({
                        "operation": "import/base64",
                        "file": file.payload,
                        "filename": file.file_name,
                    }),
                );
                let mut split = json!({
                    "operation": "split",
                    "input": "import-file",
                    "output_format": "pdf",
                    "depends_on": ["import-file"],
                });
                match spec {
                    SplitSpec::Pages(pages) => {
                        split["pages"] = json!(pages);
                    }
                    SplitSpec::Ranges(ranges) => {
                        let expressions: Vec<String> = ranges
                            .iter()
                            .map(|r| format!("{}-{}", r.start, r.end))
                            .collect();
                        split["page_ranges"] = json!(expressions);
                    }
                }
                tasks.insert("split-file".into(), split);
                tasks.insert(
                    EXPORT_TASK.into(),
                    json!({
                        "operation": "export/url",
                        "input": "split-file",
                        "depends_on": ["split-file"],
                    }),
                );
            }
        }
        Value::Object(Map::from_iter([("tasks".to_string(), Value::Object(tasks))]))
    }
}

#[async_trait]
impl ConversionBackend for HttpBackend {
    async fn submit_job(&self, request: &JobRequest) -> Result<String, DocMorphError> {
        let body = Self::job_body(request);

        let response = self
            .client
            .post(format!("{}/jobs", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocMorphError::RemoteService {
                detail: format!("job submission failed: {e}"),
            })?;

        if !response.status().is_success() {
            // Prefer the vendor's own message when it sends one.
            let status = response.status();
            let detail = response
                .json::<VendorError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("conversion service returned HTTP {status}"));
            return Err(DocMorphError::RemoteService { detail });
        }

        let envelope: JobEnvelope =
            response
                .json()
                .await
                .map_err(|e| DocMorphError::RemoteService {
                    detail: format!("unreadable job response: {e}"),
                })?;
        debug!("Vendor accepted job {}", envelope.data.id);
        Ok(envelope.data.id)
    }

    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, DocMorphError> {
        let job = self.get_job(job_id).await?;
        let status = match job.status.as_str() {
            "waiting" => JobStatus::Waiting,
            "processing" => JobStatus::Processing,
            "finished" => JobStatus::Finished,
            "error" => {
                // The failing task usually carries the useful message.
                let detail = job.tasks.iter().find_map(|t| t.message.clone());
                JobStatus::Error(detail)
            }
            other => {
                debug!("Job {job_id}: unrecognised vendor status '{other}', treating as processing");
                JobStatus::Processing
            }
        };
        Ok(status)
    }

    async fn fetch_results(&self, job_id: &str) -> Result<Vec<RemoteFile>, DocMorphError> {
        let job = self.get_job(job_id).await?;

        let files: Vec<RemoteFile> = job
            .tasks
            .iter()
            .filter(|t| t.name == EXPORT_TASK)
            .filter_map(|t| t.result.as_ref())
            .flat_map(|r| &r.files)
            .map(|f| RemoteFile {
                download_url: f.url.clone(),
                filename: f.filename.clone().unwrap_or_else(|| "converted".to_string()),
            })
            .collect();

        if files.is_empty() {
            return Err(DocMorphError::RemoteService {
                detail: "finished job has no exported files".into(),
            });
        }
        Ok(files)
    }
}
