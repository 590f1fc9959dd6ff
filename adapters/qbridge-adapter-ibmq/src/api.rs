//! IBM Q REST API client.
//!
//! This module implements the parts of the IBM Q API a device needs:
//! - Backend lookup
//! - Batch job submission (OpenQASM 2.0 circuits)
//! - Job status polling, including per-step timestamps
//! - Result retrieval and cancellation

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use qbridge_hal::{JobId, JobStep, StepTimestamps};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{IbmqError, IbmqResult};
use crate::provider::Provider;

/// User-Agent sent with requests.
const USER_AGENT: &str = concat!("qbridge/", env!("CARGO_PKG_VERSION"));

/// IBM Q API client.
pub struct IbmqClient {
    /// HTTP client.
    client: Client,
    /// API endpoint URL.
    endpoint: String,
    /// Selected instance (hub/group/project).
    instance: Option<String>,
}

impl fmt::Debug for IbmqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmqClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .finish()
    }
}

impl IbmqClient {
    /// Create a client that authenticates every request with `token`.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> IbmqResult<Self> {
        let token = token.into();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| IbmqError::InvalidToken)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            instance: None,
        })
    }

    /// Bill jobs to the given provider.
    #[must_use]
    pub fn with_provider(mut self, provider: &Provider) -> Self {
        self.instance = Some(provider.instance());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Get details for a specific backend.
    pub async fn get_backend(&self, name: &str) -> IbmqResult<BackendInfo> {
        let url = format!("{}/v1/backends/{}", self.endpoint, name);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmqError::BackendUnavailable(name.to_string()));
            }
            return Err(api_error(response, "backend lookup failed").await);
        }

        response.json().await.map_err(IbmqError::from)
    }

    /// Submit a batch of OpenQASM 2.0 circuits as one job.
    pub async fn submit_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmqResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);

        let request = JobRequest {
            backend: backend.to_string(),
            instance: self.instance.clone(),
            params: JobParams { circuits, shots },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response, "job submission failed").await);
        }

        response.json().await.map_err(IbmqError::from)
    }

    /// Get job status.
    pub async fn get_job_status(&self, job_id: &str) -> IbmqResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmqError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response, "job status failed").await);
        }

        response.json().await.map_err(IbmqError::from)
    }

    /// Get job results.
    pub async fn get_job_results(&self, job_id: &str) -> IbmqResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmqError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response, "job results failed").await);
        }

        response.json().await.map_err(IbmqError::from)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> IbmqResult<()> {
        let url = format!("{}/v1/jobs/{}/cancel", self.endpoint, job_id);

        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response, "job cancellation failed").await);
        }

        Ok(())
    }
}

/// Build an [`IbmqError::ApiError`] from a failed response.
///
/// Uses the structured error body when there is one, the raw text otherwise.
async fn api_error(response: reqwest::Response, context: &str) -> IbmqError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(error) => IbmqError::ApiError {
            code: error.code,
            message: format!("{context}: {}", error.message),
        },
        Err(_) => IbmqError::ApiError {
            code: Some(status.as_u16().to_string()),
            message: format!("{context}: {body}"),
        },
    }
}

// ============================================================================
// Request types
// ============================================================================

/// Batch job request.
#[derive(Debug, Serialize)]
struct JobRequest {
    /// Backend name.
    backend: String,
    /// Instance (hub/group/project).
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
    params: JobParams,
}

#[derive(Debug, Serialize)]
struct JobParams {
    /// OpenQASM 2.0 circuits.
    circuits: Vec<String>,
    /// Shots per circuit.
    shots: u32,
}

// ============================================================================
// Response types
// ============================================================================

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Backend information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Backend status.
    pub status: BackendStatus,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Maximum number of shots.
    #[serde(default)]
    pub max_shots: Option<u32>,
    /// Maximum number of circuits per job.
    #[serde(default)]
    pub max_experiments: Option<usize>,
}

/// Backend status.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the backend is operational.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
    /// Job status.
    #[serde(default)]
    pub status: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status, any case.
    pub status: String,
    /// Backend name.
    #[serde(default)]
    pub backend: Option<String>,
    /// When the job entered each step, keyed by upper-case step name.
    #[serde(default)]
    pub time_per_step: Option<HashMap<String, DateTime<Utc>>>,
    /// Error information if failed.
    #[serde(default)]
    pub error: Option<JobError>,
}

/// Job error information.
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl JobStatusResponse {
    /// Normalized uppercase status for comparison.
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Check if job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.normalized_status().as_str(),
            "COMPLETED" | "FAILED" | "CANCELLED" | "ERROR"
        ) || self.is_failed()
    }

    /// Check if job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    /// Check if job failed. The API reports failures as `ERROR_*` states.
    pub fn is_failed(&self) -> bool {
        let status = self.normalized_status();
        status == "FAILED" || status.starts_with("ERROR")
    }

    /// Check if job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Get the error message.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.message.clone())
    }

    /// Per-step timestamps. Unknown step names are dropped.
    pub fn step_timestamps(&self) -> StepTimestamps {
        let mut stamps = StepTimestamps::new(JobId::new(&self.id));
        for (name, at) in self.time_per_step.iter().flatten() {
            match JobStep::from_name(name) {
                Some(step) => stamps.insert(step, *at),
                None => warn!(job = %self.id, "Ignoring unknown job step {name}"),
            }
        }
        stamps
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    #[serde(default)]
    pub id: Option<String>,
    /// One entry per submitted circuit, in submission order.
    pub results: Vec<CircuitResult>,
}

/// Result for one circuit.
#[derive(Debug, Deserialize)]
pub struct CircuitResult {
    /// Measurement counts keyed by hex outcome (`"0x3"`).
    #[serde(default)]
    pub counts: HashMap<String, u64>,
    /// Number of classical bits measured, when the service reports it.
    #[serde(default)]
    pub memory_slots: Option<usize>,
    /// Shots actually taken.
    #[serde(default)]
    pub shots: Option<u32>,
    /// Execution time in seconds.
    #[serde(default)]
    pub time_taken: Option<f64>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}
