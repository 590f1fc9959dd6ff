//! IBM Q backend implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use qbridge_hal::{
    Backend, BackendAvailability, Counts, ExecutionResult, HalError, HalResult, JobId, JobStatus,
    StepTimestamps,
};
use qbridge_ir::Circuit;
use qbridge_qasm::emit;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::account::Account;
use crate::api::{BackendInfo, CircuitResult, IbmqClient};
use crate::error::{IbmqError, IbmqResult};
use crate::provider::Provider;

/// How long to cache backend info before refreshing from the API.
const BACKEND_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// IBM Q backend adapter.
pub struct IbmqBackend {
    /// API client.
    client: Arc<IbmqClient>,
    /// Target backend name.
    target: String,
    /// Cached backend info with fetch timestamp for TTL-based refresh.
    backend_info: Arc<RwLock<Option<(BackendInfo, Instant)>>>,
}

impl IbmqBackend {
    /// Create a backend for `target`, authenticated as `account` and billed to `provider`.
    pub fn new(account: &Account, provider: &Provider, target: impl Into<String>) -> IbmqResult<Self> {
        let client = IbmqClient::new(account.api_endpoint(), &account.token)?.with_provider(provider);
        Ok(Self::with_client(client, target))
    }

    pub fn with_client(client: IbmqClient, target: impl Into<String>) -> Self {
        Self {
            client: Arc::new(client),
            target: target.into(),
            backend_info: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the target backend name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get backend information, fetching from API if not cached or stale.
    async fn get_backend_info(&self) -> IbmqResult<BackendInfo> {
        {
            let cached = self.backend_info.read().await;
            if let Some((ref info, fetched_at)) = *cached {
                if fetched_at.elapsed() < BACKEND_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_backend(&self.target).await?;

        {
            let mut cached = self.backend_info.write().await;
            *cached = Some((info.clone(), Instant::now()));
        }

        Ok(info)
    }

    /// Convert circuit to an `OpenQASM` 2.0 string.
    fn circuit_to_qasm(circuit: &Circuit) -> IbmqResult<String> {
        emit(circuit).map_err(|e| IbmqError::CircuitError(e.to_string()))
    }

    /// Convert one circuit's hex counts to bitstrings.
    ///
    /// Bitstrings are padded to the reported register width, or else to the
    /// width of the largest outcome.
    fn result_to_counts(result: &CircuitResult) -> Counts {
        let width = result
            .memory_slots
            .unwrap_or_else(|| infer_bit_width(result.counts.keys().map(String::as_str)));
        result
            .counts
            .iter()
            .map(|(hex, &n)| (hex_to_binary(hex, width), n))
            .collect()
    }

    fn result_to_execution(result: &CircuitResult) -> ExecutionResult {
        let counts = Self::result_to_counts(result);
        let shots = result
            .shots
            .unwrap_or_else(|| u32::try_from(counts.total_shots()).unwrap_or(u32::MAX));
        let mut execution = ExecutionResult::new(counts, shots);
        if let Some(secs) = result.time_taken {
            execution = execution.with_execution_time((secs * 1e3).round() as u64);
        }
        if let Some(metadata) = &result.metadata {
            execution = execution.with_metadata(metadata.clone());
        }
        execution
    }
}

/// Bits of a hex outcome with leading zeros removed, or `None` if the
/// string is not hex. Works digit by digit, so any width decodes.
fn significant_bits(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    if digits.is_empty() {
        return None;
    }
    let mut bits = String::with_capacity(digits.len() * 4);
    for c in digits.chars() {
        let nibble = c.to_digit(16)?;
        bits.push_str(&format!("{nibble:04b}"));
    }
    Some(bits.trim_start_matches('0').to_string())
}

/// Bit width of the largest hex outcome, at least 1.
fn infer_bit_width<'a>(samples: impl IntoIterator<Item = &'a str>) -> usize {
    samples
        .into_iter()
        .filter_map(significant_bits)
        .map(|bits| bits.len())
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Convert hex string to binary string, padded to `width`.
///
/// If `width` is 0 the width falls back to 4 bits per hex digit.
fn hex_to_binary(hex: &str, width: usize) -> String {
    match significant_bits(hex) {
        Some(bits) => {
            let digits = hex.strip_prefix("0x").unwrap_or(hex);
            let width = if width > 0 { width } else { digits.len() * 4 };
            format!("{bits:0>width$}")
        }
        // If not hex, assume it's already binary
        None => hex.to_string(),
    }
}

#[async_trait]
impl Backend for IbmqBackend {
    fn name(&self) -> &str {
        &self.target
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.get_backend_info().await {
            Ok(info) => {
                if info.status.operational {
                    Ok(BackendAvailability {
                        is_available: true,
                        queue_depth: info.status.pending_jobs,
                        estimated_wait: None,
                        status_message: info.status.status_msg,
                    })
                } else {
                    Ok(BackendAvailability::unavailable(
                        info.status
                            .status_msg
                            .unwrap_or_else(|| "backend offline".to_string()),
                    ))
                }
            }
            Err(e) => {
                warn!("IBM Q backend availability check failed: {e}");
                Ok(BackendAvailability::unavailable("failed to query backend"))
            }
        }
    }

    async fn submit_batch(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }

        let info = self
            .get_backend_info()
            .await
            .map_err(|e| HalError::Backend(e.to_string()))?;

        if !info.status.operational {
            return Err(HalError::BackendUnavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "Backend offline".to_string()),
            ));
        }
        if let Some(max) = info.max_shots.filter(|&max| shots > max) {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested but {} allows at most {max}",
                info.name
            )));
        }
        if let Some(max) = info.max_experiments.filter(|&max| circuits.len() > max) {
            return Err(HalError::SubmissionFailed(format!(
                "{} circuits in one batch but {} allows at most {max}",
                circuits.len(),
                info.name
            )));
        }

        let qasm = circuits
            .iter()
            .map(Self::circuit_to_qasm)
            .collect::<IbmqResult<Vec<_>>>()
            .map_err(|e| HalError::InvalidCircuit(e.to_string()))?;

        let response = self
            .client
            .submit_job(&self.target, qasm, shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        info!(
            job = %response.id,
            backend = %self.target,
            circuits = circuits.len(),
            shots,
            "Submitted IBM Q job"
        );
        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self
            .client
            .get_job_status(&job_id.0)
            .await
            .map_err(HalError::from)?;

        let job_status = if status.is_completed() {
            JobStatus::Completed
        } else if status.is_cancelled() {
            JobStatus::Cancelled
        } else if status.is_failed() {
            JobStatus::Failed(
                status
                    .error_message()
                    .unwrap_or_else(|| format!("Job ended in state {}", status.status)),
            )
        } else if status.status.eq_ignore_ascii_case("QUEUED") {
            JobStatus::Queued
        } else {
            // CREATING, VALIDATING, RUNNING and anything unknown
            JobStatus::Running
        };

        Ok(job_status)
    }

    async fn results(&self, job_id: &JobId) -> HalResult<Vec<ExecutionResult>> {
        let status = self
            .client
            .get_job_status(&job_id.0)
            .await
            .map_err(HalError::from)?;

        if !status.is_completed() {
            if status.is_failed() {
                let msg = status
                    .error_message()
                    .unwrap_or_else(|| "Job failed".to_string());
                return Err(HalError::JobFailed(msg));
            }
            if status.is_cancelled() {
                return Err(HalError::JobCancelled);
            }
            return Err(HalError::Backend(format!(
                "Job {} not yet completed",
                job_id.0
            )));
        }

        let response = self
            .client
            .get_job_results(&job_id.0)
            .await
            .map_err(HalError::from)?;

        Ok(response
            .results
            .iter()
            .map(Self::result_to_execution)
            .collect())
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client
            .cancel_job(&job_id.0)
            .await
            .map_err(HalError::from)
    }

    async fn time_per_step(&self, job_id: &JobId) -> HalResult<StepTimestamps> {
        let status = self
            .client
            .get_job_status(&job_id.0)
            .await
            .map_err(HalError::from)?;
        Ok(status.step_timestamps())
    }
}
