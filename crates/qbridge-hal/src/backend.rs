//! Backend trait.
//!
//! ```text
//!   submit_batch() ──→ status() ──→ results()
//!                          │
//!                          └──→ time_per_step()
//! ```
//!
//! All I/O methods are async and the trait is `Send + Sync`, so one backend
//! can be shared across tasks behind an `Arc`.

use std::time::Duration;

use async_trait::async_trait;
use qbridge_ir::Circuit;

use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus, StepTimestamps};
use crate::result::ExecutionResult;

/// Poll interval used by [`Backend::wait`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Number of polls [`Backend::wait`] makes before giving up.
pub const MAX_POLLS: u32 = 600;

/// A remote executor of circuit batches.
///
/// # Contract
///
/// - `submit_batch()` returns a job whose initial status is `Queued`.
/// - `results()` is only called once `status()` reports `Completed`, and
///   returns one result per submitted circuit, in submission order.
/// - `wait()` has a default implementation (500ms poll, 5-minute timeout).
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Check backend availability with queue depth information.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Submit a batch of circuits as one job.
    async fn submit_batch(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the results of a completed job.
    async fn results(&self, job_id: &JobId) -> HalResult<Vec<ExecutionResult>>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// When the job entered each step of the service's lifecycle.
    ///
    /// Backends that do not expose step timing keep the default.
    async fn time_per_step(&self, job_id: &JobId) -> HalResult<StepTimestamps> {
        Err(HalError::Unsupported(format!(
            "{} does not report step timestamps for job {job_id}",
            self.name()
        )))
    }

    /// Wait for a job to complete and return its results.
    ///
    /// Default implementation polls every 500ms for up to 5 minutes.
    async fn wait(&self, job_id: &JobId) -> HalResult<Vec<ExecutionResult>> {
        use tokio::time::sleep;

        for _ in 0..MAX_POLLS {
            let status = self.status(job_id).await?;

            match status {
                JobStatus::Completed => return self.results(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    sleep(POLL_INTERVAL).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.0.clone()))
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new job (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability for a backend with no queue.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}
