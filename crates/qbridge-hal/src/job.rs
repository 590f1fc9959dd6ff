//! Job lifecycle types.
//!
//! ```text
//!   submit() ──→ Queued ──→ Running ──→ Completed
//!                  │           │
//!                  │           ├──→ Failed(reason)
//!                  │           │
//!                  └───────────┴──→ Cancelled
//! ```
//!
//! Remote services also report when a job passed each of their internal
//! steps. Those timestamps are kept in [`StepTimestamps`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job is waiting in queue.
    Queued,
    /// Job is currently running.
    Running,
    /// Job completed successfully.
    Completed,
    /// Job failed with an error message.
    Failed(String),
    /// Job was cancelled.
    Cancelled,
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Check if the job is still pending (queued or running).
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A step a remote job passes through, in service order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStep {
    Creating,
    Created,
    Validating,
    Validated,
    Queued,
    Running,
    Completed,
}

impl JobStep {
    /// Parse the upper-case step name used by remote services.
    pub fn from_name(name: &str) -> Option<Self> {
        let step = match name.to_ascii_uppercase().as_str() {
            "CREATING" => JobStep::Creating,
            "CREATED" => JobStep::Created,
            "VALIDATING" => JobStep::Validating,
            "VALIDATED" => JobStep::Validated,
            "QUEUED" => JobStep::Queued,
            "RUNNING" => JobStep::Running,
            "COMPLETED" => JobStep::Completed,
            _ => return None,
        };
        Some(step)
    }

    pub fn name(self) -> &'static str {
        match self {
            JobStep::Creating => "CREATING",
            JobStep::Created => "CREATED",
            JobStep::Validating => "VALIDATING",
            JobStep::Validated => "VALIDATED",
            JobStep::Queued => "QUEUED",
            JobStep::Running => "RUNNING",
            JobStep::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for JobStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// When a job entered each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTimestamps {
    job: JobId,
    steps: BTreeMap<JobStep, DateTime<Utc>>,
}

impl StepTimestamps {
    pub fn new(job: JobId) -> Self {
        Self {
            job,
            steps: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_step(mut self, step: JobStep, at: DateTime<Utc>) -> Self {
        self.steps.insert(step, at);
        self
    }

    pub fn insert(&mut self, step: JobStep, at: DateTime<Utc>) {
        self.steps.insert(step, at);
    }

    pub fn job(&self) -> &JobId {
        &self.job
    }

    pub fn get(&self, step: JobStep) -> Option<DateTime<Utc>> {
        self.steps.get(&step).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobStep, DateTime<Utc>)> + '_ {
        self.steps.iter().map(|(s, t)| (*s, *t))
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Seconds between entering `from` and entering `to`.
    pub fn seconds_between(&self, from: JobStep, to: JobStep) -> HalResult<f64> {
        let start = self.require(from)?;
        let end = self.require(to)?;
        let elapsed = end - start;
        // microsecond resolution; falls back to millis only on overflow
        Ok(match elapsed.num_microseconds() {
            Some(us) => us as f64 / 1e6,
            None => elapsed.num_milliseconds() as f64 / 1e3,
        })
    }

    fn require(&self, step: JobStep) -> HalResult<DateTime<Utc>> {
        self.get(step).ok_or_else(|| HalError::MissingTimestamp {
            job: self.job.0.clone(),
            step,
        })
    }
}

/// A job with metadata for tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Number of shots requested per circuit.
    pub shots: u32,
    /// Number of circuits in the batch.
    pub num_circuits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<JobId>, shots: u32, num_circuits: usize) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            shots,
            num_circuits,
            created_at: Some(Utc::now()),
            finished_at: None,
            backend: None,
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Update the status, stamping the finish time on the first terminal state.
    #[must_use]
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        if self.status.is_terminal() && self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
        self
    }
}
