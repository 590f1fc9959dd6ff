//! qbridge Hardware Abstraction Layer
//!
//! The contract between device front-ends and remote executors:
//! - A common [`Backend`] trait for batch submission and job management
//! - Job lifecycle types, including per-step timestamps ([`StepTimestamps`])
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//! - Run bookkeeping via [`Tracker`]
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use qbridge_hal::{Backend, BackendAvailability, ExecutionResult, HalResult, JobId, JobStatus};
//! use qbridge_ir::Circuit;
//! use async_trait::async_trait;
//!
//! struct MyBackend;
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!     async fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::always_available())
//!     }
//!     async fn submit_batch(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> { todo!() }
//!     async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> { todo!() }
//!     async fn results(&self, job_id: &JobId) -> HalResult<Vec<ExecutionResult>> { todo!() }
//!     async fn cancel(&self, job_id: &JobId) -> HalResult<()> { todo!() }
//! }
//! ```

pub mod backend;
pub mod error;
pub mod job;
pub mod result;
pub mod tracker;

pub use backend::{Backend, BackendAvailability, MAX_POLLS, POLL_INTERVAL};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus, JobStep, StepTimestamps};
pub use result::{Counts, ExecutionResult};
pub use tracker::{JobTime, RunRecord, Tracker};
