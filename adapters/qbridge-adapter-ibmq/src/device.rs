//! The IBM Q remote device.

use std::fmt;
use std::sync::Arc;

use qbridge_convert::Wires;
use qbridge_hal::{
    Backend, ExecutionResult, HalError, HalResult, Job, JobStatus, JobStep, JobTime,
    StepTimestamps, Tracker,
};
use qbridge_ir::Circuit;
use tracing::{debug, info, warn};

use crate::account::SharedSession;
use crate::backend::IbmqBackend;
use crate::config::DeviceConfig;
use crate::error::{IbmqError, IbmqResult};
use crate::provider::Provider;

/// A remote IBM Q backend exposed as a device.
///
/// Circuits are executed in batches: one remote job per
/// [`batch_execute`](Self::batch_execute) call, one result per circuit.
pub struct IbmqDevice {
    config: DeviceConfig,
    wires: Wires,
    provider: Provider,
    backend: Arc<dyn Backend>,
    tracker: Tracker,
    current_job: Option<Job>,
}

impl fmt::Debug for IbmqDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmqDevice")
            .field("backend", &self.backend.name())
            .field("wires", &self.wires)
            .field("shots", &self.config.shots)
            .field("provider", &self.provider)
            .field("current_job", &self.current_job.as_ref().map(|j| &j.id))
            .finish_non_exhaustive()
    }
}

impl IbmqDevice {
    pub const SHORT_NAME: &'static str = "qiskit.ibmq";

    /// Connect `session` and build a device on the configured backend.
    ///
    /// An explicit `provider` wins over the hub/group/project in `config`.
    pub async fn new(
        config: DeviceConfig,
        provider: Option<Provider>,
        session: &SharedSession,
    ) -> IbmqResult<Self> {
        let account = {
            let mut session = session.write().await;
            if let Some(path) = &config.credentials_path {
                session.set_credentials_path(path);
            }
            let outcome = session.connect(config.token.as_deref(), config.url.as_deref())?;
            debug!(?outcome, "IBM Q session ready");
            session.active().cloned().ok_or(IbmqError::NoAccount)?
        };

        let provider = provider.unwrap_or_else(|| Provider::from_config(&config));
        let backend = IbmqBackend::new(&account, &provider, &config.backend)?;
        info!(
            backend = %config.backend,
            provider = %provider,
            "Connected IBM Q device"
        );
        Ok(Self::with_backend(config, provider, Arc::new(backend)))
    }

    /// Build a device on an already constructed backend.
    pub fn with_backend(config: DeviceConfig, provider: Provider, backend: Arc<dyn Backend>) -> Self {
        Self {
            wires: config.wires.to_wires(),
            config,
            provider,
            backend,
            tracker: Tracker::new(),
            current_job: None,
        }
    }

    pub fn short_name(&self) -> &'static str {
        Self::SHORT_NAME
    }

    pub fn wires(&self) -> &Wires {
        &self.wires
    }

    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }

    pub fn shots(&self) -> u32 {
        self.config.shots
    }

    pub fn set_shots(&mut self, shots: u32) {
        self.config.shots = shots;
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    /// The job started by the last [`batch_execute`](Self::batch_execute).
    pub fn current_job(&self) -> Option<&Job> {
        self.current_job.as_ref()
    }

    /// Run `circuits` as one remote job and wait for the results.
    ///
    /// With an active tracker the batch and its job timing are recorded.
    pub async fn batch_execute(&mut self, circuits: &[Circuit]) -> IbmqResult<Vec<ExecutionResult>> {
        if let Some(circuit) = circuits.iter().find(|c| c.num_qubits() > self.num_wires()) {
            return Err(IbmqError::CircuitError(format!(
                "circuit '{}' acts on {} qubits but the device has {} wires",
                circuit.name(),
                circuit.num_qubits(),
                self.num_wires()
            )));
        }

        let shots = self.config.shots;
        let job_id = self.backend.submit_batch(circuits, shots).await?;
        self.current_job =
            Some(Job::new(job_id.clone(), shots, circuits.len()).with_backend(self.backend.name()));

        let outcome = self.backend.wait(&job_id).await;
        let status = match &outcome {
            Ok(_) => JobStatus::Completed,
            Err(HalError::JobCancelled) => JobStatus::Cancelled,
            Err(e) => JobStatus::Failed(e.to_string()),
        };
        if let Some(job) = self.current_job.take() {
            self.current_job = Some(job.with_status(status));
        }
        let results = outcome?;

        if results.len() != circuits.len() {
            return Err(IbmqError::Hal(HalError::Backend(format!(
                "job {job_id} returned {} results for {} circuits",
                results.len(),
                circuits.len()
            ))));
        }

        if self.tracker.is_active() {
            // Fetch timing before committing either record.
            let timing = self.current_job_time().await;
            self.tracker.update_batch(circuits.len() as u64);
            self.tracker.record();
            match timing {
                Ok(job_time) => {
                    self.tracker.update(job_time);
                    self.tracker.record();
                }
                Err(e) => warn!("Job {job_id} timing not recorded: {e}"),
            }
        }
        Ok(results)
    }

    /// Record how long the current job spent in each remote step.
    pub async fn track_run(&mut self) -> IbmqResult<JobTime> {
        let job_time = self.current_job_time().await?;
        self.tracker.update(job_time);
        self.tracker.record();
        Ok(job_time)
    }

    async fn current_job_time(&self) -> IbmqResult<JobTime> {
        let job = self.current_job.as_ref().ok_or(IbmqError::NoCurrentJob)?;
        let stamps = self.backend.time_per_step(&job.id).await?;
        Ok(job_time(&stamps)?)
    }
}

/// Phase durations of a job from its step timestamps.
pub fn job_time(stamps: &StepTimestamps) -> HalResult<JobTime> {
    Ok(JobTime {
        creating: stamps.seconds_between(JobStep::Creating, JobStep::Created)?,
        validating: stamps.seconds_between(JobStep::Validating, JobStep::Validated)?,
        queued: stamps.seconds_between(JobStep::Queued, JobStep::Running)?,
        running: stamps.seconds_between(JobStep::Running, JobStep::Completed)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_job_time() {
        let t0 = Utc.with_ymd_and_hms(2021, 3, 1, 10, 0, 0).unwrap();
        let stamps = StepTimestamps::new("job".into())
            .with_step(JobStep::Creating, t0)
            .with_step(JobStep::Created, t0 + Duration::seconds(1))
            .with_step(JobStep::Validating, t0 + Duration::seconds(2))
            .with_step(JobStep::Validated, t0 + Duration::milliseconds(2500))
            .with_step(JobStep::Queued, t0 + Duration::seconds(3))
            .with_step(JobStep::Running, t0 + Duration::seconds(63))
            .with_step(JobStep::Completed, t0 + Duration::seconds(65));
        let time = job_time(&stamps).unwrap();
        assert_eq!(
            time,
            JobTime {
                creating: 1.0,
                validating: 0.5,
                queued: 60.0,
                running: 2.0,
            }
        );
    }

    #[test]
    fn test_job_time_missing_step() {
        let t0 = Utc.with_ymd_and_hms(2021, 3, 1, 10, 0, 0).unwrap();
        let stamps = StepTimestamps::new("job".into())
            .with_step(JobStep::Creating, t0)
            .with_step(JobStep::Created, t0);
        assert!(matches!(
            job_time(&stamps),
            Err(HalError::MissingTimestamp {
                step: JobStep::Validating,
                ..
            })
        ));
    }
}
