//! Run bookkeeping for remote executions.
//!
//! A [`Tracker`] is inert until started. While active, each call to
//! [`Tracker::update`] stages a record and [`Tracker::record`] commits it
//! to the history and hands it to the optional callback.

use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Seconds a job spent in each phase of its remote lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTime {
    pub creating: f64,
    pub validating: f64,
    pub queued: f64,
    pub running: f64,
}

impl JobTime {
    pub fn total(&self) -> f64 {
        self.creating + self.validating + self.queued + self.running
    }
}

impl AddAssign for JobTime {
    fn add_assign(&mut self, rhs: Self) {
        self.creating += rhs.creating;
        self.validating += rhs.validating;
        self.queued += rhs.queued;
        self.running += rhs.running;
    }
}

impl fmt::Display for JobTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "creating={:.3}s validating={:.3}s queued={:.3}s running={:.3}s",
            self.creating, self.validating, self.queued, self.running
        )
    }
}

/// One committed tracker entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_time: Option<JobTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batches: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executions: Option<u64>,
}

type Callback = Box<dyn FnMut(&RunRecord, &[RunRecord]) + Send + Sync>;

#[derive(Default)]
pub struct Tracker {
    active: bool,
    pending: RunRecord,
    history: Vec<RunRecord>,
    totals: JobTime,
    callback: Option<Callback>,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("active", &self.active)
            .field("records", &self.history.len())
            .field("totals", &self.totals)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a function called with the latest record and the full history.
    #[must_use]
    pub fn with_callback(
        mut self,
        callback: impl FnMut(&RunRecord, &[RunRecord]) + Send + Sync + 'static,
    ) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.pending = RunRecord::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Forget all records and totals.
    pub fn reset(&mut self) {
        self.pending = RunRecord::default();
        self.history.clear();
        self.totals = JobTime::default();
    }

    /// Stage the timing of one job. No-op while inactive.
    pub fn update(&mut self, job_time: JobTime) {
        if !self.active {
            return;
        }
        self.pending.job_time = Some(job_time);
    }

    /// Stage the batch size of one execution. No-op while inactive.
    pub fn update_batch(&mut self, executions: u64) {
        if !self.active {
            return;
        }
        self.pending.batches = Some(1);
        self.pending.executions = Some(executions);
    }

    /// Commit the staged record.
    pub fn record(&mut self) {
        if !self.active {
            return;
        }
        let record = std::mem::take(&mut self.pending);
        if let Some(job_time) = record.job_time {
            self.totals += job_time;
            info!(%job_time, "Job time recorded");
        }
        self.history.push(record);
        if let Some(callback) = self.callback.as_mut() {
            if let Some(latest) = self.history.last() {
                callback(latest, &self.history);
            }
        }
    }

    pub fn history(&self) -> &[RunRecord] {
        &self.history
    }

    pub fn latest(&self) -> Option<&RunRecord> {
        self.history.last()
    }

    /// Summed job times over all records.
    pub fn totals(&self) -> JobTime {
        self.totals
    }
}
