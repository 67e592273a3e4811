use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dataset::DatasetId;
use crate::operation::OperationKind;

/// Events emitted by datasets, the registry and the job runner.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    DatasetRegistered {
        dataset: DatasetId,
        rows: usize,
        columns: usize,
    },
    DatasetDeleted {
        dataset: DatasetId,
    },
    DatasetReset {
        dataset: DatasetId,
    },
    OperationStarted {
        dataset: DatasetId,
        operation: OperationKind,
    },
    OperationProgress {
        dataset: DatasetId,
        operation: OperationKind,
        progress: u8,
    },
    OperationFinished {
        dataset: DatasetId,
        operation: OperationKind,
        elapsed: Duration,
    },
    OperationFailed {
        dataset: DatasetId,
        operation: OperationKind,
        message: String,
    },
    JobSubmitted {
        job: u64,
        dataset: DatasetId,
        operation: OperationKind,
    },
    ThrottleWaited {
        job: u64,
        duration: Duration,
    },
    JobFinished {
        job: u64,
        elapsed: Duration,
        succeeded: bool,
    },
}

/// Observer hook for engine events.
pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: &EngineEvent);
}

/// Forwards engine events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn on_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::DatasetRegistered { dataset, rows, columns } => {
                info!(%dataset, rows, columns, "dataset registered");
            }
            EngineEvent::DatasetDeleted { dataset } => info!(%dataset, "dataset deleted"),
            EngineEvent::DatasetReset { dataset } => info!(%dataset, "dataset reset"),
            EngineEvent::OperationStarted { dataset, operation } => {
                debug!(%dataset, %operation, "operation started");
            }
            EngineEvent::OperationProgress { dataset, operation, progress } => {
                debug!(%dataset, %operation, progress, "operation progress");
            }
            EngineEvent::OperationFinished { dataset, operation, elapsed } => {
                info!(%dataset, %operation, ?elapsed, "operation finished");
            }
            EngineEvent::OperationFailed { dataset, operation, message } => {
                warn!(%dataset, %operation, %message, "operation failed");
            }
            EngineEvent::JobSubmitted { job, dataset, operation } => {
                debug!(job, %dataset, %operation, "job submitted");
            }
            EngineEvent::ThrottleWaited { job, duration } => debug!(job, ?duration, "job throttled"),
            EngineEvent::JobFinished { job, elapsed, succeeded } => {
                debug!(job, ?elapsed, succeeded, "job finished");
            }
        }
    }
}

/// Real-time counters for background jobs.
///
/// The job runner updates these while jobs run; callers can snapshot them at any time.
#[derive(Debug, Default)]
pub struct JobMetrics {
    submitted: AtomicU64,
    started: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    throttle_wait_ns: AtomicU64,

    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl JobMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_submit(&self) {
        let _ = self.submitted.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn on_start(&self) {
        let _ = self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        update_max_usize(&self.max_active, now);
    }

    pub(crate) fn on_finish(&self, succeeded: bool) {
        let counter = if succeeded { &self.succeeded } else { &self.failed };
        let _ = counter.fetch_add(1, Ordering::SeqCst);
        let _ = self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn on_throttle_wait(&self, d: Duration) {
        let add = d.as_nanos().min(u64::MAX as u128) as u64;
        let _ = self.throttle_wait_ns.fetch_add(add, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> JobMetricsSnapshot {
        JobMetricsSnapshot {
            submitted: self.submitted.load(Ordering::SeqCst),
            started: self.started.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            active: self.active.load(Ordering::SeqCst),
            max_active: self.max_active.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
        }
    }
}

fn update_max_usize(dst: &AtomicUsize, now: usize) {
    loop {
        let cur = dst.load(Ordering::SeqCst);
        if now <= cur {
            break;
        }
        if dst
            .compare_exchange(cur, now, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            break;
        }
    }
}

/// Immutable snapshot of [`JobMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMetricsSnapshot {
    pub submitted: u64,
    pub started: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub active: usize,
    pub max_active: usize,
    pub throttle_wait: Duration,
}

impl JobMetricsSnapshot {
    /// Jobs that ran to completion, successfully or not.
    pub fn finished(&self) -> u64 {
        self.succeeded + self.failed
    }
}

impl fmt::Display for JobMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "jobs={}/{}/{} (finished/started/submitted), failed={}, active={}, max_active={}, throttle_wait={:?}",
            self.finished(),
            self.started,
            self.submitted,
            self.failed,
            self.active,
            self.max_active,
            self.throttle_wait
        )
    }
}
