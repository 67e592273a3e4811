//! Background execution of long-running dataset operations.
//!
//! This module sits "above" [`crate::dataset`] and provides:
//!
//! - A rayon pool that runs submitted jobs, and a separate one for the parallel kernels
//! - Throttling of concurrently running jobs
//! - Real-time metrics + observer hooks for monitoring

mod observer;
mod semaphore;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::error;

use crate::dataset::DatasetId;
use crate::error::{EngineError, EngineResult};
use crate::operation::OperationKind;

pub use observer::{EngineEvent, EngineObserver, JobMetrics, JobMetricsSnapshot, TracingObserver};

use semaphore::Semaphore;

/// Runs jobs on a private worker pool, at most `max_in_flight_jobs` at a time.
///
/// Jobs block on the throttle and on dataset locks, so they run on their own pool; parallel
/// kernels go through [`JobRunner::install`] on a second one.
pub struct JobRunner {
    workers: ThreadPool,
    compute: ThreadPool,
    permits: Arc<Semaphore>,
    max_in_flight_jobs: usize,
    observer: Option<Arc<dyn EngineObserver>>,
    metrics: Arc<JobMetrics>,
    next_job: AtomicU64,
}

impl fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRunner")
            .field("num_threads", &self.workers.current_num_threads())
            .field("max_in_flight_jobs", &self.max_in_flight_jobs)
            .field("observer_set", &self.observer.is_some())
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

impl JobRunner {
    /// Build the worker pool.
    ///
    /// `num_threads = None` uses the platform's available parallelism.
    pub fn new(num_threads: Option<usize>, max_in_flight_jobs: usize) -> EngineResult<Self> {
        if num_threads == Some(0) {
            return Err(EngineError::Config {
                key: "num_threads".to_string(),
                message: "must be > 0".to_string(),
            });
        }
        if max_in_flight_jobs == 0 {
            return Err(EngineError::Config {
                key: "max_in_flight_jobs".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        let n_threads = num_threads.unwrap_or_else(default_parallelism);
        let workers = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("dataprep-worker-{i}"))
            .build()?;
        let compute = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("dataprep-compute-{i}"))
            .build()?;

        Ok(Self {
            workers,
            compute,
            permits: Arc::new(Semaphore::new(max_in_flight_jobs)),
            max_in_flight_jobs,
            observer: None,
            metrics: Arc::new(JobMetrics::new()),
            next_job: AtomicU64::new(1),
        })
    }

    /// Attach an observer for job events.
    pub fn with_observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time job metrics.
    pub fn metrics(&self) -> Arc<JobMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run `f` inside the compute pool, so rayon parallel iterators use its threads.
    ///
    /// `f` must not hold a dataset lock while it runs parallel work.
    pub fn install<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.compute.install(f)
    }

    /// Queue `job` and return immediately.
    ///
    /// The job waits for a free slot, runs on a worker thread, and sends its result to the
    /// returned handle. A panicking job resolves to [`EngineError::Internal`].
    pub fn submit<T, F>(&self, dataset: DatasetId, operation: OperationKind, job: F) -> JobHandle<T>
    where
        F: FnOnce() -> EngineResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let id = self.next_job.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();

        self.metrics.on_submit();
        emit(
            self.observer.as_deref(),
            EngineEvent::JobSubmitted {
                job: id,
                dataset,
                operation,
            },
        );

        let permits = Arc::clone(&self.permits);
        let metrics = Arc::clone(&self.metrics);
        let observer = self.observer.clone();
        self.workers.spawn(move || {
            let waited = permits.acquire();
            if waited > Duration::ZERO {
                metrics.on_throttle_wait(waited);
                emit(
                    observer.as_deref(),
                    EngineEvent::ThrottleWaited {
                        job: id,
                        duration: waited,
                    },
                );
            }

            metrics.on_start();
            let start = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
                error!(job = id, %dataset, %operation, "job panicked");
                Err(EngineError::internal(format!("job {id} panicked")))
            });
            let succeeded = result.is_ok();
            metrics.on_finish(succeeded);
            permits.release();
            emit(
                observer.as_deref(),
                EngineEvent::JobFinished {
                    job: id,
                    elapsed: start.elapsed(),
                    succeeded,
                },
            );

            // The caller may have dropped the handle; the result is then discarded.
            let _ = tx.send(result);
        });

        JobHandle { id, rx }
    }
}

fn emit(observer: Option<&dyn EngineObserver>, event: EngineEvent) {
    if let Some(obs) = observer {
        obs.on_event(&event);
    }
}

pub(crate) fn default_parallelism() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Pending result of a submitted job.
#[derive(Debug)]
pub struct JobHandle<T> {
    id: u64,
    rx: Receiver<EngineResult<T>>,
}

impl<T> JobHandle<T> {
    /// Runner-assigned job number.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the job finishes.
    pub fn join(self) -> EngineResult<T> {
        self.rx
            .recv()
            .map_err(|_| EngineError::internal(format!("job {} was dropped by the worker pool", self.id)))?
    }

    /// The result if the job already finished, without blocking.
    pub fn try_join(&self) -> Option<EngineResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(EngineError::internal(format!(
                "job {} was dropped by the worker pool",
                self.id
            )))),
        }
    }
}
