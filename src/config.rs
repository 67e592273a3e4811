//! Engine configuration: a plain options struct with defaults, optionally overlaid from the
//! environment.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::dataset::DatasetSettings;
use crate::error::{EngineError, EngineResult};
use crate::execution::{default_parallelism, EngineObserver};
use crate::ingestion::{IngestionObserver, IngestionSeverity};
use crate::processing::ProcessingOptions;

/// Worker threads (`> 0`).
pub const ENV_THREADS: &str = "DATAPREP_THREADS";
/// Concurrently running background jobs (`> 0`).
pub const ENV_MAX_IN_FLIGHT_JOBS: &str = "DATAPREP_MAX_IN_FLIGHT_JOBS";
/// Sample cache TTL in seconds.
pub const ENV_SAMPLE_TTL_SECS: &str = "DATAPREP_SAMPLE_TTL_SECS";
/// Row limit for ingestion; `0` disables it.
pub const ENV_MAX_ROWS: &str = "DATAPREP_MAX_ROWS";
/// Seed for the dataset samplers.
pub const ENV_SAMPLE_SEED: &str = "DATAPREP_SAMPLE_SEED";

/// Options for [`crate::engine::Engine`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct EngineOptions {
    /// Threads in each pool: one runs background jobs, the other parallel kernels.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Upper bound on concurrently running background jobs.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_jobs: usize,
    pub sample_ttl: Duration,
    pub max_onehot_categories: usize,
    pub knn_max_neighbors: usize,
    /// Ingestion rejects payloads with more rows. `None` disables the limit.
    pub max_rows: Option<usize>,
    pub max_preview_rows: usize,
    /// If `None`, samplers are seeded from the OS.
    pub sample_seed: Option<u64>,
    /// Observer for dataset, operation and job events.
    pub observer: Option<Arc<dyn EngineObserver>>,
    /// Observer for ingestion outcomes.
    pub ingestion_observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which the ingestion observer's `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("num_threads", &self.num_threads)
            .field("max_in_flight_jobs", &self.max_in_flight_jobs)
            .field("sample_ttl", &self.sample_ttl)
            .field("max_onehot_categories", &self.max_onehot_categories)
            .field("knn_max_neighbors", &self.knn_max_neighbors)
            .field("max_rows", &self.max_rows)
            .field("max_preview_rows", &self.max_preview_rows)
            .field("sample_seed", &self.sample_seed)
            .field("observer_set", &self.observer.is_some())
            .field("ingestion_observer_set", &self.ingestion_observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        let n = default_parallelism();
        let processing = ProcessingOptions::default();
        Self {
            num_threads: Some(n),
            max_in_flight_jobs: n.max(1),
            sample_ttl: Duration::from_secs(30),
            max_onehot_categories: processing.max_onehot_categories,
            knn_max_neighbors: processing.knn_max_neighbors,
            max_rows: Some(100_000),
            max_preview_rows: 50,
            sample_seed: None,
            observer: None,
            ingestion_observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

impl EngineOptions {
    /// Defaults overlaid with the `DATAPREP_*` environment variables.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup` (keyed by the `ENV_*` names).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let mut opts = Self::default();
        if let Some(n) = parse::<usize>(&lookup, ENV_THREADS)? {
            opts.num_threads = Some(positive(ENV_THREADS, n)?);
        }
        if let Some(n) = parse::<usize>(&lookup, ENV_MAX_IN_FLIGHT_JOBS)? {
            opts.max_in_flight_jobs = positive(ENV_MAX_IN_FLIGHT_JOBS, n)?;
        }
        if let Some(secs) = parse::<u64>(&lookup, ENV_SAMPLE_TTL_SECS)? {
            opts.sample_ttl = Duration::from_secs(secs);
        }
        if let Some(n) = parse::<usize>(&lookup, ENV_MAX_ROWS)? {
            opts.max_rows = (n > 0).then_some(n);
        }
        if let Some(seed) = parse::<u64>(&lookup, ENV_SAMPLE_SEED)? {
            opts.sample_seed = Some(seed);
        }
        Ok(opts)
    }

    /// Per-dataset part of these options.
    pub fn dataset_settings(&self) -> DatasetSettings {
        DatasetSettings {
            processing: ProcessingOptions {
                max_onehot_categories: self.max_onehot_categories,
                knn_max_neighbors: self.knn_max_neighbors,
            },
            sample_ttl: self.sample_ttl,
            max_preview_rows: self.max_preview_rows,
        }
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> EngineResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| EngineError::Config {
            key: key.to_string(),
            message: format!("'{raw}': {e}"),
        }),
    }
}

fn positive(key: &str, n: usize) -> EngineResult<usize> {
    if n == 0 {
        Err(EngineError::Config {
            key: key.to_string(),
            message: "must be > 0".to_string(),
        })
    } else {
        Ok(n)
    }
}
