//! Thread-safe map from [`DatasetId`] to [`Dataset`].
//!
//! The registry lock only guards the map itself. Operations on a dataset take that dataset's own
//! lock, so work on distinct datasets proceeds in parallel and never blocks registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::dataset::{Dataset, DatasetId, DatasetSettings};
use crate::error::{EngineError, EngineResult};
use crate::execution::{EngineEvent, EngineObserver};
use crate::types::Table;

/// Owns every live dataset.
pub struct DatasetRegistry {
    datasets: RwLock<HashMap<DatasetId, Arc<Dataset>>>,
    settings: DatasetSettings,
    /// Base seed for sampling; each dataset gets `seed + registration number`.
    sample_seed: Option<u64>,
    registered: AtomicU64,
    observer: Option<Arc<dyn EngineObserver>>,
}

impl fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("count", &self.count())
            .field("settings", &self.settings)
            .field("sample_seed", &self.sample_seed)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::new(DatasetSettings::default())
    }
}

impl DatasetRegistry {
    pub fn new(settings: DatasetSettings) -> Self {
        Self {
            datasets: RwLock::new(HashMap::new()),
            settings,
            sample_seed: None,
            registered: AtomicU64::new(0),
            observer: None,
        }
    }

    /// Seed every dataset's sampler deterministically.
    pub fn with_sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    /// Attach an observer; it is also handed to every registered dataset.
    pub fn with_observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Wrap `table` as a new dataset and register it.
    pub fn register(&self, table: Table, name: Option<String>) -> Arc<Dataset> {
        let (rows, columns) = table.shape();
        let seq = self.registered.fetch_add(1, Ordering::SeqCst);

        let mut dataset = Dataset::new(table, self.settings.clone());
        if let Some(name) = name {
            dataset = dataset.with_name(name);
        }
        if let Some(seed) = self.sample_seed {
            dataset = dataset.with_seed(seed.wrapping_add(seq));
        }
        if let Some(observer) = &self.observer {
            dataset = dataset.with_observer(Arc::clone(observer));
        }

        let dataset = Arc::new(dataset);
        let id = dataset.id();
        self.write().insert(id, Arc::clone(&dataset));

        info!(dataset = %id, rows, columns, name = dataset.name(), "dataset registered");
        self.emit(EngineEvent::DatasetRegistered {
            dataset: id,
            rows,
            columns,
        });
        dataset
    }

    /// Dataset registered under `id`.
    pub fn get(&self, id: &DatasetId) -> EngineResult<Arc<Dataset>> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound { id: id.to_string() })
    }

    /// Remove a dataset. Returns `false` if it was not registered.
    ///
    /// Callers still holding the `Arc` can finish what they are doing.
    pub fn delete(&self, id: &DatasetId) -> bool {
        let removed = self.write().remove(id).is_some();
        if removed {
            info!(dataset = %id, "dataset deleted");
            self.emit(EngineEvent::DatasetDeleted { dataset: *id });
        }
        removed
    }

    /// Number of registered datasets.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<DatasetId, Arc<Dataset>>> {
        self.datasets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DatasetId, Arc<Dataset>>> {
        self.datasets.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
