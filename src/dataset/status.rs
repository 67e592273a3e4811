//! Status of the operation a dataset is running, readable without waiting on the dataset lock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::operation::OperationKind;

/// Lifecycle state of a dataset's latest operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Idle,
    Processing,
    Completed,
    Error,
}

/// Point-in-time copy of a dataset's status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub status: ProcessingState,
    /// Percentage in `[0, 100]`.
    pub progress: u8,
    pub message: String,
    /// Operation that set this status; `None` while idle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationKind>,
    pub updated_at: DateTime<Utc>,
}

impl StatusReport {
    fn idle(message: &str) -> Self {
        Self {
            status: ProcessingState::Idle,
            progress: 0,
            message: message.to_string(),
            operation: None,
            updated_at: Utc::now(),
        }
    }
}

/// Holds the status behind its own short-lived lock.
///
/// Writers only hold the lock for the duration of a field update, so polling never blocks on a
/// running operation.
#[derive(Debug)]
pub struct StatusTracker {
    inner: Mutex<StatusReport>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StatusReport::idle("Dataset loaded")),
        }
    }

    pub fn snapshot(&self) -> StatusReport {
        self.lock().clone()
    }

    pub(crate) fn begin(&self, operation: OperationKind) {
        let mut s = self.lock();
        s.status = ProcessingState::Processing;
        s.progress = 0;
        s.message = operation.start_message().to_string();
        s.operation = Some(operation);
        s.updated_at = Utc::now();
    }

    pub(crate) fn progress(&self, progress: u8, message: &str) {
        let mut s = self.lock();
        s.progress = progress.min(100);
        s.message = message.to_string();
        s.updated_at = Utc::now();
    }

    pub(crate) fn complete(&self, message: String) {
        let mut s = self.lock();
        s.status = ProcessingState::Completed;
        s.progress = 100;
        s.message = message;
        s.updated_at = Utc::now();
    }

    pub(crate) fn fail(&self, message: String) {
        let mut s = self.lock();
        s.status = ProcessingState::Error;
        s.message = message;
        s.updated_at = Utc::now();
    }

    pub(crate) fn reset(&self) {
        *self.lock() = StatusReport::idle("Dataset reset to original state");
    }

    fn lock(&self) -> MutexGuard<'_, StatusReport> {
        // Every update writes whole fields, so a poisoned status is still coherent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
