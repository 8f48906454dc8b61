//! Per-upload outcome slot shared between the upload thread and the
//! analysis session.
//!
//! One handle exists per accepted file. The upload thread is the only writer
//! and the session the only reader; replacing the file means creating a new
//! handle, so a late write from an abandoned upload never reaches the new
//! session.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::warn;

use crate::error::UploadFailure;

/// State of one upload-with-retry sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    Pending,
    Success(Value),
    Failure(UploadFailure),
}

impl TransportOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransportOutcome::Pending)
    }
}

#[derive(Debug, Clone)]
pub struct OutcomeHandle {
    slot: Arc<Mutex<TransportOutcome>>,
}

impl Default for OutcomeHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeHandle {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(TransportOutcome::Pending)),
        }
    }

    /// Current outcome (cloned).
    pub fn get(&self) -> TransportOutcome {
        self.lock().clone()
    }

    /// Record a terminal outcome. A second terminal write replaces the first.
    pub fn complete(&self, result: Result<Value, UploadFailure>) {
        let next = match result {
            Ok(document) => TransportOutcome::Success(document),
            Err(failure) => TransportOutcome::Failure(failure),
        };
        let mut slot = self.lock();
        if slot.is_terminal() {
            warn!("upload outcome written twice; keeping the latest");
        }
        *slot = next;
    }

    fn lock(&self) -> MutexGuard<'_, TransportOutcome> {
        // The slot only ever holds a fully-formed value, so a poisoned lock
        // is still safe to read.
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
