//! Waiting between retries and polls.
//!
//! Every deliberate pause in the pipeline goes through a [`Sleeper`], so the
//! retry and poll schedules can be checked exactly without real waiting.

use std::time::Duration;

#[cfg(test)]
use std::sync::{Arc, Mutex};

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested pauses and returns immediately.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Duration> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn total(&self) -> Duration {
        self.calls().iter().sum()
    }
}

#[cfg(test)]
impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(duration),
            Err(poisoned) => poisoned.into_inner().push(duration),
        }
    }
}
