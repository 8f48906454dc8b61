//! One file-accept cycle.
//!
//! Accepting a file starts the upload immediately; `analyze` can be called
//! whenever the user asks for results. It never retries the upload, it only
//! waits for it (bounded by the poll budget).

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisState, ProgressEvent, ProgressSink};
use crate::domain::{AnalysisConfig, ImageUpload, NutritionRecord};
use crate::error::{AnalysisError, AppError};
use crate::normalize::normalize;
use crate::pacing::Sleeper;
use crate::transport::{OutcomeHandle, TransportOutcome, WebhookClient, spawn_upload};

pub struct AnalysisSession {
    outcome: OutcomeHandle,
    state: AnalysisState,
    poll_interval: Duration,
    poll_budget: u32,
    sleeper: Arc<dyn Sleeper>,
    upload_thread: Option<JoinHandle<()>>,
}

impl AnalysisSession {
    /// Accept a file: start its upload in the background and return the
    /// session that will observe it.
    pub fn accept(
        client: Arc<WebhookClient>,
        upload: ImageUpload,
        config: &AnalysisConfig,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, AppError> {
        let outcome = OutcomeHandle::new();
        info!(file = upload.part_file_name(), "file accepted; upload started");
        let thread = spawn_upload(client, upload, outcome.clone())?;
        let mut session = Self::observe(outcome, config, sleeper);
        session.upload_thread = Some(thread);
        Ok(session)
    }

    /// A session over an outcome produced elsewhere.
    pub fn observe(outcome: OutcomeHandle, config: &AnalysisConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            outcome,
            state: AnalysisState::Idle,
            poll_interval: config.poll_interval,
            poll_budget: config.poll_budget,
            sleeper,
            upload_thread: None,
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Run one analysis request.
    ///
    /// A failed request leaves the session in `Failed`, from which `analyze`
    /// may be called again (for example after a timeout while the upload is
    /// still running).
    pub fn analyze(&mut self, progress: &dyn ProgressSink) -> Result<NutritionRecord, AnalysisError> {
        self.state = AnalysisState::WaitingForTransport;
        let result = self.wait_for_document(progress).and_then(|document| {
            self.state = AnalysisState::Rendering;
            normalize(&document).map_err(AnalysisError::from)
        });

        match &result {
            Ok(record) => {
                info!(calories = record.calories, "analysis complete");
                self.state = AnalysisState::Done;
            }
            Err(err) => {
                warn!(error = %err, "analysis failed");
                self.state = AnalysisState::Failed;
            }
        }
        result
    }

    /// End this cycle. A finished upload thread is reaped; a still-running
    /// one is left to finish on its own and its outcome goes nowhere.
    pub fn remove(mut self) {
        let Some(thread) = self.upload_thread.take() else {
            return;
        };
        if !thread.is_finished() {
            debug!("discarding session with upload still in flight");
        } else if thread.join().is_err() {
            warn!("upload thread panicked");
        }
    }

    fn wait_for_document(&self, progress: &dyn ProgressSink) -> Result<Value, AnalysisError> {
        let mut polls: u32 = 0;
        let mut reported_secs: u64 = 0;
        loop {
            match self.outcome.get() {
                TransportOutcome::Success(document) => {
                    debug!(polls, "upload outcome ready");
                    if polls > 0 {
                        progress.on_event(ProgressEvent::OutcomeReady);
                    }
                    return Ok(document);
                }
                TransportOutcome::Failure(failure) => {
                    debug!(polls, %failure, "upload outcome is a failure");
                    return Err(AnalysisError::Upload(failure));
                }
                TransportOutcome::Pending if polls >= self.poll_budget => {
                    return Err(AnalysisError::Timeout { polls });
                }
                TransportOutcome::Pending => {
                    self.sleeper.sleep(self.poll_interval);
                    polls += 1;

                    let elapsed_secs = self.poll_interval.saturating_mul(polls).as_secs();
                    if elapsed_secs > reported_secs {
                        reported_secs = elapsed_secs;
                        let budget = u64::from(self.poll_budget.max(1));
                        let percent = ((u64::from(polls) * 100 + budget / 2) / budget).min(100) as u8;
                        debug!(elapsed_secs, percent, "waiting for analysis result");
                        progress.on_event(ProgressEvent::Waiting { elapsed_secs, percent });
                    }
                }
            }
        }
    }
}
