//! Analysis orchestration: wait for the upload outcome, normalize it, and
//! report the result.

pub mod session;

pub use session::AnalysisSession;

/// Where one analysis request currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    /// Nothing requested yet.
    Idle,
    WaitingForTransport,
    Rendering,
    Done,
    /// The last request failed; a new request may be made.
    Failed,
}

/// Events emitted while an analysis request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Still waiting for the upload; sent once per elapsed second.
    Waiting {
        elapsed_secs: u64,
        /// Share of the poll budget used, 0–100.
        percent: u8,
    },
    /// The upload outcome is available.
    OutcomeReady,
}

/// Receiver for progress events.
pub trait ProgressSink {
    fn on_event(&self, event: ProgressEvent);
}

impl<F: Fn(ProgressEvent)> ProgressSink for F {
    fn on_event(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards progress events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}
