//! Upload transport: posts the image to the analysis webhook and records the
//! outcome for the analysis session.
//!
//! - `webhook`: HTTP client with timeout and retry
//! - `response`: body → document interpretation
//! - `outcome`: the per-upload result slot

pub mod outcome;
pub mod response;
pub mod webhook;

use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::debug;

pub use outcome::{OutcomeHandle, TransportOutcome};
pub use webhook::{RetryPolicy, WebhookClient};

use crate::domain::ImageUpload;
use crate::error::{AppError, EXIT_UPLOAD};

/// Start the upload on a background thread. The thread writes exactly one
/// terminal outcome into `handle` and then exits.
pub fn spawn_upload(
    client: Arc<WebhookClient>,
    upload: ImageUpload,
    handle: OutcomeHandle,
) -> Result<JoinHandle<()>, AppError> {
    std::thread::Builder::new()
        .name("nutrisnap-upload".to_string())
        .spawn(move || {
            let result = client.submit(&upload);
            debug!(ok = result.is_ok(), "upload finished; publishing outcome");
            handle.complete(result);
        })
        .map_err(|e| AppError::new(EXIT_UPLOAD, format!("Failed to start upload thread: {e}")))
}
