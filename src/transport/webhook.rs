//! Webhook upload client.
//!
//! One `submit` call is one upload-with-retry sequence: the image is posted as
//! multipart form data, retryable failures are retried a fixed number of
//! times with fixed delays, and the first success or the last failure is
//! returned.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{AnalysisConfig, ImageUpload};
use crate::error::{AppError, EXIT_USAGE, UploadFailure};
use crate::pacing::Sleeper;
use crate::transport::response::interpret_body;

/// Environment variable holding the webhook URL.
pub const ENDPOINT_ENV: &str = "NUTRISNAP_WEBHOOK_URL";

/// Delays between attempts, by failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub server_error_delay: Duration,
    pub timeout_delay: Duration,
    pub network_error_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            server_error_delay: config.server_error_delay,
            timeout_delay: config.timeout_delay,
            network_error_delay: config.network_error_delay,
        }
    }

    /// Delay before the next attempt, or `None` if this failure is final.
    pub fn delay_for(&self, failure: &UploadFailure) -> Option<Duration> {
        match failure {
            UploadFailure::Http { status, .. }
                if *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16() =>
            {
                Some(self.server_error_delay)
            }
            UploadFailure::Timeout => Some(self.timeout_delay),
            UploadFailure::Network(_) => Some(self.network_error_delay),
            UploadFailure::Http { .. } | UploadFailure::Unknown(_) => None,
        }
    }
}

pub struct WebhookClient {
    client: Client,
    endpoint: Url,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl WebhookClient {
    pub fn new(config: &AnalysisConfig, sleeper: Arc<dyn Sleeper>) -> Result<Self, AppError> {
        let endpoint = Url::parse(config.endpoint.trim()).map_err(|e| {
            AppError::new(EXIT_USAGE, format!("Invalid webhook URL '{}': {e}", config.endpoint))
        })?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            policy: RetryPolicy::from_config(config),
            sleeper,
        })
    }

    /// Read the webhook URL from the environment (and `.env`).
    pub fn endpoint_from_env() -> Result<String, AppError> {
        dotenvy::dotenv().ok();
        std::env::var(ENDPOINT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AppError::new(
                    EXIT_USAGE,
                    format!("Missing {ENDPOINT_ENV} in environment (.env), and no --endpoint given."),
                )
            })
    }

    /// Upload with retries. Returns the interpreted response document.
    pub fn submit(&self, upload: &ImageUpload) -> Result<Value, UploadFailure> {
        let max_attempts = self.policy.max_retries.saturating_add(1);
        info!(
            file = upload.part_file_name(),
            bytes = upload.bytes.len(),
            mime = upload.kind.mime(),
            endpoint = %self.endpoint,
            "uploading image"
        );

        let mut attempt = 1;
        loop {
            debug!(attempt, max_attempts, "upload attempt");
            let failure = match self.send_once(upload) {
                Ok(document) => {
                    info!(attempt, "upload succeeded");
                    return Ok(document);
                }
                Err(failure) => failure,
            };

            match self.policy.delay_for(&failure) {
                Some(delay) if attempt < max_attempts => {
                    info!(attempt, max_attempts, %failure, ?delay, "upload failed; retrying");
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
                _ => {
                    warn!(attempt, max_attempts, %failure, "upload failed");
                    return Err(failure);
                }
            }
        }
    }

    fn send_once(&self, upload: &ImageUpload) -> Result<Value, UploadFailure> {
        let image = Part::bytes(upload.bytes.clone())
            .file_name(upload.part_file_name().to_string())
            .mime_str(upload.kind.mime())
            .map_err(|e| UploadFailure::Unknown(format!("invalid image part: {e}")))?;
        let form = Form::new()
            .part("image", image)
            .text("timestamp", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        let resp = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .map_err(classify_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            debug!(status = status.as_u16(), body = body_excerpt(&body), "webhook returned an error status");
            return Err(UploadFailure::http(status));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        debug!(status = status.as_u16(), content_type = ?content_type, "webhook response received");

        let body = resp.text().map_err(classify_error)?;
        Ok(interpret_body(content_type.as_deref(), &body))
    }
}

/// Longest error-body prefix written to the log.
const BODY_EXCERPT_CHARS: usize = 200;

fn body_excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

fn classify_error(err: reqwest::Error) -> UploadFailure {
    if err.is_timeout() {
        UploadFailure::Timeout
    } else if err.is_connect() || err.is_request() {
        UploadFailure::Network(err.to_string())
    } else {
        UploadFailure::Unknown(err.to_string())
    }
}
