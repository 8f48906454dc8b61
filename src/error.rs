//! Error types.
//!
//! The pipeline reports typed failures (`UploadFailure`, `NormalizeError`,
//! `AnalysisError`); the binary turns them into an `AppError`, which carries a
//! user-facing message and the process exit code.

use thiserror::Error;

/// Exit code for usage, configuration and input-file problems.
pub const EXIT_USAGE: u8 = 2;
/// Exit code when the upload never produced a response document.
pub const EXIT_UPLOAD: u8 = 3;
/// Exit code when the wait for the upload outcome ran out.
pub const EXIT_TIMEOUT: u8 = 4;
/// Exit code when the response could not be read as nutrition data.
pub const EXIT_DATA_FORMAT: u8 = 5;

/// Terminal failure of one upload-with-retry sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadFailure {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },
    #[error("{0}")]
    Unknown(String),
}

impl UploadFailure {
    pub fn http(status: reqwest::StatusCode) -> Self {
        UploadFailure::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

/// The response document matched none of the known nutrition shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("no nutrition figures found in response document")]
    DataFormat,
}

/// Why an analysis request ended in the failed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("upload failed: {0}")]
    Upload(UploadFailure),
    #[error("no analysis result within {polls} polls")]
    Timeout { polls: u32 },
    #[error(transparent)]
    DataFormat(#[from] NormalizeError),
}

impl AnalysisError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::Upload(_) => EXIT_UPLOAD,
            AnalysisError::Timeout { .. } => EXIT_TIMEOUT,
            AnalysisError::DataFormat(_) => EXIT_DATA_FORMAT,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
