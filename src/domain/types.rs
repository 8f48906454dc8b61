//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the upload thread and the analysis session
//! - printed as JSON (`--json`)
//! - built directly in tests without touching the network

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Filename used for the multipart `image` part when the file has none.
pub const DEFAULT_UPLOAD_NAME: &str = "upload.jpg";

/// Normalized nutrition figures for one meal.
///
/// The four counters are whole, non-negative numbers; whatever shape the
/// analysis service answered with has already been coerced and rounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl NutritionRecord {
    /// `true` when the record carries a quality note or a tip.
    pub fn has_meal_info(&self) -> bool {
        self.quality.is_some() || self.tip.is_some()
    }
}

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn mime(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
        }
    }

    /// Resolve a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    /// Resolve a declared MIME type. `image/jpg` is accepted as an alias.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// An accepted image, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, kind: ImageKind, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            bytes,
        }
    }

    /// Filename sent in the multipart body.
    pub fn part_file_name(&self) -> &str {
        if self.file_name.trim().is_empty() {
            DEFAULT_UPLOAD_NAME
        } else {
            &self.file_name
        }
    }
}

/// Display language for user-facing messages and units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
}

/// Settings for one upload-and-analyze run.
///
/// Delays and budgets are fixed policy values; the CLI can override them but
/// the defaults mirror what the analysis service was tuned against.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub endpoint: String,
    /// Per-attempt request timeout.
    pub request_timeout: Duration,
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Delay before retrying after HTTP 5xx / 429.
    pub server_error_delay: Duration,
    /// Delay before retrying after a request timeout.
    pub timeout_delay: Duration,
    /// Delay before retrying after a connection-level failure.
    pub network_error_delay: Duration,
    pub poll_interval: Duration,
    /// Maximum number of outcome checks before giving up.
    pub poll_budget: u32,
    pub language: Language,
}

impl AnalysisConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Total attempts per upload, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            request_timeout: Duration::from_secs(60),
            max_retries: 2,
            server_error_delay: Duration::from_secs(2),
            timeout_delay: Duration::from_secs(1),
            network_error_delay: Duration::from_secs(2),
            poll_interval: Duration::from_millis(500),
            poll_budget: 60,
            language: Language::En,
        }
    }
}
