//! Shared "accept → upload → wait → normalize" workflow.
//!
//! The CLI handlers only deal with argument handling and printing; everything
//! between an accepted image and a `NutritionRecord` happens here.

use std::sync::Arc;

use serde_json::Value;

use crate::analysis::{AnalysisSession, ProgressSink};
use crate::domain::{AnalysisConfig, ImageUpload, Language, NutritionRecord};
use crate::error::{AnalysisError, AppError};
use crate::normalize::normalize;
use crate::pacing::{Sleeper, ThreadSleeper};
use crate::report::failure_message;
use crate::transport::WebhookClient;

/// Upload `upload` and wait for its nutrition figures.
pub fn run_analysis(
    config: &AnalysisConfig,
    upload: ImageUpload,
    progress: &dyn ProgressSink,
) -> Result<NutritionRecord, AppError> {
    let sleeper: Arc<dyn Sleeper> = Arc::new(ThreadSleeper);
    run_analysis_with(config, upload, progress, sleeper)
}

/// As [`run_analysis`], with an explicit sleeper for retry and poll pauses.
pub fn run_analysis_with(
    config: &AnalysisConfig,
    upload: ImageUpload,
    progress: &dyn ProgressSink,
    sleeper: Arc<dyn Sleeper>,
) -> Result<NutritionRecord, AppError> {
    let client = Arc::new(WebhookClient::new(config, sleeper.clone())?);
    let mut session = AnalysisSession::accept(client, upload, config, sleeper)?;
    let result = session.analyze(progress);
    session.remove();
    result.map_err(|err| analysis_failure(&err, config.language))
}

/// Normalize an already-received response document.
pub fn run_normalize(document: &Value, lang: Language) -> Result<NutritionRecord, AppError> {
    normalize(document).map_err(|err| analysis_failure(&AnalysisError::from(err), lang))
}

fn analysis_failure(err: &AnalysisError, lang: Language) -> AppError {
    AppError::new(err.exit_code(), failure_message(err, lang))
}
