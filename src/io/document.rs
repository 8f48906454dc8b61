//! Reading a saved webhook response for offline normalization.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::{AppError, EXIT_USAGE};
use crate::transport::response::interpret_body;

/// Read a response body from a file (or stdin for `-`) and interpret it as
/// the upload client would have, given the declared content type.
pub fn read_response_document(path: &Path, content_type: &str) -> Result<Value, AppError> {
    let body = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to read stdin: {e}")))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| {
            AppError::new(EXIT_USAGE, format!("Failed to read response file '{}': {e}", path.display()))
        })?
    };
    Ok(interpret_body(Some(content_type), &body))
}
