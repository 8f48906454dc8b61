//! Turning a successful webhook response body into a document.
//!
//! JSON bodies are parsed; anything that cannot be parsed is kept verbatim as
//! `{"rawResponse": "<text>"}` so the normalizer can still look at it.

use serde_json::{Value, json};
use tracing::{debug, warn};

/// Interpret a 2xx response body given its `Content-Type` header.
pub fn interpret_body(content_type: Option<&str>, body: &str) -> Value {
    if !declares_json(content_type) {
        debug!(content_type = content_type.unwrap_or("<none>"), "non-JSON response; keeping raw text");
        return wrap_raw(body);
    }

    match serde_json::from_str::<Value>(body) {
        Ok(doc) => return doc,
        Err(err) => warn!(error = %err, "JSON response did not parse"),
    }

    let trimmed = body.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(doc) => {
                debug!("JSON parsed after trimming");
                return doc;
            }
            Err(err) => warn!(error = %err, "trimmed JSON response did not parse"),
        }
    }

    wrap_raw(body)
}

fn wrap_raw(body: &str) -> Value {
    json!({ "rawResponse": body })
}

fn declares_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_parses_body() {
        let doc = interpret_body(Some("application/json; charset=utf-8"), r#"[{"output":{}}]"#);
        assert_eq!(doc, json!([{"output": {}}]));
    }

    #[test]
    fn bom_prefixed_json_is_recovered() {
        let doc = interpret_body(Some("Application/JSON"), "\u{feff}  {\"calories\": 5}\n");
        assert_eq!(doc, json!({"calories": 5}));
    }

    #[test]
    fn broken_json_is_wrapped() {
        let body = r#"{"calories": 5"#;
        assert_eq!(interpret_body(Some("application/json"), body), wrap_raw(body));
    }

    #[test]
    fn non_json_content_type_is_always_wrapped() {
        let body = r#"{"calories": 5}"#;
        assert_eq!(interpret_body(Some("text/plain"), body), json!({"rawResponse": body}));
        assert_eq!(interpret_body(None, body), json!({"rawResponse": body}));
    }
}
