//! Reporting: localized messages and formatted terminal output.
//!
//! Formatting lives here so the pipeline code never builds user-facing text.

pub mod format;
pub mod messages;

pub use format::{format_record, format_record_json, format_wait_progress};
pub use messages::{Message, failure_message};
