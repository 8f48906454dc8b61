//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - loads and validates the image
//! - runs the upload / wait / normalize pipeline
//! - prints the result

use std::cell::Cell;
use std::io::Write;
use std::time::Duration;

use clap::Parser;

use crate::analysis::{ProgressEvent, ProgressSink};
use crate::cli::{AnalyzeArgs, Command, NormalizeArgs, OutputArgs};
use crate::domain::{AnalysisConfig, Language, NutritionRecord};
use crate::error::{AppError, EXIT_USAGE};
use crate::transport::WebhookClient;

pub mod pipeline;

/// Entry point for the `nutrisnap` binary.
pub fn run() -> Result<(), AppError> {
    // `nutrisnap meal.jpg` is shorthand for `nutrisnap analyze meal.jpg`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Normalize(args) => handle_normalize(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args)?;
    let upload = crate::io::load_image(&args.image, args.image_type.as_deref(), config.language)?;

    let progress = StderrProgress::new(config.language);
    let result = pipeline::run_analysis(&config, upload, &progress);
    progress.finish();

    print_record(&result?, &args.output)
}

fn handle_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let document = crate::io::read_response_document(&args.file, &args.content_type)?;
    let record = pipeline::run_normalize(&document, args.output.lang)?;
    print_record(&record, &args.output)
}

fn print_record(record: &NutritionRecord, output: &OutputArgs) -> Result<(), AppError> {
    if output.json {
        println!("{}", crate::report::format_record_json(record)?);
    } else {
        print!("{}", crate::report::format_record(record, output.lang));
    }
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalyzeArgs) -> Result<AnalysisConfig, AppError> {
    let endpoint = match &args.endpoint {
        Some(url) if !url.trim().is_empty() => url.clone(),
        _ => WebhookClient::endpoint_from_env()?,
    };
    if args.poll_budget == 0 {
        return Err(AppError::new(EXIT_USAGE, "Poll budget must be > 0."));
    }

    Ok(AnalysisConfig {
        request_timeout: positive_secs(args.timeout, "timeout")?,
        max_retries: args.retries,
        poll_interval: positive_secs(args.poll_interval, "poll interval")?,
        poll_budget: args.poll_budget,
        language: args.output.lang,
        ..AnalysisConfig::new(endpoint)
    })
}

fn positive_secs(value: f64, what: &str) -> Result<Duration, AppError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(AppError::new(EXIT_USAGE, format!("Invalid {what}: {value} (must be > 0 seconds).")));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Invalid {what}: {e}")))
}

/// Single-line wait indicator on stderr.
struct StderrProgress {
    lang: Language,
    active: Cell<bool>,
}

impl StderrProgress {
    fn new(lang: Language) -> Self {
        Self {
            lang,
            active: Cell::new(false),
        }
    }

    fn finish(&self) {
        if self.active.replace(false) {
            eprintln!();
        }
    }
}

impl ProgressSink for StderrProgress {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Waiting { elapsed_secs, .. } => {
                eprint!("\r{}", crate::report::format_wait_progress(elapsed_secs, self.lang));
                let _ = std::io::stderr().flush();
                self.active.set(true);
            }
            ProgressEvent::OutcomeReady => self.finish(),
        }
    }
}

/// Rewrite argv so a bare image path means `analyze <path>`.
///
/// Rules:
/// - `nutrisnap`                     -> unchanged (clap prints usage)
/// - `nutrisnap meal.jpg ...`        -> `nutrisnap analyze meal.jpg ...`
/// - `nutrisnap <subcommand> ...`    -> unchanged
/// - `nutrisnap -v ...` / `--help`   -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1) else {
        return argv;
    };

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "normalize" | "help");
    if is_subcommand || arg1.starts_with('-') {
        return argv;
    }

    argv.insert(1, "analyze".to_string());
    argv
}
