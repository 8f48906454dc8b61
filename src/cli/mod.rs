//! Command-line parsing for the meal nutrition analyzer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! upload and normalization code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::Language;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "nutrisnap", version, about = "Instant meal nutrition analysis from a photo")]
pub struct Cli {
    /// Increase log detail (-v info, -vv debug). `NUTRISNAP_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a meal photo and print its nutrition figures.
    Analyze(AnalyzeArgs),
    /// Normalize a saved webhook response without uploading anything.
    Normalize(NormalizeArgs),
}

/// Output options shared by both subcommands.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Language for labels, units and messages.
    #[arg(long, value_enum, default_value_t = Language::En)]
    pub lang: Language,

    /// Print the record as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Meal photo (JPEG, PNG or WebP, at most 10MB).
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Image MIME type (e.g. `image/jpeg`). Defaults to the file extension.
    #[arg(long, value_name = "MIME")]
    pub image_type: Option<String>,

    /// Analysis webhook URL. Defaults to `NUTRISNAP_WEBHOOK_URL`.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Per-attempt request timeout (seconds).
    #[arg(long, default_value_t = 60.0)]
    pub timeout: f64,

    /// Extra upload attempts on server errors, timeouts and network errors.
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Seconds between checks for the upload result.
    #[arg(long, default_value_t = 0.5)]
    pub poll_interval: f64,

    /// Number of checks before giving up on the upload result.
    #[arg(long, default_value_t = 60)]
    pub poll_budget: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct NormalizeArgs {
    /// Saved response body, or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Content type the body was served with.
    #[arg(long, default_value = "application/json")]
    pub content_type: String,

    #[command(flatten)]
    pub output: OutputArgs,
}
