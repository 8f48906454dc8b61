//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the normalized output (`NutritionRecord`)
//! - the accepted input (`ImageUpload`, `ImageKind`)
//! - run settings (`AnalysisConfig`, `Language`)

pub mod types;

pub use types::*;
