//! `nutrisnap` library crate.
//!
//! The binary (`nutrisnap`) is a thin wrapper around this library so that:
//!
//! - the upload / wait / normalize pipeline is testable without spawning processes
//! - the normalizer can be reused on responses captured elsewhere
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod pacing;
pub mod report;
pub mod transport;
