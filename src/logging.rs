//! Logging setup.
//!
//! Log lines go to stderr so stdout stays clean for results (and `--json`).
//! `NUTRISNAP_LOG` takes an `EnvFilter` directive, then `RUST_LOG`; without
//! either the level comes from the `-v` count. Failures the user already
//! sees as a localized message are logged below the default level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "NUTRISNAP_LOG";

/// Default filter directive for a given `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "nutrisnap=info",
        _ => "nutrisnap=debug",
    }
}

/// Pick the active directive: `NUTRISNAP_LOG`, then `RUST_LOG`, then the
/// `-v` default. Blank values count as unset.
fn select_directive(app: Option<String>, rust: Option<String>, verbosity: u8) -> String {
    [app, rust]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_directive(verbosity).to_string())
}

fn env_filter(verbosity: u8) -> EnvFilter {
    let directive = select_directive(
        std::env::var(LOG_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        verbosity,
    );
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbosity: u8) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
