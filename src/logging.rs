use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive for a verbosity count.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a compact fmt subscriber for programs embedding this library.
///
/// RUST_LOG takes precedence over `verbose`. Calling this when a global
/// subscriber already exists returns an error instead of panicking.
pub fn init(verbose: u8) -> Result<()> {
    // Base filter:
    // - if RUST_LOG is set, use it
    // - else default to the level picked by `verbose`
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));

    // Human-readable console output, no module targets
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
