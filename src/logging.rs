//! Diagnostic logging setup for the binary
//!
//! Logs go to stderr so stdout stays reserved for the rendered artifact.
//! `TREEVIZ_LOG` takes an `EnvFilter` directive string and overrides the
//! verbosity flags when set.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives, e.g. `treeviz=debug`.
pub const LOG_ENV: &str = "TREEVIZ_LOG";

/// Level for a `-v` count and `-q` flag: warn by default, `-v` info, `-vv`
/// debug, `-vvv` trace, `-q` errors only.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the global stderr subscriber. A second call is a no-op.
pub fn init(verbose: u8, quiet: bool, use_color: bool) {
    let filter = build_env_filter(level_for(verbose, quiet));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(use_color)
        .compact()
        .try_init();
}
