//! Logging setup for the stackpack CLI.
//!
//! Log events from both crates go through `tracing`. Build progress such as
//! `- Building: cjs /srv/shop/build` and the live-reload messages are plain
//! INFO events, so `--quiet` silences them and `RUST_LOG` can retarget them.
//!
//! # Example
//!
//! ```rust,no_run
//! use stackpack_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Starting build");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "stackpack=debug,stackpack_bundler=debug,stackpack_cli=debug";
const QUIET_FILTER: &str = "stackpack=error,stackpack_bundler=error,stackpack_cli=error";
const DEFAULT_FILTER: &str = "stackpack=info,stackpack_bundler=info,stackpack_cli=info";

/// Initialize the tracing subscriber.
///
/// Call once at startup, before anything logs.
///
/// The logging level is determined in this order:
/// 1. `--verbose`: DEBUG for the stackpack crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`
/// 4. INFO for the stackpack crates
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize the logger with a custom filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // A subscriber may already be installed when stackpack is embedded.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
