//! Command-line interface definition for stackpack.
//!
//! # Command Structure
//!
//! - `stackpack bundle [PATH]` - one-off build of a stack
//! - `stackpack watch [PATH]` - build, then rebuild on change and notify
//!   connected browsers

mod commands;
pub mod enums;
mod tests;
pub(crate) mod validation;

use clap::Parser;

pub use commands::{BuildFlags, BundleArgs, Command, WatchArgs};
pub use enums::*;
pub use validation::parse_global;

/// Stackpack - bundle web application stacks with Rolldown
#[derive(Parser, Debug)]
#[command(
    name = "stackpack",
    version,
    about = "Bundle web application stacks",
    long_about = "Stackpack finds the *.bundle.* entry points of a stack, bundles them with\n\
                  Rolldown and writes the result to build/ (or dist/ for production).\n\
                  In watch mode it rebuilds on change and tells connected browsers to reload."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    ///
    /// Useful for CI or when piping output to other tools.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
