//! Stackpack CLI - bundle stacks and live-reload them during development.
//!
//! The binary is a thin wrapper around [`run`]; tools that embed stackpack
//! call it directly and may pass a `configure` hook that rewrites the engine
//! configuration before every build.
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `bundle` and `watch`
//! - [`config`] - layered configuration (`stackpack.toml`, `STACKPACK_*`, flags)
//! - [`reload`] - live-reload hub, SSE server and file watcher
//! - [`error`] - error types with actionable hints
//! - [`logger`] - tracing setup
//! - [`ui`] - terminal status lines and summaries
//!
//! # Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use stackpack_cli::{cli::Cli, run};
//!
//! # async fn example() -> stackpack_cli::Result<()> {
//! let cli = Cli::parse_from(["stackpack", "bundle", "./shop", "--production"]);
//! run(cli, None).await
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod reload;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};

use stackpack_bundler::ConfigureHook;

/// Execute a parsed command line.
pub async fn run(cli: cli::Cli, configure: Option<ConfigureHook>) -> Result<()> {
    match cli.command {
        cli::Command::Bundle(args) => commands::bundle_execute(args, configure).await,
        cli::Command::Watch(args) => commands::watch_execute(args, configure).await,
    }
}
