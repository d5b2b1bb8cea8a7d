//! Command implementations.
//!
//! - [`bundle`] - one-off build
//! - [`watch`] - build, rebuild on change, broadcast to reload clients
//!
//! Each command provides an `execute` function taking the parsed arguments
//! and an optional engine `configure` hook.

pub mod bundle;
pub(crate) mod utils;
pub mod watch;

pub use bundle::execute as bundle_execute;
pub use watch::execute as watch_execute;
