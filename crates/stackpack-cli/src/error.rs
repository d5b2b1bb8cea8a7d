//! Error handling for the stackpack CLI.
//!
//! - `CliError` is returned by every command and converts from the
//!   domain errors below via `#[from]`
//! - `ConfigError` and `BuildError` carry a hint telling the user what to do
//! - bundler failures keep their structured diagnostics until they are
//!   rendered by [`cli_error_to_miette`]
//!
//! # Example
//!
//! ```rust,no_run
//! use stackpack_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_manifest(stack: &Path) -> Result<String> {
//!     let path = stack.join("package.json");
//!     std::fs::read_to_string(&path)
//!         .with_path(&path)
//!         .with_hint("Every stack needs a package.json")
//! }
//! ```

mod miette;

pub use self::miette::{bundler_error_to_miette, cli_error_to_miette};

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (invalid stackpack.toml, bad values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Problems with the stack itself, found before the bundler runs
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Errors from the bundler, with structured diagnostics
    #[error(transparent)]
    Bundler(#[from] stackpack_bundler::Error),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Live-reload server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Errors wrapped by [`ResultExt::context`] or [`ResultExt::with_hint`]
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Errors detected before a build starts.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The stack directory does not exist
    #[error("Stack not found: {}\n\nHint: Pass the directory that holds the stack's package.json", .0.display())]
    StackNotFound(PathBuf),

    /// The stack path points at a file
    #[error("Stack path is not a directory: {}\n\nHint: Pass the directory, not a file inside it", .0.display())]
    NotADirectory(PathBuf),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
