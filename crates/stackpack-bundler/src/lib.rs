//! # stackpack-bundler
//!
//! Bundles web-application *stacks* with Rolldown.
//!
//! A stack is a directory tree holding a `package.json` and any number of
//! `*.bundle.*` entry points. This crate discovers those entries, copies the
//! third-party files the manifest asks to distribute, assembles the Rolldown
//! configuration (externals, globals, `NODE_ENV`, resolution paths) together
//! with the stack plugins, and writes the result to `build/` or `dist/`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stackpack_bundler::{BundleOptions, OutputFormat, StackBundler};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = BundleOptions::new("./my-stack")
//!     .format(OutputFormat::Esm)
//!     .production(true);
//!
//! let report = StackBundler::new(options).bundle().await?;
//! println!("{} files written to {}", report.outputs.len(), report.out_dir.display());
//! # Ok(()) }
//! ```
//!
//! ## Customising the engine
//!
//! A `configure` hook receives the fully assembled [`EngineConfig`] right
//! before the build starts and may return a modified copy:
//!
//! ```no_run
//! use stackpack_bundler::{BundleOptions, EngineConfig};
//!
//! let options = BundleOptions::new("./my-stack").configure(|mut config: EngineConfig| {
//!     config.options.sourcemap = None;
//!     config
//! });
//! ```

pub mod analysis;
pub mod builder;
pub mod diagnostics;
pub mod discovery;
pub mod distribute;
pub mod engine;
pub mod manifest;
pub mod options;
pub mod output;
pub mod plugins;

// Re-export core Rolldown types for library users
pub use rolldown::{BundleOutput, BundlerOptions, IsExternal, ResolveOptions, SourceMapType};

// Re-export common types used by plugins
pub use rolldown_common::{ModuleType, Output, OutputAsset, OutputChunk};

// Re-export plugin types
pub use rolldown_plugin::{__inner::SharedPluginable, Plugin, PluginContext};

pub use analysis::{BundleAnalysis, analyze};
pub use builder::{BuildMessage, BuildOutcome, BuildReport, StackBundler};
pub use discovery::{EntryMatcher, build_include_patterns, discover_entries};
pub use distribute::{CopyJob, CopyReport, DistributionPlan};
pub use engine::EngineConfig;
pub use manifest::{DistributeEntry, StackManifest};
pub use options::{BundleOptions, ConfigureHook, OutputFormat};
pub use plugins::{PluginPhase, PluginRegistry, StackPlugin};

/// Error types for stackpack-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from Rolldown bundler.
    #[error("Rolldown bundler error: {}", format_bundler_error(.0))]
    Bundler(Vec<diagnostics::ExtractedDiagnostic>),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The stack directory does not exist or is not a directory.
    #[error("Stack not found: {}", .0.display())]
    StackNotFound(std::path::PathBuf),

    /// `package.json` is missing or malformed.
    #[error("Invalid manifest {}: {message}", .path.display())]
    Manifest {
        path: std::path::PathBuf,
        message: String,
    },

    /// An entry glob failed to compile.
    #[error("Invalid entry pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// I/O error with context message.
    #[error("{message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for stackpack-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a Rolldown error.
    ///
    /// Extracts structured diagnostics from Rolldown's error types.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(diagnostics::extract_from_rolldown_error(error))
    }

    pub(crate) fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::IoError {
            message: message.into(),
            source,
        }
    }
}

/// Format bundler error diagnostics for display.
fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    if diagnostics.is_empty() {
        return "Unknown bundler error".to_string();
    }

    if diagnostics.len() == 1 {
        let diag = &diagnostics[0];
        format!("{}: {}", diag.kind, diag.message)
    } else {
        format!(
            "{} errors: {}",
            diagnostics.len(),
            diagnostics
                .iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        )
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::StackNotFound(_) => "STACK_NOT_FOUND",
            Error::Manifest { .. } => "INVALID_MANIFEST",
            Error::Pattern { .. } => "INVALID_PATTERN",
            Error::Io(_) => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::IoError { .. } => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::InvalidConfig(msg) => Some(Box::new(format!(
                "Check your stackpack.toml and command-line flags.\nError: {}",
                msg
            ))),
            Error::StackNotFound(path) => Some(Box::new(format!(
                "'{}' must be an existing directory containing a package.json.",
                path.display()
            ))),
            Error::Manifest { .. } => Some(Box::new(
                "Every stack needs a valid package.json at its root.".to_string(),
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays inside the stack's output directory.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::Bundler(diagnostics) => {
                if diagnostics.len() == 1 {
                    diagnostics[0]
                        .help
                        .as_ref()
                        .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>)
                } else {
                    Some(Box::new(
                        "Multiple bundler errors occurred. See details below.".to_string(),
                    ))
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_bundler_error_display_single() {
        let err = Error::Bundler(vec![diagnostics::ExtractedDiagnostic::error(
            diagnostics::DiagnosticKind::UnresolvedImport,
            "Could not resolve 'lodash'",
        )]);
        assert_eq!(
            err.to_string(),
            "Rolldown bundler error: UnresolvedImport: Could not resolve 'lodash'"
        );
    }

    #[test]
    fn test_bundler_error_display_empty() {
        let err = Error::Bundler(Vec::new());
        assert!(err.to_string().contains("Unknown bundler error"));
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = Error::StackNotFound("/nope".into());
        assert_eq!(err.code().unwrap().to_string(), "STACK_NOT_FOUND");
        assert!(err.help().is_some());
    }
}
