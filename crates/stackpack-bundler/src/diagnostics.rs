//! Diagnostic extraction from Rolldown errors.
//!
//! Rolldown reports failures as batched diagnostics whose structure is not
//! part of its stable API. This module flattens them into
//! [`ExtractedDiagnostic`] values that the rest of the crate (and the
//! live-reload payload) can rely on.

use serde::{Deserialize, Serialize};

/// Extracted diagnostic information from Rolldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub help: Option<String>,
}

impl ExtractedDiagnostic {
    /// Build an error-level diagnostic without location information.
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
            line: None,
            column: None,
            help: None,
        }
    }
}

/// Diagnostic kind (mirrors Rolldown's EventKind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingExport,
    ParseError,
    UnresolvedEntry,
    UnresolvedImport,
    InvalidOption,
    Plugin,
    Other(String),
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::MissingExport => write!(f, "MissingExport"),
            DiagnosticKind::ParseError => write!(f, "ParseError"),
            DiagnosticKind::UnresolvedEntry => write!(f, "UnresolvedEntry"),
            DiagnosticKind::UnresolvedImport => write!(f, "UnresolvedImport"),
            DiagnosticKind::InvalidOption => write!(f, "InvalidOption"),
            DiagnosticKind::Plugin => write!(f, "Plugin"),
            DiagnosticKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Extract diagnostics from Rolldown error types.
///
/// Works on the `Debug` rendering so it keeps functioning across Rolldown
/// releases. Batched errors are split into one diagnostic per entry.
pub fn extract_from_rolldown_error(error: &dyn std::fmt::Debug) -> Vec<ExtractedDiagnostic> {
    let error_str = format!("{error:?}");

    if error_str.contains("BatchedBuildDiagnostic") {
        let parts: Vec<&str> = error_str
            .split("BuildDiagnostic")
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "Batched")
            .collect();

        if parts.len() > 1 {
            return parts.into_iter().map(extract_single).collect();
        }
    }

    vec![extract_single(&error_str)]
}

/// Extract a single diagnostic from a formatted error string.
fn extract_single(error_str: &str) -> ExtractedDiagnostic {
    let kind = if error_str.contains("MissingExport") {
        DiagnosticKind::MissingExport
    } else if error_str.contains("Parse error")
        || error_str.contains("Syntax")
        || error_str.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else if error_str.contains("UnresolvedEntry") {
        DiagnosticKind::UnresolvedEntry
    } else if error_str.contains("UnresolvedImport") || error_str.contains("Could not resolve") {
        DiagnosticKind::UnresolvedImport
    } else if error_str.contains("InvalidOption") {
        DiagnosticKind::InvalidOption
    } else if error_str.contains("Plugin") {
        DiagnosticKind::Plugin
    } else {
        DiagnosticKind::Other("BuildError".to_string())
    };

    let severity = if error_str.contains("Warning") {
        DiagnosticSeverity::Warning
    } else {
        DiagnosticSeverity::Error
    };

    let (line, column) = extract_location(error_str);

    ExtractedDiagnostic {
        kind,
        severity,
        message: error_str.to_string(),
        file: extract_file_path(error_str),
        line,
        column,
        help: extract_help_text(error_str),
    }
}

/// Extract a source path from an error message.
fn extract_file_path(text: &str) -> Option<String> {
    const EXTENSIONS: &[&str] = &[
        ".tsx", ".ts", ".jsx", ".mjs", ".cjs", ".js", ".scss", ".less", ".css", ".html",
    ];

    for ext in EXTENSIONS {
        let Some(pos) = text.find(ext) else {
            continue;
        };
        let end = pos + ext.len();
        let before = &text[..end];
        let start = before
            .rfind(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '(')
            .map(|i| i + 1)
            .unwrap_or(0);
        let candidate = before[start..].trim();
        if !candidate.is_empty() {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Extract `line:column` from patterns such as `file.js:12:5`.
fn extract_location(text: &str) -> (Option<u32>, Option<u32>) {
    for (idx, _) in text.match_indices(':') {
        let rest = &text[idx + 1..];
        let line: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if line.is_empty() {
            continue;
        }
        let after_line = &rest[line.len()..];
        let column = after_line.strip_prefix(':').and_then(|tail| {
            let col: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
            col.parse::<u32>().ok()
        });
        return (line.parse::<u32>().ok(), column);
    }
    (None, None)
}

/// Extract help text from error message.
fn extract_help_text(text: &str) -> Option<String> {
    for indicator in &["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let after = &text[pos + indicator.len()..];
            let help_str = after.lines().next().unwrap_or("").trim().to_string();
            if !help_str.is_empty() {
                return Some(help_str);
            }
        }
    }
    None
}
