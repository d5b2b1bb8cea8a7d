//! Miette diagnostic conversion for CLI errors.

use crate::error::{BuildError, CliError};
use miette::Report;
use stackpack_bundler::diagnostics::ExtractedDiagnostic;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => bundler_error_to_miette(e),
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    miette::miette!("{}", err)
}

/// Convert a stackpack-bundler Error to a miette Report.
///
/// Engine failures list every diagnostic with its location; everything else
/// goes through the bundler error's own `Diagnostic` implementation.
pub fn bundler_error_to_miette(err: stackpack_bundler::Error) -> Report {
    match err {
        stackpack_bundler::Error::Bundler(diagnostics) if !diagnostics.is_empty() => {
            let lines: Vec<String> = diagnostics.iter().map(describe).collect();
            let help = diagnostics.iter().find_map(|d| d.help.clone());
            match help {
                Some(help) => miette::miette!(
                    code = "BUNDLER_ERROR",
                    help = help,
                    "Build failed:\n{}",
                    lines.join("\n")
                ),
                None => miette::miette!(code = "BUNDLER_ERROR", "Build failed:\n{}", lines.join("\n")),
            }
        }
        _ => Report::new(err),
    }
}

fn describe(diag: &ExtractedDiagnostic) -> String {
    match (&diag.file, diag.line, diag.column) {
        (Some(file), Some(line), Some(column)) => {
            format!("  {}:{}:{}: {}", file, line, column, diag.message)
        }
        (Some(file), Some(line), None) => format!("  {}:{}: {}", file, line, diag.message),
        (Some(file), None, _) => format!("  {}: {}", file, diag.message),
        _ => format!("  {}", diag.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackpack_bundler::diagnostics::DiagnosticKind;

    #[test]
    fn test_bundler_diagnostics_listed() {
        let mut first =
            ExtractedDiagnostic::error(DiagnosticKind::UnresolvedImport, "Could not resolve 'x'");
        first.file = Some("pages/home.bundle.js".to_string());
        first.line = Some(2);
        first.column = Some(8);
        let second = ExtractedDiagnostic::error(DiagnosticKind::ParseError, "Unexpected token");

        let report = bundler_error_to_miette(stackpack_bundler::Error::Bundler(vec![first, second]));
        let text = report.to_string();

        assert!(text.contains("pages/home.bundle.js:2:8: Could not resolve 'x'"));
        assert!(text.contains("  Unexpected token"));
    }

    #[test]
    fn test_other_bundler_errors_keep_code() {
        let report = cli_error_to_miette(CliError::Bundler(
            stackpack_bundler::Error::StackNotFound("/nope".into()),
        ));
        assert_eq!(report.code().unwrap().to_string(), "STACK_NOT_FOUND");
    }
}
