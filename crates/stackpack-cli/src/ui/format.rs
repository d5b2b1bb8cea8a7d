//! Durations and the per-build summary table.

use console::Term;
use owo_colors::OwoColorize;
use stackpack_bundler::BuildReport;
use stackpack_bundler::analysis::format_bytes;
use std::time::Duration;

use super::colors_enabled;

/// Format a duration: `50ms`, `1.50s`, `1m 30s`.
///
/// ```
/// use std::time::Duration;
/// use stackpack_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the files a build wrote, relative to its output directory.
pub fn print_build_summary(report: &BuildReport) {
    let width = (Term::stderr().size().1 as usize).min(80);
    let color = colors_enabled();

    let files: Vec<(String, u64)> = report
        .written
        .iter()
        .map(|path| {
            let name = path
                .strip_prefix(&report.out_dir)
                .unwrap_or(path)
                .display()
                .to_string();
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            (name, size)
        })
        .collect();

    if color {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", "─".repeat(width));

    for (name, size) in &files {
        let size = format_bytes(*size as usize);
        if color {
            eprintln!("  {} {} {}", "▸".blue(), name.bright_white().bold(), size.dimmed());
        } else {
            eprintln!("  ▸ {} {}", name, size);
        }
    }

    let copied: usize = report.copies.copied.iter().map(|(_, files)| files).sum();
    if copied > 0 {
        eprintln!("  {} third-party file(s) copied to thirdparty/", copied);
    }

    eprintln!("{}", "─".repeat(width));

    let total: u64 = files.iter().map(|(_, size)| size).sum();
    let total = format_bytes(total as usize);
    let duration = format_duration(report.duration);
    if color {
        eprintln!("  {} {} in {}", "Total:".bold(), total.green(), duration.green());
    } else {
        eprintln!("  Total: {} in {}", total, duration);
    }
}
