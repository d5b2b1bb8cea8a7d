//! `stackpack bundle`.

use crate::cli::BundleArgs;
use crate::commands::utils::prepare;
use crate::error::Result;
use crate::ui;
use stackpack_bundler::{ConfigureHook, StackBundler};

/// Build the stack once.
///
/// Warnings are printed, the written files summarized, and with
/// `--analyze` a size breakdown goes to stdout.
pub async fn execute(args: BundleArgs, configure: Option<ConfigureHook>) -> Result<()> {
    let (stack, _config, options) = prepare(&args.path, &args.overrides(), configure)?;
    tracing::debug!("Bundling {}", stack.display());

    let report = StackBundler::new(options).bundle().await?;

    for warning in &report.warnings {
        ui::warning(&warning.text);
    }

    if !report.entries.is_empty() {
        ui::print_build_summary(&report);
    }

    if let Some(analysis) = &report.analysis {
        print!("{}", analysis.render(ui::colors_enabled()));
    }

    ui::success(&format!(
        "Bundled {} entries in {}",
        report.entries.len(),
        ui::format_duration(report.duration)
    ));

    Ok(())
}
