//! `stackpack watch`.
//!
//! 1. Initial build; a failure ends the command
//! 2. Start the reload server and broadcast the initial result
//! 3. Watch the stack; after each quiet batch of changes rebuild and
//!    broadcast the outcome, whether it succeeded or not
//! 4. Stop on Ctrl+C

use std::net::SocketAddr;
use std::time::Duration;

use stackpack_bundler::{BuildOutcome, ConfigureHook, StackBundler};
use tokio::signal;

use crate::cli::WatchArgs;
use crate::commands::utils::prepare;
use crate::error::Result;
use crate::reload::{DEFAULT_ADDR, FileWatcher, ReloadHub, ReloadServer, next_batch};
use crate::ui;

/// Execute the watch command.
pub async fn execute(args: WatchArgs, configure: Option<ConfigureHook>) -> Result<()> {
    let (stack, config, options) = prepare(&args.path, &args.overrides(), configure)?;
    let bundler = StackBundler::new(options.watch(true));

    ui::info(&format!("Watching {}", stack.display()));

    let result = bundler.bundle().await;
    let outcome = BuildOutcome::from_result(&result);
    let report = result?;
    for warning in &report.warnings {
        ui::warning(&warning.text);
    }
    ui::success(&format!(
        "Initial build completed in {}",
        ui::format_duration(report.duration)
    ));

    let hub = ReloadHub::new(config.retention());
    let addr = SocketAddr::from((DEFAULT_ADDR, config.port));
    let server = ReloadServer::bind(addr, hub.clone()).await?;
    hub.broadcast(&outcome);

    let mut server_handle = tokio::spawn(server.serve());

    let (_watcher, mut changes) = FileWatcher::new(stack)?;
    let quiet = Duration::from_millis(config.debounce_ms);

    ui::info("Press Ctrl+C to stop");

    loop {
        tokio::select! {
            batch = next_batch(&mut changes, quiet) => {
                let Some(batch) = batch else {
                    ui::warning("File watcher stopped");
                    break;
                };
                for change in &batch {
                    tracing::debug!("Changed: {}", change.path().display());
                }

                let result = bundler.rebuild().await;
                match &result {
                    Ok(report) => ui::success(&format!(
                        "Rebuilt in {}",
                        ui::format_duration(report.duration)
                    )),
                    Err(_) => ui::error("Rebuild failed"),
                }
                hub.broadcast(&BuildOutcome::from_result(&result));
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down...");
                break;
            }

            joined = &mut server_handle => {
                if let Ok(Err(e)) = joined {
                    return Err(e);
                }
                ui::warning("Reload server stopped unexpectedly");
                break;
            }
        }
    }

    server_handle.abort();
    Ok(())
}
