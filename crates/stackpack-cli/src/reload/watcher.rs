//! File system watcher for `watch`.
//!
//! Watches the whole stack and drops events for dependencies, build output
//! and hidden files, so writing a bundle never triggers another rebuild.

use crate::error::{CliError, Result, ResultExt};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Directory names ignored anywhere below the stack.
pub const IGNORED_DIRS: &[&str] = &["node_modules", "__pypackages__"];

/// Output and cache directories, ignored at the stack root.
const OUTPUT_DIRS: &[&str] = &["build", "dist", ".skypack"];

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// Recursive watcher that forwards relevant changes through a channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root`.
    ///
    /// # Errors
    ///
    /// Returns error if the directory doesn't exist or cannot be watched.
    pub fn new(root: PathBuf) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.exists() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(100);
        let filter_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Watch error: {}", e);
                    return;
                }
            };

            for path in &event.paths {
                if Self::should_ignore(path, &filter_root) {
                    continue;
                }

                let change = match event.kind {
                    EventKind::Create(_) => FileChange::Created(path.clone()),
                    EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                // A full channel already has a rebuild pending.
                let _ = tx.try_send(change);
            }
        })
        .context("Failed to start the file watcher")?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .context(format!("Failed to watch {}", root.display()))
            .with_hint("Large stacks may need a higher fs.inotify.max_user_watches limit")?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    fn should_ignore(path: &Path, root: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return true;
        };

        for (depth, component) in relative.components().enumerate() {
            let Component::Normal(name) = component else {
                continue;
            };
            let Some(name) = name.to_str() else {
                continue;
            };

            if IGNORED_DIRS.contains(&name)
                || (depth == 0 && OUTPUT_DIRS.contains(&name))
                || name.starts_with('.')
            {
                return true;
            }
        }

        false
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Wait for the next change, then collect further changes until `quiet`
/// passes without any. Returns `None` once the watcher is gone.
pub async fn next_batch(
    rx: &mut mpsc::Receiver<FileChange>,
    quiet: Duration,
) -> Option<Vec<FileChange>> {
    let mut batch = vec![rx.recv().await?];

    loop {
        match tokio::time::timeout(quiet, rx.recv()).await {
            Ok(Some(change)) => {
                if !batch.contains(&change) {
                    batch.push(change);
                }
            }
            Ok(None) | Err(_) => return Some(batch),
        }
    }
}
