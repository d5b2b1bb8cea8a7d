//! Writing build output to the stack's output directory.
//!
//! Every file is first written next to its target with a `.tmp` suffix and
//! renamed into place once all of them are on disk, so the server never
//! picks up a half-written bundle. File names coming out of the engine are
//! validated to stay inside the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rolldown::BundleOutput;
use rolldown_common::Output;

use crate::{Error, Result};

/// Remove everything inside `dir`, creating it if it does not exist.
pub fn empty_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir)
            .map_err(|e| Error::io(format!("Failed to create {}", dir.display()), e));
    }

    let entries =
        fs::read_dir(dir).map_err(|e| Error::io(format!("Failed to read {}", dir.display()), e))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let result = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| Error::io(format!("Failed to remove {}", path.display()), e))?;
    }

    Ok(())
}

/// Write every chunk and asset of `output` below `dir`.
///
/// Returns the written paths in output order.
pub fn write_bundle(output: &BundleOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = dir.clean();
    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut operations = Vec::with_capacity(output.assets.len());
    for item in &output.assets {
        let (filename, content) = match item {
            Output::Chunk(chunk) => (chunk.filename.as_str(), chunk.code.as_bytes()),
            Output::Asset(asset) => (asset.filename.as_str(), asset.source.as_bytes()),
        };
        operations.push((validate_output_path(&dir, filename)?, content));
    }

    write_files_atomic(&operations)?;

    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

/// Resolve `filename` below `base_dir`, rejecting anything that escapes it.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}'",
            filename,
            base_dir.display(),
        )));
    }

    Ok(full_path)
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut written = Vec::with_capacity(operations.len());

    for (target, content) in operations {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&written);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = temp_path(target);
        fs::write(&temp, content).map_err(|e| {
            cleanup_temp_files(&written);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp.display(),
                e
            ))
        })?;
        written.push((temp, target.clone()));
    }

    for (temp, target) in &written {
        fs::rename(temp, target).map_err(|e| {
            cleanup_temp_files(&written);
            Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp.display(),
                target.display(),
                e
            ))
        })?;
    }

    Ok(())
}

fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp, _) in temp_files {
        if temp.exists()
            && let Err(e) = fs::remove_file(temp)
        {
            tracing::warn!("Failed to clean up temporary file '{}': {}", temp.display(), e);
        }
    }
}
