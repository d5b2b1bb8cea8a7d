//! Shared utilities for command implementations.

use crate::config::{ConfigOverrides, StackpackConfig};
use crate::error::{BuildError, Result, ResultExt};
use stackpack_bundler::{BundleOptions, ConfigureHook};
use std::path::{Path, PathBuf};

/// Resolve the stack path to an absolute directory.
pub fn resolve_stack(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    if !absolute.exists() {
        return Err(BuildError::StackNotFound(absolute).into());
    }
    if !absolute.is_dir() {
        return Err(BuildError::NotADirectory(absolute).into());
    }

    absolute.canonicalize().with_path(&absolute)
}

/// Load the configuration and turn it into bundler options.
pub fn prepare(
    path: &Path,
    overrides: &ConfigOverrides,
    configure: Option<ConfigureHook>,
) -> Result<(PathBuf, StackpackConfig, BundleOptions)> {
    let stack = resolve_stack(path)?;
    let config = StackpackConfig::load(&stack, overrides)?;

    let mut options = config.bundle_options(&stack);
    options.configure = configure;

    Ok((stack, config, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_stack_absolute() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_stack(temp.path()).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_stack_missing() {
        let err = resolve_stack(Path::new("/definitely/not/a/stack")).unwrap_err();
        assert!(matches!(err, CliError::Build(BuildError::StackNotFound(_))));
    }

    #[test]
    fn test_resolve_stack_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("package.json");
        std::fs::write(&file, "{}").unwrap();

        let err = resolve_stack(&file).unwrap_err();
        assert!(matches!(err, CliError::Build(BuildError::NotADirectory(_))));
    }
}
