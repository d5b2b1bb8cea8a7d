//! Entry point discovery.
//!
//! A stack exposes two kinds of entries:
//!
//! - `<stack>/<app>/public/*.bundle.{js,jsx,ts,tsx,less,scss,css}` - page level
//!   bundles, stylesheets included
//! - `<stack>/**/*.bundle.{js,jsx,ts,tsx}` - script bundles anywhere in the tree
//!
//! Anything below `node_modules` or `__pypackages__` is never an entry, and
//! neither is anything in the stack's own `build/`, `dist/` or `.skypack/`.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use path_clean::PathClean;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Directories that are never descended into while looking for entries.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "__pypackages__"];

/// Directories at the stack root holding generated files.
pub const GENERATED_DIRS: &[&str] = &["build", "dist", ".skypack"];

/// Build the glob patterns that find every buildable file under `root`.
///
/// Patterns prefixed with `!` are exclusions. The root is made absolute and
/// uses `/` separators on every platform.
pub fn build_include_patterns(root: impl AsRef<Path>) -> Vec<String> {
    let abs = absolute(root.as_ref());
    let abs = abs.to_string_lossy().replace('\\', "/");
    let abs = abs.trim_end_matches('/');

    vec![
        format!("{abs}/*/public/*.bundle.{{js,jsx,ts,tsx,less,scss,css}}"),
        format!("{abs}/**/*.bundle.{{js,jsx,ts,tsx}}"),
        format!("!{abs}/**/node_modules/**"),
        format!("!{abs}/**/__pypackages__/**"),
    ]
}

/// Compiled include/exclude globs.
#[derive(Debug, Clone)]
pub struct EntryMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl EntryMatcher {
    /// Compile a pattern list as produced by [`build_include_patterns`].
    ///
    /// `*` never crosses a path separator; `**` does.
    pub fn from_patterns(patterns: &[String]) -> Result<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for pattern in patterns {
            match pattern.strip_prefix('!') {
                Some(negated) => exclude.add(compile(negated)?),
                None => include.add(compile(pattern)?),
            };
        }

        Ok(Self {
            include: build_set(include)?,
            exclude: build_set(exclude)?,
        })
    }

    /// Whether `path` is selected by an include pattern and no exclusion.
    pub fn is_match(&self, path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/");
        self.include.is_match(&normalized) && !self.exclude.is_match(&normalized)
    }
}

/// Find all entry points of a stack, sorted and deduplicated.
pub fn discover_entries(stack: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let stack = absolute(stack.as_ref());
    if !stack.is_dir() {
        return Err(Error::StackNotFound(stack));
    }

    let matcher = EntryMatcher::from_patterns(&build_include_patterns(&stack))?;

    let mut entries: Vec<PathBuf> = WalkDir::new(&stack)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let Some(name) = entry.file_name().to_str() else {
                return true;
            };
            !(EXCLUDED_DIRS.contains(&name)
                || (entry.depth() == 1 && GENERATED_DIRS.contains(&name)))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable path during discovery: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| matcher.is_match(path))
        .collect();

    entries.sort();
    entries.dedup();

    tracing::debug!("Discovered {} entries in {}", entries.len(), stack.display());
    Ok(entries)
}

fn compile(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| Error::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn build_set(builder: GlobSetBuilder) -> Result<GlobSet> {
    builder.build().map_err(|e| Error::Pattern {
        pattern: "<set>".to_string(),
        message: e.to_string(),
    })
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf().clean()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
            .clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_include_patterns_shape() {
        let patterns = build_include_patterns("/srv/stack");
        assert_eq!(
            patterns,
            vec![
                "/srv/stack/*/public/*.bundle.{js,jsx,ts,tsx,less,scss,css}",
                "/srv/stack/**/*.bundle.{js,jsx,ts,tsx}",
                "!/srv/stack/**/node_modules/**",
                "!/srv/stack/**/__pypackages__/**",
            ]
        );
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let patterns = build_include_patterns("/srv/stack/");
        assert!(patterns[0].starts_with("/srv/stack/*/public/"));
    }

    #[test]
    fn test_matcher_public_styles_only_at_app_level() {
        let matcher =
            EntryMatcher::from_patterns(&build_include_patterns("/srv/stack")).unwrap();

        assert!(matcher.is_match(Path::new("/srv/stack/shop/public/site.bundle.scss")));
        assert!(matcher.is_match(Path::new("/srv/stack/shop/public/site.bundle.css")));
        // stylesheets deeper than <app>/public are not entries
        assert!(!matcher.is_match(Path::new(
            "/srv/stack/shop/public/nested/site.bundle.scss"
        )));
        assert!(!matcher.is_match(Path::new("/srv/stack/shop/src/site.bundle.less")));
    }

    #[test]
    fn test_matcher_scripts_anywhere() {
        let matcher =
            EntryMatcher::from_patterns(&build_include_patterns("/srv/stack")).unwrap();

        assert!(matcher.is_match(Path::new("/srv/stack/a/b/c/app.bundle.tsx")));
        assert!(matcher.is_match(Path::new("/srv/stack/app.bundle.js")));
        assert!(!matcher.is_match(Path::new("/srv/stack/a/app.js")));
        assert!(!matcher.is_match(Path::new("/srv/stack/a/app.bundle.vue")));
    }

    #[test]
    fn test_matcher_exclusions() {
        let matcher =
            EntryMatcher::from_patterns(&build_include_patterns("/srv/stack")).unwrap();

        assert!(!matcher.is_match(Path::new(
            "/srv/stack/node_modules/pkg/index.bundle.js"
        )));
        assert!(!matcher.is_match(Path::new(
            "/srv/stack/api/__pypackages__/lib/x.bundle.js"
        )));
    }

    #[test]
    fn test_discover_entries() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "shop/public/site.bundle.js");
        touch(root, "shop/public/site.bundle.scss");
        touch(root, "shop/components/cart.bundle.tsx");
        touch(root, "shop/components/cart.js");
        touch(root, "node_modules/dep/dep.bundle.js");

        let entries = discover_entries(root).unwrap();
        let rel: Vec<String> = entries
            .iter()
            .map(|p| {
                p.strip_prefix(root.canonicalize().unwrap_or(root.to_path_buf()))
                    .or_else(|_| p.strip_prefix(root))
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(
            rel,
            vec![
                "shop/components/cart.bundle.tsx",
                "shop/public/site.bundle.js",
                "shop/public/site.bundle.scss",
            ]
        );
    }

    #[test]
    fn test_discover_skips_previous_output() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "app.bundle.js");
        touch(root, "build/app.bundle.3f9a.js");
        touch(root, "dist/app.bundle.3f9a.js");
        touch(root, "shop/dist/page.bundle.js");

        let entries = discover_entries(root).unwrap();
        assert_eq!(
            entries,
            vec![root.join("app.bundle.js"), root.join("shop/dist/page.bundle.js")]
        );
    }

    #[test]
    fn test_discover_entries_empty_stack() {
        let temp = TempDir::new().unwrap();
        assert!(discover_entries(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_entries_missing_stack() {
        let temp = TempDir::new().unwrap();
        let result = discover_entries(temp.path().join("missing"));
        assert!(matches!(result, Err(Error::StackNotFound(_))));
    }
}
