//! Third-party distribution plan.
//!
//! Turns the manifest's `bcore.distribute` table into three things:
//! files to copy next to the bundles, specifiers to leave external and
//! browser globals that stand in for packages at runtime.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::manifest::StackManifest;

/// Directory below the output dir receiving distributed files.
pub const THIRDPARTY_DIR: &str = "thirdparty";

/// One file or directory copied out of `node_modules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of running every copy job.
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Jobs that completed, with the number of files written.
    pub copied: Vec<(CopyJob, usize)>,
    /// Jobs that failed; the build carries on without them.
    pub failed: Vec<(CopyJob, String)>,
}

/// Everything the distribute table asks for.
#[derive(Debug, Clone, Default)]
pub struct DistributionPlan {
    pub copies: Vec<CopyJob>,
    /// Specifiers handed to the engine as plain externals.
    pub externals: Vec<String>,
    /// Package -> browser global, served by the external-globals plugin.
    pub globals: BTreeMap<String, String>,
}

impl DistributionPlan {
    /// Build the plan for a stack.
    ///
    /// `base_globals` is applied first; distribute entries with a `global`
    /// override it. A package that ends up with a global is resolved through
    /// that global and therefore never listed as a plain external.
    pub fn from_manifest(
        manifest: &StackManifest,
        stack: &Path,
        out_dir: &Path,
        base_globals: &BTreeMap<String, String>,
    ) -> Self {
        let mut plan = DistributionPlan {
            globals: base_globals.clone(),
            ..Default::default()
        };

        for (key, entry) in &manifest.distribute {
            if let Some(files) = &entry.files {
                plan.copies.push(CopyJob {
                    from: stack.join("node_modules").join(files),
                    to: out_dir.join(THIRDPARTY_DIR).join(files),
                });
            }

            if let Some(global) = &entry.global {
                plan.globals.insert(key.clone(), global.clone());
            }

            let external = entry.external.clone().unwrap_or_else(|| key.clone());
            if !plan.globals.contains_key(&external) && !plan.externals.contains(&external) {
                plan.externals.push(external);
            }
        }

        plan
    }

    /// Run every copy job. Failures are logged and reported, never raised.
    pub fn copy_all(&self) -> CopyReport {
        let mut report = CopyReport::default();

        for job in &self.copies {
            tracing::info!("- [COPY]: {} => {}", job.from.display(), job.to.display());
            match copy_path(&job.from, &job.to) {
                Ok(count) => report.copied.push((job.clone(), count)),
                Err(e) => {
                    tracing::warn!("Failed to copy {}: {}", job.from.display(), e);
                    report.failed.push((job.clone(), e.to_string()));
                }
            }
        }

        report
    }
}

/// Copy a file, or a directory tree, returning the number of files written.
fn copy_path(from: &Path, to: &Path) -> std::io::Result<usize> {
    let meta = fs::metadata(from)?;

    if meta.is_file() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        return Ok(1);
    }

    let mut count = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.map_err(std::io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(std::io::Error::other)?;
        let target = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DistributeEntry;
    use tempfile::TempDir;

    fn manifest(entries: &[(&str, DistributeEntry)]) -> StackManifest {
        StackManifest {
            distribute: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_externals_and_globals() {
        let m = manifest(&[
            (
                "jquery",
                DistributeEntry {
                    files: Some("jquery/dist".into()),
                    global: Some("jQuery".into()),
                    external: None,
                },
            ),
            (
                "moment",
                DistributeEntry {
                    external: Some("moment/moment.js".into()),
                    ..Default::default()
                },
            ),
            ("lodash", DistributeEntry::default()),
        ]);

        let plan = DistributionPlan::from_manifest(
            &m,
            Path::new("/stack"),
            Path::new("/stack/build"),
            &BTreeMap::new(),
        );

        assert_eq!(
            plan.copies,
            vec![CopyJob {
                from: PathBuf::from("/stack/node_modules/jquery/dist"),
                to: PathBuf::from("/stack/build/thirdparty/jquery/dist"),
            }]
        );
        assert_eq!(plan.globals.get("jquery").map(String::as_str), Some("jQuery"));
        assert_eq!(plan.externals, vec!["lodash", "moment/moment.js"]);
    }

    #[test]
    fn test_distribute_global_overrides_base_map() {
        let m = manifest(&[(
            "react",
            DistributeEntry {
                global: Some("React".into()),
                ..Default::default()
            },
        )]);
        let mut base = BTreeMap::new();
        base.insert("react".to_string(), "window.React".to_string());
        base.insert("vue".to_string(), "Vue".to_string());

        let plan =
            DistributionPlan::from_manifest(&m, Path::new("/s"), Path::new("/s/dist"), &base);

        assert_eq!(plan.globals["react"], "React");
        assert_eq!(plan.globals["vue"], "Vue");
        assert!(plan.externals.is_empty());
    }

    #[test]
    fn test_copy_all_settles_failures() {
        let temp = TempDir::new().unwrap();
        let stack = temp.path();
        let out = stack.join("build");

        let dist = stack.join("node_modules/jquery/dist");
        fs::create_dir_all(dist.join("sub")).unwrap();
        fs::write(dist.join("jquery.js"), "/* jquery */").unwrap();
        fs::write(dist.join("sub/extra.js"), "/* extra */").unwrap();
        fs::create_dir_all(stack.join("node_modules/single")).unwrap();
        fs::write(stack.join("node_modules/single/one.css"), "a{}").unwrap();

        let m = manifest(&[
            (
                "jquery",
                DistributeEntry {
                    files: Some("jquery/dist".into()),
                    ..Default::default()
                },
            ),
            (
                "missing",
                DistributeEntry {
                    files: Some("missing/dist".into()),
                    ..Default::default()
                },
            ),
            (
                "single",
                DistributeEntry {
                    files: Some("single/one.css".into()),
                    ..Default::default()
                },
            ),
        ]);

        let plan = DistributionPlan::from_manifest(&m, stack, &out, &BTreeMap::new());
        let report = plan.copy_all();

        assert_eq!(report.copied.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(out.join("thirdparty/jquery/dist/jquery.js").is_file());
        assert!(out.join("thirdparty/jquery/dist/sub/extra.js").is_file());
        assert!(out.join("thirdparty/single/one.css").is_file());
        assert_eq!(report.copied[0].1, 2);
    }
}
