//! Stack `package.json` handling.
//!
//! Besides the usual `name` and `dependencies`, a stack manifest may carry a
//! `bcore.distribute` table describing how third-party packages reach the
//! browser:
//!
//! ```json
//! {
//!   "bcore": {
//!     "distribute": {
//!       "jquery": { "files": "jquery/dist", "global": "jQuery" },
//!       "moment": { "external": "moment/moment.js" }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name of the manifest at the root of every stack.
pub const MANIFEST_FILE: &str = "package.json";

/// How a single package is distributed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributeEntry {
    /// Path below `node_modules` copied to `<out>/thirdparty/<files>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,

    /// Browser global that provides the package at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,

    /// Specifier to mark external instead of the package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BcoreSection {
    #[serde(default)]
    distribute: BTreeMap<String, DistributeEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    bcore: Option<BcoreSection>,
}

/// Parsed stack manifest.
#[derive(Debug, Clone, Default)]
pub struct StackManifest {
    /// Package name, if declared.
    pub name: Option<String>,
    /// Runtime dependencies (name -> version range).
    pub dependencies: BTreeMap<String, String>,
    /// `bcore.distribute` entries, ordered by package name.
    pub distribute: BTreeMap<String, DistributeEntry>,
}

impl StackManifest {
    /// Read `<stack>/package.json`.
    pub fn load(stack: impl AsRef<Path>) -> Result<Self> {
        let path = stack.as_ref().join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| Error::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path)
    }

    /// Parse manifest JSON; `path` is only used for error messages.
    pub fn parse(content: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let raw: RawManifest = serde_json::from_str(content).map_err(|e| Error::Manifest {
            path: path.into(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name: raw.name,
            dependencies: raw.dependencies,
            distribute: raw.bcore.map(|b| b.distribute).unwrap_or_default(),
        })
    }

    /// Name used for the bundle map file: the package name without its
    /// scope, or the stack directory name when the manifest has none.
    pub fn stack_name(&self, stack: &Path) -> String {
        self.name
            .as_deref()
            .map(|n| n.rsplit('/').next().unwrap_or(n).to_string())
            .filter(|n| !n.is_empty())
            .or_else(|| {
                stack
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "stack".to_string())
    }
}
