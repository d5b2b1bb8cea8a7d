//! Bundle configuration for a single stack.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

/// Output module format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ECMAScript modules. Enables CDN rewriting of known dependencies.
    Esm,
    /// CommonJS.
    #[default]
    Cjs,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Esm => "esm",
            OutputFormat::Cjs => "cjs",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "esm" => Ok(OutputFormat::Esm),
            "cjs" => Ok(OutputFormat::Cjs),
            other => Err(format!("Unknown format '{}'. Expected: esm, cjs", other)),
        }
    }
}

impl From<OutputFormat> for rolldown::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Esm => rolldown::OutputFormat::Esm,
            OutputFormat::Cjs => rolldown::OutputFormat::Cjs,
        }
    }
}

/// Hook that may rewrite the engine configuration before a build.
pub type ConfigureHook = Arc<dyn Fn(EngineConfig) -> EngineConfig + Send + Sync>;

/// Asset extensions emitted as standalone files.
pub const FILE_LOADER_EXTENSIONS: &[&str] =
    &[".png", ".jpg", ".jpeg", ".svg", ".woff", ".woff2", ".eot", ".ttf"];

/// Options for bundling one stack.
#[derive(Clone)]
pub struct BundleOptions {
    /// Root of the stack (holds `package.json`).
    pub stack_path: PathBuf,
    /// Watch mode: the caller rebuilds on change.
    pub watch: bool,
    /// Production build: writes to `dist/`, always minifies.
    pub production: bool,
    pub format: OutputFormat,
    /// Collect a size breakdown of the output.
    pub analyze: bool,
    pub minify: bool,
    /// Package -> browser global applied before the manifest's own globals.
    pub external_map: BTreeMap<String, String>,
    /// Directory whose `node_modules` precede the stack's during resolution.
    pub toolchain_dir: Option<PathBuf>,
    pub configure: Option<ConfigureHook>,
}

impl fmt::Debug for BundleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleOptions")
            .field("stack_path", &self.stack_path)
            .field("watch", &self.watch)
            .field("production", &self.production)
            .field("format", &self.format)
            .field("analyze", &self.analyze)
            .field("minify", &self.minify)
            .field("external_map", &self.external_map)
            .field("toolchain_dir", &self.toolchain_dir)
            .field("configure", &self.configure.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl BundleOptions {
    pub fn new(stack_path: impl Into<PathBuf>) -> Self {
        Self {
            stack_path: stack_path.into(),
            watch: false,
            production: false,
            format: OutputFormat::default(),
            analyze: false,
            minify: false,
            external_map: BTreeMap::new(),
            toolchain_dir: None,
            configure: None,
        }
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn analyze(mut self, analyze: bool) -> Self {
        self.analyze = analyze;
        self
    }

    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    pub fn external_map(mut self, map: BTreeMap<String, String>) -> Self {
        self.external_map = map;
        self
    }

    pub fn toolchain_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.toolchain_dir = Some(dir.into());
        self
    }

    pub fn configure<F>(mut self, hook: F) -> Self
    where
        F: Fn(EngineConfig) -> EngineConfig + Send + Sync + 'static,
    {
        self.configure = Some(Arc::new(hook));
        self
    }

    /// `dist` for production builds, `build` otherwise.
    pub fn build_dir_name(&self) -> &'static str {
        if self.production { "dist" } else { "build" }
    }

    pub fn out_dir(&self) -> PathBuf {
        self.stack_path.join(self.build_dir_name())
    }

    /// Production always minifies.
    pub fn effective_minify(&self) -> bool {
        self.minify || self.production
    }

    /// Value substituted for `process.env.NODE_ENV`.
    pub fn node_env(&self) -> &'static str {
        if self.production {
            "production"
        } else {
            "development"
        }
    }

    /// `node_modules` directories searched for bare imports, toolchain first.
    pub fn node_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);
        if let Some(toolchain) = &self.toolchain_dir {
            paths.push(toolchain.join("node_modules"));
        }
        paths.push(self.stack_path.join("node_modules"));
        paths
    }

    pub(crate) fn stack(&self) -> &Path {
        &self.stack_path
    }
}
