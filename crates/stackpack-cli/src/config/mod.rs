//! Configuration for a stack build, merged from several sources.
//!
//! Priority: CLI > Environment (`STACKPACK_*`) > `<stack>/stackpack.toml` > Defaults

mod loading;
mod validation;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use stackpack_bundler::{BundleOptions, OutputFormat};

use crate::reload::ClientRetention;

pub use validation::validate_global_name;

/// Config file looked up at the stack root.
pub const CONFIG_FILE: &str = "stackpack.toml";

/// Default live-reload port.
pub const DEFAULT_PORT: u16 = 7000;

/// Default quiet period before a rebuild, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Stackpack configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackpackConfig {
    /// Output module format (esm, cjs)
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub minify: bool,

    /// Write to dist/ and build for production
    #[serde(default)]
    pub production: bool,

    /// Print a size breakdown after `bundle`
    #[serde(default)]
    pub analyze: bool,

    /// Live-reload server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Keep reload clients connected after a successful rebuild
    #[serde(default)]
    pub keep_clients: bool,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Package -> browser global
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub globals: BTreeMap<String, String>,

    /// Directory whose node_modules precede the stack's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for StackpackConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            minify: false,
            production: false,
            analyze: false,
            port: DEFAULT_PORT,
            keep_clients: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            globals: BTreeMap::new(),
            toolchain_dir: None,
        }
    }
}

/// Settings given on the command line. `None` leaves lower layers untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyze: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_clients: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globals: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain_dir: Option<PathBuf>,
}

impl StackpackConfig {
    /// Bundler options for `stack`. A relative `toolchain_dir` is taken
    /// relative to the stack.
    pub fn bundle_options(&self, stack: &Path) -> BundleOptions {
        let options = BundleOptions::new(stack)
            .format(self.format)
            .minify(self.minify)
            .production(self.production)
            .analyze(self.analyze)
            .external_map(self.globals.clone());

        match &self.toolchain_dir {
            Some(dir) => options.toolchain_dir(stack.join(dir)),
            None => options,
        }
    }

    pub fn retention(&self) -> ClientRetention {
        if self.keep_clients {
            ClientRetention::Keep
        } else {
            ClientRetention::ClearOnSuccess
        }
    }
}
