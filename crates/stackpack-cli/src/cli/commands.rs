use clap::{Args, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::enums::Format;
use crate::cli::validation::parse_global;
use crate::config::ConfigOverrides;

/// Available stackpack subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bundle a stack once
    ///
    /// Discovers the stack's entry points, copies distributed third-party
    /// files and writes the bundle to build/ (dist/ with --production).
    Bundle(BundleArgs),

    /// Bundle a stack and rebuild on change
    ///
    /// Starts a live-reload server that notifies connected browsers after
    /// every rebuild, including the errors of failed ones.
    Watch(WatchArgs),
}

/// Flags shared by `bundle` and `watch`
#[derive(Args, Debug, Clone, Default)]
pub struct BuildFlags {
    /// Production build
    ///
    /// Writes to dist/, defines process.env.NODE_ENV as "production" and
    /// always minifies.
    #[arg(long)]
    pub production: bool,

    /// Output module format [default: cjs]
    ///
    /// - cjs: CommonJS
    /// - esm: ECMAScript modules; known dependencies are loaded from the CDN
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<Format>,

    /// Minify the output
    #[arg(short = 'm', long)]
    pub minify: bool,

    /// Map a package to a browser global (repeatable)
    ///
    /// Imports of the package are replaced by the global.
    ///
    /// Example: --global jquery=jQuery
    #[arg(short = 'g', long = "global", value_name = "PACKAGE=GLOBAL", value_parser = parse_global)]
    pub globals: Vec<(String, String)>,

    /// Directory whose node_modules are searched before the stack's own
    #[arg(long, value_name = "DIR")]
    pub toolchain_dir: Option<PathBuf>,
}

impl BuildFlags {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            format: self.format.map(Into::into),
            minify: self.minify.then_some(true),
            production: self.production.then_some(true),
            globals: (!self.globals.is_empty())
                .then(|| self.globals.iter().cloned().collect::<BTreeMap<_, _>>()),
            toolchain_dir: self.toolchain_dir.clone(),
            ..Default::default()
        }
    }
}

/// Arguments for the bundle command
#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Stack directory (holds package.json)
    #[arg(default_value = ".", value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub flags: BuildFlags,

    /// Print a size breakdown of the output
    #[arg(short = 'a', long)]
    pub analyze: bool,
}

impl BundleArgs {
    /// Settings given on the command line; unset flags leave lower layers alone.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            analyze: self.analyze.then_some(true),
            ..self.flags.overrides()
        }
    }
}

/// Arguments for the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Stack directory (holds package.json)
    #[arg(default_value = ".", value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub flags: BuildFlags,

    /// Live-reload server port [default: 7000]
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Keep clients connected after a successful rebuild
    ///
    /// By default their event streams are closed so the browser reloads
    /// and reconnects.
    #[arg(long)]
    pub keep_clients: bool,

    /// Quiet period in milliseconds before a rebuild starts [default: 100]
    #[arg(long, value_name = "MS")]
    pub debounce: Option<u64>,
}

impl WatchArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            keep_clients: self.keep_clients.then_some(true),
            debounce_ms: self.debounce,
            ..self.flags.overrides()
        }
    }
}
