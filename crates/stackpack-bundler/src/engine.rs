//! Rolldown configuration for a stack build.
//!
//! [`EngineConfig::assemble`] turns the stack's options, manifest, script
//! entries and distribution plan into the options and plugin chain handed to
//! Rolldown. The caller's `configure` hook sees the result last.
//!
//! Stylesheet entries are compiled before the engine runs; only their output
//! names reach the configuration, through the bundle map.

use std::path::{Path, PathBuf};

use rolldown::{
    BundlerOptions, InputItem, IsExternal, Platform, ResolveOptions, SourceMapType, WatchOption,
};

use crate::Result;
use crate::distribute::DistributionPlan;
use crate::manifest::StackManifest;
use crate::options::{BundleOptions, OutputFormat};
use crate::plugins::stylesheet::CompiledStylesheet;
use crate::plugins::{
    BundleMapPlugin, ExternalGlobalsPlugin, FileLoaderPlugin, HtmlTemplatePlugin,
    IgnoreAssetsPlugin, PluginRegistry, SkypackPlugin, StyleResolvePlugin, StylesheetPlugin,
};

/// Output naming below the output dir: `<dir>/<name>.<hash>.js`.
pub const ENTRY_FILENAMES: &str = "[name].[hash].js";

/// Everything Rolldown needs for one build.
#[derive(Debug)]
pub struct EngineConfig {
    pub options: BundlerOptions,
    pub plugins: PluginRegistry,
}

impl EngineConfig {
    /// Assemble the engine configuration and apply the `configure` hook.
    ///
    /// `entries` are the script entries. `stylesheets` only feed the bundle map.
    pub fn assemble(
        options: &BundleOptions,
        manifest: &StackManifest,
        entries: &[PathBuf],
        stylesheets: &[CompiledStylesheet],
        plan: &DistributionPlan,
    ) -> Result<Self> {
        let stack = options.stack();

        let bundler_options = BundlerOptions {
            input: Some(
                entries
                    .iter()
                    .map(|entry| InputItem {
                        name: Some(entry_name(stack, entry)),
                        import: entry.to_string_lossy().into_owned(),
                    })
                    .collect(),
            ),
            cwd: Some(stack.to_path_buf()),
            format: Some(options.format.into()),
            sourcemap: Some(SourceMapType::File),
            external: Some(IsExternal::from(plan.externals.clone())),
            define: Some(
                [(
                    "process.env.NODE_ENV".to_string(),
                    format!("\"{}\"", options.node_env()),
                )]
                .into_iter()
                .collect(),
            ),
            minify: options
                .effective_minify()
                .then(|| rolldown::RawMinifyOptions::from(true)),
            platform: Some(Platform::Browser),
            entry_filenames: Some(ENTRY_FILENAMES.to_string().into()),
            resolve: Some(configure_resolution(&options.node_paths())),
            // Marker only; rebuilds are driven by the caller.
            watch: options.watch.then(WatchOption::default),
            ..Default::default()
        };

        let config = Self {
            options: bundler_options,
            plugins: stack_plugins(options, manifest, stylesheets, plan)?,
        };

        Ok(match &options.configure {
            Some(hook) => hook(config),
            None => config,
        })
    }
}

/// Entry path relative to the stack, without its extension.
///
/// `<stack>/pages/home.bundle.ts` becomes `pages/home.bundle`.
pub fn entry_name(stack: &Path, entry: &Path) -> String {
    let relative = entry.strip_prefix(stack).unwrap_or(entry);
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The stack plugin chain. CDN rewriting is only enabled for `esm` output.
fn stack_plugins(
    options: &BundleOptions,
    manifest: &StackManifest,
    stylesheets: &[CompiledStylesheet],
    plan: &DistributionPlan,
) -> Result<PluginRegistry> {
    let stack = options.stack();
    let mut registry = PluginRegistry::new();

    registry.add(HtmlTemplatePlugin::new(stack));
    if !plan.globals.is_empty() {
        registry.add(ExternalGlobalsPlugin::new(plan.globals.clone()));
    }
    registry.add(IgnoreAssetsPlugin::new());
    registry.add(StyleResolvePlugin::new(stack));
    if options.format == OutputFormat::Esm {
        registry.add(SkypackPlugin::new(
            Some(stack),
            manifest.dependencies.clone(),
        )?);
    }
    registry.add(FileLoaderPlugin::default());
    registry.add(StylesheetPlugin::new(stack, options.effective_minify()));
    registry.add(
        BundleMapPlugin::new(stack, manifest.stack_name(stack))
            .with_stylesheets(stylesheet_pairs(stylesheets)),
    );

    Ok(registry)
}

/// `(entry, output)` pairs for the bundle map.
pub fn stylesheet_pairs(stylesheets: &[CompiledStylesheet]) -> Vec<(String, String)> {
    stylesheets
        .iter()
        .map(|s| (s.entry.to_string_lossy().into_owned(), s.filename.clone()))
        .collect()
}

fn configure_resolution(node_paths: &[PathBuf]) -> ResolveOptions {
    let mut modules: Vec<String> = node_paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    modules.push("node_modules".to_string());

    ResolveOptions {
        main_fields: Some(vec![
            "browser".to_string(),
            "module".to_string(),
            "main".to_string(),
        ]),
        condition_names: Some(vec![
            "browser".to_string(),
            "import".to_string(),
            "module".to_string(),
            "default".to_string(),
        ]),
        extensions: Some(vec![
            ".js".to_string(),
            ".mjs".to_string(),
            ".jsx".to_string(),
            ".ts".to_string(),
            ".tsx".to_string(),
            ".json".to_string(),
        ]),
        modules: Some(modules),
        symlinks: Some(true),
        ..Default::default()
    }
}
