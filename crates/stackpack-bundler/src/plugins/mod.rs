//! Plugin system for stackpack-bundler.
//!
//! This module provides the plugin infrastructure, including:
//! - Plugin registry with execution phases
//! - The stack plugins (templates, stylesheets, CDN rewriting, bundle map)

pub mod bundle_map;
pub mod external_globals;
pub mod file_loader;
pub mod html_template;
pub mod ignore_assets;
pub mod registry;
pub mod skypack;
pub mod style_resolve;
pub mod stylesheet;

pub use bundle_map::BundleMapPlugin;
pub use external_globals::ExternalGlobalsPlugin;
pub use file_loader::FileLoaderPlugin;
pub use html_template::HtmlTemplatePlugin;
pub use ignore_assets::IgnoreAssetsPlugin;
pub use registry::{PluginPhase, PluginRegistry, StackPlugin};
pub use skypack::SkypackPlugin;
pub use style_resolve::StyleResolvePlugin;
pub use stylesheet::StylesheetPlugin;
