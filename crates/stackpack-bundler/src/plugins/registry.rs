//! Plugin registry with execution phases.
//!
//! Rolldown runs `resolve_id` / `load` hooks in registration order and stops
//! at the first plugin that answers. The registry sorts plugins by phase so
//! the stack plugins claim their specifiers in a predictable order.

use crate::SharedPluginable;
use rolldown_plugin::Plugin;
use std::sync::Arc;

/// Plugin execution phases
///
/// Plugins are executed in phase order (lower numbers first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginPhase {
    /// Internal modules that never exist on disk (HTML templates, globals).
    ///
    /// Runs first so that a package mapped to a browser global is never
    /// rewritten by a later resolver.
    Virtual = 0,

    /// Specifier rewriting and externalization.
    Resolve = 10,

    /// Loaders for files the engine cannot read itself (styles, fonts, images).
    Load = 20,

    /// Post-processing of the generated bundle.
    PostProcess = 100,
}

/// A Rolldown plugin that knows where it belongs in the chain.
///
/// Note: `Plugin` already requires `Send + Sync`, so we don't repeat those bounds here.
pub trait StackPlugin: Plugin {
    /// Return the execution phase for this plugin
    fn phase(&self) -> PluginPhase {
        PluginPhase::Load
    }
}

/// Plugin registry that maintains plugins in phase order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<(PluginPhase, SharedPluginable)>,
}

impl PluginRegistry {
    /// Create a new empty plugin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin to the registry
    ///
    /// Sorting happens once when converting via `into_rolldown_plugins()`.
    pub fn add<P: StackPlugin + 'static>(&mut self, plugin: P) {
        let phase = plugin.phase();
        let plugin_arc: SharedPluginable = Arc::new(plugin);
        self.plugins.push((phase, plugin_arc));
    }

    /// Add a plugin with an explicit phase
    ///
    /// Useful for plugins supplied by a `configure` hook.
    pub fn add_with_phase(&mut self, plugin: SharedPluginable, phase: PluginPhase) {
        self.plugins.push((phase, plugin));
    }

    /// Convert to Rolldown plugins in correct order
    ///
    /// The sort is stable: plugins within a phase keep insertion order.
    pub fn into_rolldown_plugins(mut self) -> Vec<SharedPluginable> {
        self.plugins.sort_by_key(|(phase, _)| *phase);
        self.plugins.into_iter().map(|(_, plugin)| plugin).collect()
    }

    /// Plugin names in execution order.
    pub fn names(&self) -> Vec<String> {
        let mut sorted: Vec<_> = self.plugins.iter().collect();
        sorted.sort_by_key(|(phase, _)| *phase);
        sorted
            .into_iter()
            .map(|(_, plugin)| plugin.call_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{BundleMapPlugin, HtmlTemplatePlugin, IgnoreAssetsPlugin};

    #[test]
    fn test_plugins_sorted_by_phase() {
        let mut registry = PluginRegistry::new();
        registry.add(BundleMapPlugin::new("/s", "s"));
        registry.add(IgnoreAssetsPlugin::new());
        registry.add(HtmlTemplatePlugin::new("/s"));

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names(),
            vec![
                "stackpack-html-template",
                "stackpack-ignore-assets",
                "stackpack-bundle-map",
            ]
        );
        assert_eq!(registry.into_rolldown_plugins().len(), 3);
    }

    #[test]
    fn test_explicit_phase() {
        let mut registry = PluginRegistry::new();
        registry.add(IgnoreAssetsPlugin::new());
        registry.add_with_phase(
            Arc::new(BundleMapPlugin::new("/s", "s")),
            PluginPhase::Virtual,
        );
        assert_eq!(registry.names()[0], "stackpack-bundle-map");
    }
}
