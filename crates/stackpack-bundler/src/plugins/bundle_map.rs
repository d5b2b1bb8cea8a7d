//! Entry-to-output map for the server.
//!
//! Hashed file names change with every build, so the server looks entries up
//! in `<out>/<stackName>.map.json`:
//!
//! ```json
//! {
//!   "/dist/pages/home.bundle.js": "/dist/pages/home.bundle.3f9a1c2b.js",
//!   "/dist/pages/home.bundle.css": "/dist/pages/home.bundle.7c01d2e4.css"
//! }
//! ```
//!
//! Script entries come from the generated chunks. Stylesheet entries are
//! compiled outside the engine and handed in up front.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use rolldown_common::{Output, OutputAsset};
use rolldown_plugin::{HookGenerateBundleArgs, HookNoopReturn, HookUsage, Plugin, PluginContext};

use crate::plugins::{PluginPhase, StackPlugin};

/// URL prefix used for both sides of the map.
pub const DIST_PREFIX: &str = "/dist/";

#[derive(Debug, Clone)]
pub struct BundleMapPlugin {
    stack: PathBuf,
    stack_name: String,
    /// `(entry, output)` pairs for stylesheet entries.
    stylesheets: Vec<(String, String)>,
}

impl BundleMapPlugin {
    pub fn new(stack: impl Into<PathBuf>, stack_name: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            stack_name: stack_name.into(),
            stylesheets: Vec::new(),
        }
    }

    pub fn with_stylesheets(mut self, stylesheets: Vec<(String, String)>) -> Self {
        self.stylesheets = stylesheets;
        self
    }

    /// `<stackName>.map.json`
    pub fn file_name(&self) -> String {
        format!("{}.map.json", self.stack_name)
    }

    /// Build the map from `(entry module, output file)` pairs.
    pub fn build_map<'a>(
        &self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> BTreeMap<String, String> {
        entries
            .into_iter()
            .filter(|(_, output)| !output.ends_with(".map"))
            .map(|(entry, output)| {
                let entry_path = Path::new(entry);
                let relative = entry_path.strip_prefix(&self.stack).unwrap_or(entry_path);
                (
                    format!("{DIST_PREFIX}{}", to_url_path(relative)),
                    format!("{DIST_PREFIX}{}", output.trim_start_matches('/')),
                )
            })
            .collect()
    }

    /// The map file for the given script `(entry, output)` pairs plus the
    /// stylesheet entries.
    pub fn map_asset(&self, scripts: &[(String, String)]) -> anyhow::Result<Output> {
        let map = self.build_map(
            scripts
                .iter()
                .chain(self.stylesheets.iter())
                .map(|(e, o)| (e.as_str(), o.as_str())),
        );
        let json = serde_json::to_string(&map).context("Failed to serialize bundle map")?;
        let file_name = self.file_name();

        tracing::debug!("Writing {} ({} entries)", file_name, map.len());

        Ok(Output::Asset(Arc::new(OutputAsset {
            names: vec![],
            original_file_names: vec![],
            filename: file_name.into(),
            source: json.into(),
        })))
    }
}

fn to_url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl Plugin for BundleMapPlugin {
    fn name(&self) -> Cow<'static, str> {
        "stackpack-bundle-map".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::GenerateBundle
    }

    fn generate_bundle(
        &self,
        _ctx: &PluginContext,
        args: &mut HookGenerateBundleArgs<'_>,
    ) -> impl std::future::Future<Output = HookNoopReturn> + Send {
        let plugin = self.clone();

        async move {
            let entries: Vec<(String, String)> = args
                .bundle
                .iter()
                .filter_map(|output| match output {
                    Output::Chunk(chunk) if chunk.is_entry => chunk
                        .facade_module_id
                        .as_ref()
                        .map(|id| (id.to_string(), chunk.filename.to_string())),
                    _ => None,
                })
                .collect();

            args.bundle.push(plugin.map_asset(&entries)?);

            Ok(())
        }
    }
}

impl StackPlugin for BundleMapPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::PostProcess
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(BundleMapPlugin::new("/s", "shop").file_name(), "shop.map.json");
    }

    #[test]
    fn test_build_map() {
        let plugin = BundleMapPlugin::new("/srv/shop", "shop");
        let map = plugin.build_map([
            (
                "/srv/shop/pages/home.bundle.js",
                "pages/home.bundle.3f9a1c2b.js",
            ),
            ("/srv/shop/app.bundle.ts", "app.bundle.aa11bb22.js"),
            ("/srv/shop/app.bundle.ts", "app.bundle.aa11bb22.js.map"),
        ]);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map["/dist/pages/home.bundle.js"],
            "/dist/pages/home.bundle.3f9a1c2b.js"
        );
        assert_eq!(map["/dist/app.bundle.ts"], "/dist/app.bundle.aa11bb22.js");
    }

    #[test]
    fn test_map_asset_includes_stylesheets() {
        let plugin = BundleMapPlugin::new("/srv/shop", "shop").with_stylesheets(vec![(
            "/srv/shop/public/site.bundle.css".to_string(),
            "public/site.bundle.0badf00d.css".to_string(),
        )]);

        let asset = plugin
            .map_asset(&[(
                "/srv/shop/public/site.bundle.js".to_string(),
                "public/site.bundle.1a2b3c4d.js".to_string(),
            )])
            .unwrap();

        assert_eq!(asset.filename(), "shop.map.json");
        let map: BTreeMap<String, String> =
            serde_json::from_slice(asset.content_as_bytes()).unwrap();
        assert_eq!(
            map["/dist/public/site.bundle.css"],
            "/dist/public/site.bundle.0badf00d.css"
        );
        assert_eq!(
            map["/dist/public/site.bundle.js"],
            "/dist/public/site.bundle.1a2b3c4d.js"
        );
    }

    #[test]
    fn test_map_serializes_as_plain_object() {
        let plugin = BundleMapPlugin::new("/srv/shop", "shop");
        let map = plugin.build_map([("/srv/shop/a.bundle.js", "a.bundle.1.js")]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"/dist/a.bundle.js":"/dist/a.bundle.1.js"}"#
        );
    }
}
