//! Images and fonts imported from scripts.
//!
//! The file is emitted next to the bundles under a hashed name and the
//! importing module receives that name as its default export.

use std::borrow::Cow;
use std::path::Path;

use anyhow::Context;
use rolldown_common::{EmittedAsset, ModuleType};
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, HookUsage, Plugin, PluginContext};

use crate::options::FILE_LOADER_EXTENSIONS;
use crate::plugins::{PluginPhase, StackPlugin};

#[derive(Debug, Clone)]
pub struct FileLoaderPlugin {
    extensions: Vec<String>,
}

impl Default for FileLoaderPlugin {
    fn default() -> Self {
        Self::new(FILE_LOADER_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }
}

impl FileLoaderPlugin {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    pub fn handles(&self, id: &str) -> bool {
        let lower = id.to_ascii_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }
}

/// Module body exporting an emitted file name.
pub fn file_reference_module(file_name: &str) -> String {
    let quoted = serde_json::to_string(file_name).unwrap_or_else(|_| format!("\"{file_name}\""));
    format!("export default {quoted};\n")
}

impl Plugin for FileLoaderPlugin {
    fn name(&self) -> Cow<'static, str> {
        "stackpack-file-loader".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Load
    }

    fn load(
        &self,
        ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let handles = self.handles(&id);

        async move {
            if !handles {
                return Ok(None);
            }

            let path = Path::new(&id);
            let content = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read asset {}", id))?;

            let reference_id = ctx.emit_file(
                EmittedAsset {
                    name: path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(|s| s.to_string()),
                    original_file_name: Some(id.clone()),
                    file_name: None,
                    source: content.into(),
                },
                None,
                None,
            )?;
            let file_name = ctx.get_file_name(&reference_id)?;

            tracing::debug!("Emitted asset {} as {}", id, file_name);

            Ok(Some(HookLoadOutput {
                code: file_reference_module(&file_name).into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

impl StackPlugin for FileLoaderPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Load
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_configured_extensions() {
        let plugin = FileLoaderPlugin::default();
        assert!(plugin.handles("/s/img/logo.png"));
        assert!(plugin.handles("/s/fonts/Icons.WOFF2"));
        assert!(plugin.handles("/s/img/icon.svg"));
        assert!(!plugin.handles("/s/app.js"));
        assert!(!plugin.handles("/s/styles.css"));
    }

    #[test]
    fn test_file_reference_module() {
        assert_eq!(
            file_reference_module("logo.5f2a1c.png"),
            "export default \"logo.5f2a1c.png\";\n"
        );
    }
}
