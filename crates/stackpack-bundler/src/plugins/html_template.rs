//! HTML template imports.
//!
//! `import "./cart.html"` registers the file's markup on the page-global
//! template registry:
//!
//! ```js
//! bcore.templates['cart'] = `<div>...</div>`;
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use rolldown_common::{LogWithoutPlugin, ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::plugins::{PluginPhase, StackPlugin};

const ID_PREFIX: &str = "\0html-template:";

/// Turns `.html` imports into template registrations.
#[derive(Debug, Clone)]
pub struct HtmlTemplatePlugin {
    stack: PathBuf,
}

impl HtmlTemplatePlugin {
    pub fn new(stack: impl Into<PathBuf>) -> Self {
        Self {
            stack: stack.into(),
        }
    }
}

/// Module body registering `content` under `name`.
pub fn render_template_module(name: &str, content: &str) -> String {
    let escaped = content.replace('`', "\\`");
    format!("\n\tbcore.templates['{name}'] = `{escaped}`;\n")
}

fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Plugin for HtmlTemplatePlugin {
    fn name(&self) -> Cow<'static, str> {
        "stackpack-html-template".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(|s| s.to_string());
        let stack = self.stack.clone();

        async move {
            if !specifier.ends_with(".html") {
                return Ok(None);
            }

            let spec_path = Path::new(&specifier);
            let path = if spec_path.is_absolute() {
                spec_path.to_path_buf()
            } else {
                let base = importer
                    .as_deref()
                    .and_then(|i| Path::new(i).parent().map(Path::to_path_buf))
                    .unwrap_or(stack);
                base.join(spec_path)
            };

            Ok(Some(HookResolveIdOutput {
                id: format!("{ID_PREFIX}{}", path.display()).into(),
                external: Some(ResolvedExternal::Bool(false)),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();

        async move {
            let Some(path) = id.strip_prefix(ID_PREFIX) else {
                return Ok(None);
            };
            let path = PathBuf::from(path);

            let code = match tokio::fs::read_to_string(&path).await {
                Ok(content) => render_template_module(&template_name(&path), &content),
                Err(e) => {
                    tracing::debug!("Failed to read template {}: {}", path.display(), e);
                    ctx.warn(LogWithoutPlugin {
                        message: format!("Error importing {}", path.display()),
                        ..Default::default()
                    });
                    String::new()
                }
            };

            Ok(Some(HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

impl StackPlugin for HtmlTemplatePlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Virtual
    }
}
