//! `~package/...` style imports.
//!
//! Stylesheets reference packages as `@import "~bootstrap/scss/grid.scss"`;
//! the tilde points into the stack's own `node_modules`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::plugins::{PluginPhase, StackPlugin};

static STYLE_SPECIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".\.(css|sass|scss|less|styl)$").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct StyleResolvePlugin {
    node_modules: PathBuf,
}

impl StyleResolvePlugin {
    pub fn new(stack: &Path) -> Self {
        Self {
            node_modules: stack.join("node_modules"),
        }
    }

    /// Target path for a tilde style import, or `None` when the engine should
    /// resolve the specifier itself.
    pub fn resolve_tilde(&self, specifier: &str) -> Option<PathBuf> {
        if !STYLE_SPECIFIER.is_match(specifier) {
            return None;
        }
        let (_, rest) = specifier.split_once('~')?;
        Some(self.node_modules.join(rest.trim_start_matches('/')))
    }
}

impl Plugin for StyleResolvePlugin {
    fn name(&self) -> Cow<'static, str> {
        "stackpack-style-resolve".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let resolved = self.resolve_tilde(args.specifier);

        async move {
            Ok(resolved.map(|path| HookResolveIdOutput {
                id: path.to_string_lossy().into_owned().into(),
                ..Default::default()
            }))
        }
    }
}

impl StackPlugin for StyleResolvePlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }
}
