//! Leaves server-hosted `/assets/...` references alone.

use std::borrow::Cow;

use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::plugins::{PluginPhase, StackPlugin};

const ASSETS_PREFIX: &str = "/assets/";

#[derive(Debug, Clone, Default)]
pub struct IgnoreAssetsPlugin;

impl IgnoreAssetsPlugin {
    pub fn new() -> Self {
        Self
    }
}

pub fn is_server_asset(specifier: &str) -> bool {
    specifier.starts_with(ASSETS_PREFIX)
}

impl Plugin for IgnoreAssetsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "stackpack-ignore-assets".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();

        async move {
            if !is_server_asset(&specifier) {
                return Ok(None);
            }
            Ok(Some(HookResolveIdOutput {
                id: specifier.into(),
                external: Some(ResolvedExternal::Bool(true)),
                ..Default::default()
            }))
        }
    }
}

impl StackPlugin for IgnoreAssetsPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_server_asset() {
        assert!(is_server_asset("/assets/img/logo.png"));
        assert!(!is_server_asset("./assets/logo.png"));
        assert!(!is_server_asset("/static/logo.png"));
        assert!(!is_server_asset("assets/logo.png"));
    }
}
