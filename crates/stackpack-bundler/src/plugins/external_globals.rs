//! Packages provided by browser globals.
//!
//! With `{ "jquery": "jQuery" }`, `import $ from "jquery"` compiles to a
//! module whose body is `module.exports = jQuery;`.

use std::borrow::Cow;
use std::collections::BTreeMap;

use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::plugins::{PluginPhase, StackPlugin};

const ID_PREFIX: &str = "\0external-global:";

#[derive(Debug, Clone, Default)]
pub struct ExternalGlobalsPlugin {
    globals: BTreeMap<String, String>,
}

impl ExternalGlobalsPlugin {
    pub fn new(globals: BTreeMap<String, String>) -> Self {
        Self { globals }
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }

    /// Module body for `package`, if it is mapped.
    pub fn module_for(&self, package: &str) -> Option<String> {
        self.globals
            .get(package)
            .map(|global| format!("module.exports = {global};"))
    }
}

impl Plugin for ExternalGlobalsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "stackpack-external-globals".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let mapped = self
            .globals
            .contains_key(args.specifier)
            .then(|| format!("{ID_PREFIX}{}", args.specifier));

        async move {
            Ok(mapped.map(|id| HookResolveIdOutput {
                id: id.into(),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let code = args
            .id
            .strip_prefix(ID_PREFIX)
            .and_then(|package| self.module_for(package));

        async move {
            Ok(code.map(|code| HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

impl StackPlugin for ExternalGlobalsPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Virtual
    }
}
