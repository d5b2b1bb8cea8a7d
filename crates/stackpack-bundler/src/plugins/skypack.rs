//! CDN rewriting for ES module builds.
//!
//! Bare imports of packages listed in the stack's `dependencies` are not
//! bundled; they are left external and pointed at Skypack instead:
//!
//! ```text
//! import "preact/hooks"  ->  https://cdn.skypack.dev/preact@^10.5.0/hooks
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::plugins::{PluginPhase, StackPlugin};
use crate::{Error, Result};

pub const SKYPACK_CDN: &str = "https://cdn.skypack.dev";

/// Cache directory created inside the stack.
pub const SKYPACK_CACHE_DIR: &str = ".skypack";

#[derive(Debug, Clone)]
pub struct SkypackPlugin {
    dependencies: BTreeMap<String, String>,
    cache_dir: PathBuf,
}

impl SkypackPlugin {
    /// Create the plugin for `stack`, creating `<stack>/.skypack`.
    ///
    /// Fails when no stack is given.
    pub fn new(stack: Option<&Path>, dependencies: BTreeMap<String, String>) -> Result<Self> {
        let stack = stack.ok_or_else(|| Error::InvalidConfig("Missing stack option!".into()))?;
        let cache_dir = stack.join(SKYPACK_CACHE_DIR);
        std::fs::create_dir_all(&cache_dir)
            .map_err(|e| Error::io(format!("Failed to create {}", cache_dir.display()), e))?;

        Ok(Self {
            dependencies,
            cache_dir,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// CDN URL for a bare specifier, if its package is a known dependency.
    pub fn cdn_url(&self, specifier: &str) -> Option<String> {
        let (package, subpath) = split_bare_specifier(specifier)?;
        let version = self.dependencies.get(package)?;
        Some(match subpath {
            Some(rest) => format!("{SKYPACK_CDN}/{package}@{version}/{rest}"),
            None => format!("{SKYPACK_CDN}/{package}@{version}"),
        })
    }
}

/// Split `@scope/name/sub/path` into `("@scope/name", Some("sub/path"))`.
///
/// Relative, absolute, URL and internal specifiers yield `None`.
pub fn split_bare_specifier(specifier: &str) -> Option<(&str, Option<&str>)> {
    if specifier.is_empty()
        || specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.starts_with('\0')
        || specifier.contains(':')
    {
        return None;
    }

    let package_end = if specifier.starts_with('@') {
        let scope_end = specifier.find('/')?;
        specifier[scope_end + 1..]
            .find('/')
            .map(|i| scope_end + 1 + i)
    } else {
        specifier.find('/')
    };

    match package_end {
        Some(end) => {
            let rest = &specifier[end + 1..];
            Some((&specifier[..end], (!rest.is_empty()).then_some(rest)))
        }
        None => Some((specifier, None)),
    }
}

impl Plugin for SkypackPlugin {
    fn name(&self) -> Cow<'static, str> {
        "stackpack-skypack".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let url = if args.is_entry {
            None
        } else {
            self.cdn_url(args.specifier)
        };

        async move {
            Ok(url.map(|url| {
                tracing::debug!("Loading {} from the CDN", url);
                HookResolveIdOutput {
                    id: url.into(),
                    external: Some(ResolvedExternal::Bool(true)),
                    ..Default::default()
                }
            }))
        }
    }
}

impl StackPlugin for SkypackPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }
}
