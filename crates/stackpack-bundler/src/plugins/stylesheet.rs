//! Stylesheet loading.
//!
//! `.css` files go straight to lightningcss. `.scss`, `.sass` and `.less`
//! files are first compiled by the preprocessor the stack installs itself
//! (`node_modules/.bin/sass`, `node_modules/.bin/lessc`), then handled like
//! plain CSS.
//!
//! Stylesheet entries (`*.bundle.css`, `*.bundle.scss`, ...) never enter the
//! script graph: [`StylesheetPlugin::compile_entry`] turns each one into a
//! `<dir>/<name>.<hash>.css` file. Any stylesheet imported from a script
//! yields its compiled text:
//!
//! ```js
//! import css from "./widget.scss"; // css === ".widget{color:red}"
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
    targets::{Browsers, Targets},
};
use rolldown_common::{ModuleType, Output, OutputAsset};
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, HookUsage, Plugin, PluginContext};
use tokio::process::Command;
use tokio::time::{Duration, timeout};

use crate::engine::entry_name;
use crate::plugins::{PluginPhase, StackPlugin};

/// Preprocessor runs longer than this are killed.
const PREPROCESSOR_TIMEOUT_SECS: u64 = 60;

/// Kind of stylesheet, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleLanguage {
    Css,
    Scss,
    Sass,
    Less,
}

impl StyleLanguage {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "css" => Some(StyleLanguage::Css),
            "scss" => Some(StyleLanguage::Scss),
            "sass" => Some(StyleLanguage::Sass),
            "less" => Some(StyleLanguage::Less),
            _ => None,
        }
    }

    /// Binary under `node_modules/.bin`, if a preprocessor is needed.
    fn preprocessor(self) -> Option<&'static str> {
        match self {
            StyleLanguage::Css => None,
            StyleLanguage::Scss | StyleLanguage::Sass => Some("sass"),
            StyleLanguage::Less => Some("lessc"),
        }
    }
}

/// `true` for stylesheet entries such as `theme.bundle.scss`.
pub fn is_bundle_stylesheet(path: &Path) -> bool {
    StyleLanguage::from_path(path).is_some()
        && path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(".bundle"))
}

/// Characters of the content hash kept in output names.
const HASH_LENGTH: usize = 8;

/// `pages/theme.bundle` + css -> `pages/theme.bundle.<hash>.css`
pub fn stylesheet_filename(name: &str, css: &str) -> String {
    let hash = blake3::hash(css.as_bytes()).to_hex();
    format!("{}.{}.css", name, &hash.as_str()[..HASH_LENGTH])
}

/// A compiled stylesheet entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStylesheet {
    /// Source file, absolute.
    pub entry: PathBuf,
    /// Output name relative to the output dir.
    pub filename: String,
    pub css: String,
}

impl CompiledStylesheet {
    pub fn to_output(&self) -> Output {
        Output::Asset(Arc::new(OutputAsset {
            names: vec![],
            original_file_names: vec![self.entry.to_string_lossy().into_owned()],
            filename: self.filename.clone().into(),
            source: self.css.clone().into(),
        }))
    }
}

/// Browsers the generated CSS is prefixed for.
fn default_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(80 << 16),
        edge: Some(80 << 16),
        firefox: Some(78 << 16),
        safari: Some(13 << 16),
        ios_saf: Some(13 << 16),
        ..Default::default()
    })
}

#[derive(Debug, Clone)]
pub struct StylesheetPlugin {
    bin_dir: PathBuf,
    minify: bool,
}

impl StylesheetPlugin {
    pub fn new(stack: &Path, minify: bool) -> Self {
        Self {
            bin_dir: stack.join("node_modules").join(".bin"),
            minify,
        }
    }

    /// Parse, prefix and print CSS.
    pub fn process_css(&self, path: &Path, source: &str) -> anyhow::Result<String> {
        let targets = default_targets();

        let mut stylesheet = StyleSheet::parse(
            source,
            ParserOptions {
                filename: path.to_string_lossy().to_string(),
                ..Default::default()
            },
        )
        .map_err(|e| anyhow!("Failed to parse CSS from {}: {}", path.display(), e))?;

        stylesheet
            .minify(MinifyOptions {
                targets,
                ..Default::default()
            })
            .map_err(|e| anyhow!("Failed to minify CSS from {}: {}", path.display(), e))?;

        let result = stylesheet
            .to_css(PrinterOptions {
                minify: self.minify,
                targets,
                ..Default::default()
            })
            .map_err(|e| anyhow!("Failed to print CSS from {}: {}", path.display(), e))?;

        Ok(result.code)
    }

    /// Compile a stylesheet entry into its hashed CSS output.
    pub async fn compile_entry(
        &self,
        stack: &Path,
        entry: &Path,
    ) -> anyhow::Result<CompiledStylesheet> {
        let language = StyleLanguage::from_path(entry)
            .ok_or_else(|| anyhow!("{} is not a stylesheet", entry.display()))?;

        let source = self.compile(entry, language).await?;
        let css = self.process_css(entry, &source)?;

        Ok(CompiledStylesheet {
            entry: entry.to_path_buf(),
            filename: stylesheet_filename(&entry_name(stack, entry), &css),
            css,
        })
    }

    async fn compile(&self, path: &Path, language: StyleLanguage) -> anyhow::Result<String> {
        let Some(binary) = language.preprocessor() else {
            return tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read stylesheet {}", path.display()));
        };

        let program = self.bin_dir.join(binary);
        let mut cmd = Command::new(&program);
        if binary == "sass" {
            cmd.arg("--no-source-map");
        }
        cmd.arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!("Running {} {}", program.display(), path.display());

        let output = timeout(Duration::from_secs(PREPROCESSOR_TIMEOUT_SECS), cmd.output())
            .await
            .map_err(|_| {
                anyhow!(
                    "{} timed out after {}s on {}",
                    binary,
                    PREPROCESSOR_TIMEOUT_SECS,
                    path.display()
                )
            })?
            .with_context(|| {
                format!(
                    "Failed to run {}. Is it installed in the stack's node_modules?",
                    program.display()
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} failed on {} (exit code {}):\n{}",
                binary,
                path.display(),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        String::from_utf8(output.stdout)
            .with_context(|| format!("{} produced invalid UTF-8 for {}", binary, path.display()))
    }
}

/// Module body exporting compiled CSS as a string.
pub fn css_text_module(css: &str) -> String {
    let quoted = serde_json::to_string(css).unwrap_or_else(|_| "\"\"".to_string());
    format!("export default {quoted};\n")
}

impl Plugin for StylesheetPlugin {
    fn name(&self) -> Cow<'static, str> {
        "stackpack-stylesheet".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Load
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let plugin = self.clone();

        async move {
            let path = PathBuf::from(&id);
            let Some(language) = StyleLanguage::from_path(&path) else {
                return Ok(None);
            };

            let source = plugin.compile(&path, language).await?;
            let css = plugin.process_css(&path, &source)?;

            Ok(Some(HookLoadOutput {
                code: css_text_module(&css).into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

impl StackPlugin for StylesheetPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Load
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            StyleLanguage::from_path(Path::new("a/b.scss")),
            Some(StyleLanguage::Scss)
        );
        assert_eq!(
            StyleLanguage::from_path(Path::new("a/b.LESS")),
            Some(StyleLanguage::Less)
        );
        assert_eq!(StyleLanguage::from_path(Path::new("a/b.styl")), None);
        assert_eq!(StyleLanguage::from_path(Path::new("a/b.js")), None);
    }

    #[test]
    fn test_is_bundle_stylesheet() {
        assert!(is_bundle_stylesheet(Path::new("/s/theme.bundle.scss")));
        assert!(!is_bundle_stylesheet(Path::new("/s/theme.scss")));
        assert!(!is_bundle_stylesheet(Path::new("/s/bundle.css")));
        assert!(!is_bundle_stylesheet(Path::new("/s/app.bundle.js")));
    }

    #[test]
    fn test_stylesheet_filename_is_content_hashed() {
        let a = stylesheet_filename("public/site.bundle", ".a{color:red}");
        let b = stylesheet_filename("public/site.bundle", ".a{color:#00f}");

        assert!(a.starts_with("public/site.bundle."), "{a}");
        assert!(a.ends_with(".css"), "{a}");
        assert_eq!(a.len(), "public/site.bundle.".len() + HASH_LENGTH + ".css".len());
        assert_ne!(a, b);
        assert_eq!(a, stylesheet_filename("public/site.bundle", ".a{color:red}"));
    }

    #[tokio::test]
    async fn test_compile_entry() {
        let temp = tempfile::TempDir::new().unwrap();
        let entry = temp.path().join("public/site.bundle.css");
        std::fs::create_dir_all(entry.parent().unwrap()).unwrap();
        std::fs::write(&entry, ".site {\n  color: #ff0000;\n}\n").unwrap();

        let plugin = StylesheetPlugin::new(temp.path(), true);
        let compiled = plugin.compile_entry(temp.path(), &entry).await.unwrap();

        assert_eq!(compiled.css, ".site{color:red}");
        assert_eq!(compiled.entry, entry);
        assert!(compiled.filename.starts_with("public/site.bundle."));
        assert!(compiled.filename.ends_with(".css"));
        assert_eq!(compiled.to_output().filename(), compiled.filename);
    }

    #[test]
    fn test_process_css_minifies() {
        let plugin = StylesheetPlugin::new(Path::new("/s"), true);
        let css = plugin
            .process_css(Path::new("a.css"), ".a {\n  color: #ff0000;\n}\n")
            .unwrap();
        assert_eq!(css, ".a{color:red}");
    }

    #[test]
    fn test_process_css_prefixes_for_targets() {
        let plugin = StylesheetPlugin::new(Path::new("/s"), true);
        let css = plugin
            .process_css(Path::new("a.css"), ".a { user-select: none; }")
            .unwrap();
        assert!(css.contains("-webkit-user-select:none"), "{css}");
    }

    #[test]
    fn test_css_text_module_escapes() {
        assert_eq!(
            css_text_module(".a{content:\"x\"}"),
            "export default \".a{content:\\\"x\\\"}\";\n"
        );
    }

    #[tokio::test]
    async fn test_missing_preprocessor_errors() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("a.scss");
        std::fs::write(&file, "$c: red; .a { color: $c; }").unwrap();

        let plugin = StylesheetPlugin::new(temp.path(), false);
        let err = plugin.compile(&file, StyleLanguage::Scss).await.unwrap_err();
        assert!(err.to_string().contains("sass"));
    }
}
