//! Build execution.
//!
//! A build runs the same steps every time, whether it is a one-off
//! `bundle` or a `watch` rebuild:
//!
//! 1. read the manifest and discover entries
//! 2. empty the output directory
//! 3. copy distributed third-party files
//! 4. compile stylesheet entries
//! 5. assemble the engine configuration for the script entries
//! 6. generate and write the bundle

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rolldown::{BundleOutput, BundlerBuilder as RolldownBundlerBuilder};
use rolldown_common::Output;
use serde::{Deserialize, Serialize};

use crate::analysis::{BundleAnalysis, analyze};
use crate::diagnostics::{self, DiagnosticKind, DiagnosticSeverity, ExtractedDiagnostic};
use crate::discovery::discover_entries;
use crate::distribute::{CopyReport, DistributionPlan};
use crate::engine::{EngineConfig, stylesheet_pairs};
use crate::manifest::StackManifest;
use crate::options::BundleOptions;
use crate::output::{empty_dir, write_bundle};
use crate::plugins::BundleMapPlugin;
use crate::plugins::stylesheet::{CompiledStylesheet, StylesheetPlugin, is_bundle_stylesheet};
use crate::{Error, Result};

/// A single error or warning, flattened for display and for the reload payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl BuildMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file: None,
            line: None,
            column: None,
        }
    }
}

impl From<&ExtractedDiagnostic> for BuildMessage {
    fn from(diag: &ExtractedDiagnostic) -> Self {
        Self {
            text: diag.message.clone(),
            file: diag.file.clone(),
            line: diag.line,
            column: diag.column,
        }
    }
}

/// What a successful build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub out_dir: PathBuf,
    /// Entry points, sorted.
    pub entries: Vec<PathBuf>,
    /// Chunks and assets from the engine, then the compiled stylesheet entries.
    pub outputs: Vec<Output>,
    /// Files written below `out_dir`.
    pub written: Vec<PathBuf>,
    pub copies: CopyReport,
    pub warnings: Vec<BuildMessage>,
    pub duration: Duration,
    /// Size breakdown, collected when [`BundleOptions::analyze`] is set.
    pub analysis: Option<BundleAnalysis>,
}

/// Success flag plus messages; what the live-reload clients are told.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub success: bool,
    pub errors: Vec<BuildMessage>,
    pub warnings: Vec<BuildMessage>,
}

impl BuildOutcome {
    pub fn from_result(result: &Result<BuildReport>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                errors: Vec::new(),
                warnings: report.warnings.clone(),
            },
            Err(Error::Bundler(diagnostics)) => {
                let (errors, warnings): (Vec<_>, Vec<_>) = diagnostics
                    .iter()
                    .partition(|d| d.severity == DiagnosticSeverity::Error);
                Self {
                    success: false,
                    errors: errors.into_iter().map(BuildMessage::from).collect(),
                    warnings: warnings.into_iter().map(BuildMessage::from).collect(),
                }
            }
            Err(err) => Self {
                success: false,
                errors: vec![BuildMessage::new(err.to_string())],
                warnings: Vec::new(),
            },
        }
    }
}

/// Bundles one stack.
#[derive(Debug, Clone)]
pub struct StackBundler {
    options: BundleOptions,
}

impl StackBundler {
    pub fn new(options: BundleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BundleOptions {
        &self.options
    }

    /// Run a full build.
    pub async fn bundle(&self) -> Result<BuildReport> {
        self.run().await
    }

    /// Build again after a change. Manifest and entries are re-read, so new
    /// entry files and dependency changes are picked up.
    pub async fn rebuild(&self) -> Result<BuildReport> {
        tracing::debug!("Rebuilding {}", self.options.stack_path.display());
        self.run().await
    }

    async fn run(&self) -> Result<BuildReport> {
        let started = Instant::now();
        let stack = self.options.stack();

        if !stack.is_dir() {
            return Err(Error::StackNotFound(stack.to_path_buf()));
        }

        let manifest = StackManifest::load(stack)?;
        let entries = discover_entries(stack)?;
        let out_dir = self.options.out_dir();

        tracing::info!("- Building: {} {}", self.options.format, out_dir.display());
        tracing::debug!("Found {} entries", entries.len());

        empty_dir(&out_dir)?;

        let plan =
            DistributionPlan::from_manifest(&manifest, stack, &out_dir, &self.options.external_map);
        let copies = plan.copy_all();

        let mut warnings: Vec<BuildMessage> = copies
            .failed
            .iter()
            .map(|(job, reason)| {
                BuildMessage::new(format!("Failed to copy {}: {}", job.from.display(), reason))
            })
            .collect();

        if entries.is_empty() {
            tracing::warn!("No bundle entries found in {}", stack.display());
            return Ok(BuildReport {
                out_dir,
                entries,
                outputs: Vec::new(),
                written: Vec::new(),
                copies,
                warnings,
                duration: started.elapsed(),
                analysis: None,
            });
        }

        let (stylesheet_entries, scripts): (Vec<PathBuf>, Vec<PathBuf>) = entries
            .iter()
            .cloned()
            .partition(|entry| is_bundle_stylesheet(entry));

        let stylesheets = self.compile_stylesheets(stack, &stylesheet_entries).await?;

        let mut bundle = if scripts.is_empty() {
            // Nothing for the engine; the map still lists the stylesheets.
            let map = BundleMapPlugin::new(stack, manifest.stack_name(stack))
                .with_stylesheets(stylesheet_pairs(&stylesheets))
                .map_asset(&[])
                .map_err(|e| plugin_error(None, &e))?;
            BundleOutput {
                assets: vec![map],
                warnings: Vec::new(),
            }
        } else {
            let EngineConfig { options, plugins } =
                EngineConfig::assemble(&self.options, &manifest, &scripts, &stylesheets, &plan)?;

            let mut bundler = RolldownBundlerBuilder::default()
                .with_options(options)
                .with_plugins(plugins.into_rolldown_plugins())
                .build()
                .map_err(|e| Error::from_rolldown_batch(&e))?;

            bundler
                .generate()
                .await
                .map_err(|e| Error::from_rolldown_batch(&e))?
        };

        for warning in &bundle.warnings {
            for mut diag in diagnostics::extract_from_rolldown_error(warning) {
                diag.severity = DiagnosticSeverity::Warning;
                tracing::warn!("{}", diag.message);
                warnings.push(BuildMessage::from(&diag));
            }
        }

        bundle
            .assets
            .extend(stylesheets.iter().map(CompiledStylesheet::to_output));

        let written = write_bundle(&bundle, &out_dir)?;

        let mut report = BuildReport {
            out_dir,
            entries,
            outputs: bundle.assets,
            written,
            copies,
            warnings,
            duration: started.elapsed(),
            analysis: None,
        };
        if self.options.analyze {
            report.analysis = Some(analyze(&report));
        }

        Ok(report)
    }

    /// Compile every stylesheet entry. All failures are reported together.
    async fn compile_stylesheets(
        &self,
        stack: &Path,
        entries: &[PathBuf],
    ) -> Result<Vec<CompiledStylesheet>> {
        let compiler = StylesheetPlugin::new(stack, self.options.effective_minify());
        let mut compiled = Vec::with_capacity(entries.len());
        let mut failures = Vec::new();

        for entry in entries {
            match compiler.compile_entry(stack, entry).await {
                Ok(stylesheet) => compiled.push(stylesheet),
                Err(e) => failures.push(plugin_diagnostic(Some(entry), &e)),
            }
        }

        if failures.is_empty() {
            Ok(compiled)
        } else {
            Err(Error::Bundler(failures))
        }
    }
}

fn plugin_diagnostic(file: Option<&Path>, err: &anyhow::Error) -> ExtractedDiagnostic {
    let mut diag = ExtractedDiagnostic::error(DiagnosticKind::Plugin, format!("{err:#}"));
    diag.file = file.map(|f| f.to_string_lossy().into_owned());
    diag
}

fn plugin_error(file: Option<&Path>, err: &anyhow::Error) -> Error {
    Error::Bundler(vec![plugin_diagnostic(file, err)])
}
