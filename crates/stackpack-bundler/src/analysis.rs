//! Output size breakdown, printed by `bundle --analyze`.

use std::fmt::Write as _;

use console::style;
use rolldown_common::Output;
use serde::Serialize;

use crate::builder::BuildReport;

/// One module's contribution to a chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleShare {
    pub id: String,
    /// Rendered size in bytes.
    pub size: usize,
    /// Share of the chunk's module bytes, 0-100.
    pub percent: f64,
}

/// One emitted file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputStats {
    pub filename: String,
    pub size: usize,
    pub is_entry: bool,
    /// Contributing modules, largest first. Empty for assets.
    pub modules: Vec<ModuleShare>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BundleAnalysis {
    /// Outputs, largest first.
    pub outputs: Vec<OutputStats>,
}

/// Break a build's outputs down by size.
pub fn analyze(report: &BuildReport) -> BundleAnalysis {
    let mut outputs: Vec<OutputStats> = report
        .outputs
        .iter()
        .map(|output| match output {
            Output::Chunk(chunk) => {
                let sizes: Vec<(String, usize)> = chunk
                    .modules
                    .keys
                    .iter()
                    .zip(chunk.modules.values.iter())
                    .map(|(id, module)| {
                        (id.to_string(), module.code().map(|c| c.len()).unwrap_or(0))
                    })
                    .collect();
                OutputStats {
                    filename: chunk.filename.to_string(),
                    size: chunk.code.len(),
                    is_entry: chunk.is_entry,
                    modules: shares(sizes),
                }
            }
            Output::Asset(asset) => OutputStats {
                filename: asset.filename.to_string(),
                size: asset.source.as_bytes().len(),
                is_entry: false,
                modules: Vec::new(),
            },
        })
        .collect();

    outputs.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.filename.cmp(&b.filename)));
    BundleAnalysis { outputs }
}

fn shares(sizes: Vec<(String, usize)>) -> Vec<ModuleShare> {
    let total: usize = sizes.iter().map(|(_, size)| size).sum();
    let mut modules: Vec<ModuleShare> = sizes
        .into_iter()
        .map(|(id, size)| ModuleShare {
            percent: if total == 0 {
                0.0
            } else {
                size as f64 * 100.0 / total as f64
            },
            id,
            size,
        })
        .collect();
    modules.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.id.cmp(&b.id)));
    modules
}

/// `1536` -> `1.50 KB`
pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.2} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}

impl BundleAnalysis {
    pub fn total_size(&self) -> usize {
        self.outputs.iter().map(|o| o.size).sum()
    }

    /// Human-readable report. Source maps are listed without a module breakdown.
    pub fn render(&self, color: bool) -> String {
        let mut out = String::new();

        for output in &self.outputs {
            let name = style(&output.filename).force_styling(color);
            let name = if output.is_entry { name.bold().cyan() } else { name.bold() };
            let _ = writeln!(
                out,
                "{}  {}",
                name,
                style(format_bytes(output.size)).force_styling(color).dim()
            );

            for module in &output.modules {
                let _ = writeln!(
                    out,
                    "    {:>10}  {:>5.1}%  {}",
                    format_bytes(module.size),
                    module.percent,
                    module.id
                );
            }
        }

        let _ = writeln!(
            out,
            "{} files, {} total",
            self.outputs.len(),
            style(format_bytes(self.total_size()))
                .force_styling(color)
                .bold()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_sorted_and_sum_to_100() {
        let modules = shares(vec![
            ("a.js".to_string(), 25),
            ("b.js".to_string(), 75),
            ("c.js".to_string(), 0),
        ]);
        assert_eq!(modules[0].id, "b.js");
        assert_eq!(modules[0].percent, 75.0);
        assert_eq!(modules[2].id, "c.js");
        let total: f64 = modules.iter().map(|m| m.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_shares_empty_chunk() {
        let modules = shares(vec![("a.js".to_string(), 0)]);
        assert_eq!(modules[0].percent, 0.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.00 MB");
    }

    #[test]
    fn test_render_plain() {
        let analysis = BundleAnalysis {
            outputs: vec![OutputStats {
                filename: "app.bundle.1a.js".to_string(),
                size: 2048,
                is_entry: true,
                modules: vec![ModuleShare {
                    id: "/s/app.bundle.js".to_string(),
                    size: 1024,
                    percent: 100.0,
                }],
            }],
        };

        let text = analysis.render(false);
        assert!(text.contains("app.bundle.1a.js  2.00 KB"));
        assert!(text.contains("100.0%  /s/app.bundle.js"));
        assert!(text.ends_with("1 files, 2.00 KB total\n"));
        assert!(!text.contains('\u{1b}'));
    }
}
