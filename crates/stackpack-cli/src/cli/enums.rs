use clap::ValueEnum;
use stackpack_bundler::OutputFormat;

/// Output format for bundled code
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum Format {
    /// ECMAScript modules (import/export syntax)
    ///
    /// Bare imports of the stack's dependencies are rewritten to CDN URLs.
    #[value(name = "esm")]
    Esm,

    /// CommonJS modules (require/module.exports)
    #[value(name = "cjs")]
    Cjs,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Esm => OutputFormat::Esm,
            Format::Cjs => OutputFormat::Cjs,
        }
    }
}
