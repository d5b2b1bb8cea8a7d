use crate::config::{CONFIG_FILE, ConfigOverrides, StackpackConfig};
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use std::path::Path;

/// Keys read from `STACKPACK_*` variables, e.g. `STACKPACK_DEBOUNCE_MS`.
const ENV_KEYS: &[&str] = &[
    "format",
    "minify",
    "production",
    "analyze",
    "port",
    "keep_clients",
    "debounce_ms",
    "toolchain_dir",
];

impl StackpackConfig {
    /// Load and validate the configuration for `stack`.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(stack: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let config: Self = Self::figment(stack, overrides)
            .extract()
            .map_err(|e| ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {} syntax and field types", CONFIG_FILE),
            })?;

        config.validate()?;
        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn figment(stack: &Path, overrides: &ConfigOverrides) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = stack.join(CONFIG_FILE);
        if config_file.is_file() {
            tracing::debug!("Reading {}", config_file.display());
            figment = figment.merge(Toml::file(config_file));
        }

        figment
            .merge(Env::prefixed("STACKPACK_").only(ENV_KEYS))
            .merge(Serialized::defaults(overrides))
    }
}
