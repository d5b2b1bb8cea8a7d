use crate::cli::validation::validate_identifier;
use crate::config::StackpackConfig;
use crate::error::{ConfigError, Result};

/// Validate a browser global follows JavaScript identifier rules.
pub fn validate_global_name(package: &str, name: &str) -> Result<()> {
    validate_identifier(name).map_err(|hint| {
        ConfigError::InvalidValue {
            field: format!("globals.{}", package),
            value: name.to_string(),
            hint,
        }
        .into()
    })
}

impl StackpackConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "Choose a port between 1 and 65535".to_string(),
            }
            .into());
        }

        for (package, global) in &self.globals {
            validate_global_name(package, global)?;
        }

        Ok(())
    }
}
