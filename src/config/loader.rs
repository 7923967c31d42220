//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RuntimeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: '{value}' is not a whole number of seconds")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RuntimeConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `FUNCTION_TIMEOUT`, `CONNECTION_TIMEOUT` and `READ_TIMEOUT`.
pub fn apply_env_overrides<F>(mut config: RuntimeConfig, lookup: F) -> Result<RuntimeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = &mut config.settings;
    for (name, slot) in [
        ("FUNCTION_TIMEOUT", &mut settings.function_timeout_secs),
        ("CONNECTION_TIMEOUT", &mut settings.connection_timeout_secs),
        ("READ_TIMEOUT", &mut settings.read_timeout_secs),
    ] {
        if let Some(value) = lookup(name) {
            let parsed: Option<u64> = value.trim().parse().ok();
            *slot = parsed.ok_or(ConfigError::Env { name, value })?;
        }
    }
    Ok(config)
}
