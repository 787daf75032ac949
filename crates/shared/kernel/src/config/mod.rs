use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use stencil_domain::config::ComposerConfig;
use tracing::info;

/// Prefix of environment overrides (`STENCIL__PROVIDER_TIMEOUT_MS=500`).
const ENV_PREFIX: &str = "STENCIL";
const DEFAULT_FILE: &str = "stencil";

/// Custom error type for config loading.
#[stencil_derive::stencil_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file with environment overrides on top.
///
/// Layering:
/// 1. **Base file**: `path` (any format the `config` crate recognizes by extension),
///    defaulting to `stencil` in the working directory. The file is required.
/// 2. **Environment**: variables prefixed with `STENCIL__`, nested keys separated by `__`
///    (e.g. `STENCIL__PROVIDER_TIMEOUT_MS` maps to `provider_timeout_ms`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or unreadable, or the merged
/// values do not deserialize into `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads the [`ComposerConfig`]; missing keys fall back to their defaults.
///
/// # Errors
/// See [`load_config`].
pub fn load_composer_config(path: Option<impl AsRef<Path>>) -> Result<ComposerConfig, ConfigError> {
    load_config(path)
}
