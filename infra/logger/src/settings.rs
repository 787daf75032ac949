use crate::LoggerError;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;

/// Console output format.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ConsoleFormat {
    #[default]
    Compact,
    Pretty,
    Json,
    Off,
}

/// Serializable stand-in for [`Rotation`].
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RotationPolicy {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationPolicy> for Rotation {
    fn from(policy: RotationPolicy) -> Self {
        match policy {
            RotationPolicy::Minutely => Self::MINUTELY,
            RotationPolicy::Hourly => Self::HOURLY,
            RotationPolicy::Daily => Self::DAILY,
            RotationPolicy::Never => Self::NEVER,
        }
    }
}

/// Logging section of a host configuration file.
///
/// ```toml
/// [logging]
/// name = "stencil"
/// level = "debug"
/// console = "pretty"
/// directory = "logs"
/// span_timings = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub name: String,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    pub console: ConsoleFormat,
    /// Directory for rolling files; no files are written when absent.
    pub directory: Option<PathBuf>,
    pub rotation: RotationPolicy,
    pub max_files: usize,
    pub json_files: bool,
    /// Explicit filter directives; replaces `RUST_LOG` when set.
    pub filter: Option<String>,
    pub span_timings: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            name: "stencil".to_owned(),
            level: "info".to_owned(),
            console: ConsoleFormat::Compact,
            directory: None,
            rotation: RotationPolicy::Daily,
            max_files: crate::DEFAULT_MAX_FILES,
            json_files: false,
            filter: None,
            span_timings: false,
        }
    }
}

impl LogSettings {
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an unknown level name.
    pub fn level_filter(&self) -> Result<LevelFilter, LoggerError> {
        LevelFilter::from_str(&self.level).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid level '{}': {e}", self.level).into(),
            context: Some("Reading log settings".into()),
        })
    }
}
