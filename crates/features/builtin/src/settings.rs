//! Typed reads over a feature's merged config map.

use stencil_composer::ProviderError;
use stencil_composer::domain::ConfigMap;

pub(crate) fn text(config: &ConfigMap, key: &str, default: &str) -> Result<String, ProviderError> {
    match config.get(key) {
        None => Ok(default.to_owned()),
        Some(value) => value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::invalid_config(format!("'{key}' must be a string"))),
    }
}

pub(crate) fn number(config: &ConfigMap, key: &str, default: u64) -> Result<u64, ProviderError> {
    match config.get(key) {
        None => Ok(default),
        Some(value) => value.as_u64().ok_or_else(|| {
            ProviderError::invalid_config(format!("'{key}' must be a non-negative integer"))
        }),
    }
}

pub(crate) fn flag(config: &ConfigMap, key: &str, default: bool) -> Result<bool, ProviderError> {
    match config.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| ProviderError::invalid_config(format!("'{key}' must be a boolean"))),
    }
}

/// Rejects values that would split a generated line-oriented file (`.env`, Dockerfile).
pub(crate) fn single_line(key: &str, value: &str) -> Result<(), ProviderError> {
    if value.contains(char::is_control) {
        return Err(ProviderError::invalid_config(format!(
            "'{key}' must not contain control characters"
        )));
    }
    Ok(())
}

/// Crate-safe identifier derived from the project name (`Order Service` -> `order_service`).
///
/// Names that would start with a digit get an `app_` prefix.
pub(crate) fn crate_name(project: &str) -> String {
    let name: String = project
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    match name.chars().next() {
        None => "app".to_owned(),
        Some(first) if first.is_ascii_digit() => format!("app_{name}"),
        Some(_) => name,
    }
}
