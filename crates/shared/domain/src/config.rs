use serde::Deserialize;
use std::time::Duration;

/// Tunables of the composer, usually loaded from `stencil.toml` plus `STENCIL__*` env overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Upper bound for a single artifact provider call.
    pub provider_timeout_ms: u64,
    /// Maximum number of providers running at once; `0` means one task per feature.
    pub max_concurrency: usize,
}

impl ComposerConfig {
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self { provider_timeout_ms: 30_000, max_concurrency: 0 }
    }
}
