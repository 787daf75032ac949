//! Facade crate for the composition engine.
//! Re-exports domain/kernel primitives and the engine, and wires the stock features.
//! Keep this crate thin: it should compose other crates, not implement logic.
//!
//! ## Usage
//! - Add `stencil` with the desired feature flags (`builtin`, `logger`).
//! - Call [`init`] to get a composer over the stock catalog configured from `stencil.toml`.

pub use stencil_composer as composer;
pub use stencil_domain as domain;
pub use stencil_kernel as kernel;
#[cfg(feature = "logger")]
pub use stencil_logger as logger;

pub use stencil_composer::{Catalog, ComposeFailure, Composer, ComposerError, Feature};

/// Compile-time feature flags, for runtime introspection.
pub mod features {
    #[cfg(feature = "builtin")]
    pub use stencil_builtin as builtin;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "builtin")]
        "builtin",
        #[cfg(feature = "logger")]
        "logger",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Failure of [`init`].
#[stencil_derive::stencil_error]
pub enum InitError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: kernel::config::ConfigError, context: Option<std::borrow::Cow<'static, str>> },

    #[error("Catalog error{}: {source}", format_context(.context))]
    Catalog { source: ComposerError, context: Option<std::borrow::Cow<'static, str>> },
}

/// Builds a composer from the config file at `path` (plus `STENCIL__*` overrides).
///
/// With the `builtin` feature the catalog starts with the stock features, otherwise
/// it is empty and `extra` is all there is.
///
/// # Errors
/// Returns an error if the config cannot be loaded or a feature fails registration.
pub fn init(
    path: Option<impl AsRef<std::path::Path>>,
    extra: impl IntoIterator<Item = Feature>,
) -> Result<Composer, InitError> {
    let config = kernel::config::load_composer_config(path).context("Loading composer config")?;

    let mut catalog = Catalog::new();
    #[cfg(feature = "builtin")]
    features::builtin::register_builtin(&mut catalog).context("Registering builtin features")?;
    catalog.register_all(extra).context("Registering extra features")?;

    Ok(Composer::builder().catalog(catalog).config(config).build())
}
