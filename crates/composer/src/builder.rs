use crate::catalog::Catalog;
use crate::composer::Composer;
use crate::generator::Generator;
use private::Sealed;
use std::sync::Arc;
use std::time::Duration;
use stencil_domain::config::ComposerConfig;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoCatalog;
#[derive(Debug)]
pub struct WithCatalog(Arc<Catalog>);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoCatalog {}
impl Sealed for WithCatalog {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct ComposerBuilder<S: Sealed = NoCatalog> {
    state: S,
    config: ComposerConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> ComposerBuilder<S> {
    #[must_use = "Replaces the whole composer configuration"]
    pub fn config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "Sets the per-call provider timeout"]
    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.config.provider_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use = "Bounds the number of providers running at once (0 = unbounded)"]
    pub const fn max_concurrency(mut self, limit: usize) -> Self {
        self.config.max_concurrency = limit;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> ComposerBuilder<N> {
        ComposerBuilder { state, config: self.config }
    }
}

impl ComposerBuilder<NoCatalog> {
    #[must_use = "Creates a new composer builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the feature catalog the composer resolves against"]
    pub fn catalog(self, catalog: impl Into<Arc<Catalog>>) -> ComposerBuilder<WithCatalog> {
        self.transition(WithCatalog(catalog.into()))
    }
}

impl ComposerBuilder<WithCatalog> {
    /// Finishes the composer. The catalog is read-only from here on.
    #[must_use]
    pub fn build(self) -> Composer {
        let catalog = self.state.0;
        info!(
            features = catalog.len(),
            provider_timeout_ms = self.config.provider_timeout_ms,
            max_concurrency = self.config.max_concurrency,
            "Composer ready"
        );
        Composer::from_parts(catalog, Generator::new(&self.config))
    }
}
