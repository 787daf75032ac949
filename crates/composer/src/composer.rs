use crate::builder::ComposerBuilder;
use crate::catalog::Catalog;
use crate::error::ComposerError;
use crate::feature::Feature;
use crate::generator::Generator;
use crate::resolver::Resolver;
use crate::validator::validate;
use serde_json::json;
use std::sync::Arc;
use stencil_domain::composition::{CompositionRequest, CompositionResult};
use tracing::{info, instrument, warn};

/// A failed composition together with everything gathered before the failure.
#[derive(Debug, thiserror::Error)]
#[error("Composition failed: {error}")]
pub struct ComposeFailure {
    #[source]
    error: ComposerError,
    report: Box<CompositionResult>,
}

impl ComposeFailure {
    fn new(error: ComposerError, report: CompositionResult) -> Self {
        Self { error, report: Box::new(report) }
    }

    #[must_use]
    pub const fn error(&self) -> &ComposerError {
        &self.error
    }

    /// Partial result: warnings, conflicts and resolved ids collected so far. Never has a bundle.
    #[must_use]
    pub fn report(&self) -> &CompositionResult {
        &self.report
    }

    #[must_use]
    pub fn into_parts(self) -> (ComposerError, CompositionResult) {
        (self.error, *self.report)
    }
}

/// Entry point of the engine: resolve, validate, then generate.
///
/// Cheap to clone; the catalog is shared and never mutated, so concurrent
/// [`Composer::compose`] calls are independent.
#[derive(Debug, Clone)]
pub struct Composer {
    catalog: Arc<Catalog>,
    generator: Generator,
}

impl Composer {
    #[must_use = "The composer is not usable until you call .build()"]
    pub fn builder() -> ComposerBuilder {
        ComposerBuilder::new()
    }

    /// A composer over `catalog` with the default configuration.
    #[must_use]
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self::builder().catalog(catalog).build()
    }

    pub(crate) const fn from_parts(catalog: Arc<Catalog>, generator: Generator) -> Self {
        Self { catalog, generator }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs one composition.
    ///
    /// Sequence:
    /// 1. **Resolve** the requested ids into dependency order.
    /// 2. **Validate** the resolved set against the profile.
    /// 3. Stop with [`ComposerError::CompositionConflict`] if conflicts exist and
    ///    `fail_on_conflicts` is set; no provider is invoked.
    /// 4. Stop successfully without a bundle on `dry_run`.
    /// 5. **Generate** and merge the bundle.
    ///
    /// # Errors
    /// A [`ComposeFailure`] carrying the [`ComposerError`] and the partial report.
    #[instrument(
        skip_all,
        fields(project = %request.profile.name, requested = request.features.len())
    )]
    pub async fn compose(
        &self,
        request: &CompositionRequest,
    ) -> Result<CompositionResult, ComposeFailure> {
        info!(dry_run = request.options.dry_run, "Composition started");

        let mut report = CompositionResult::default();
        report.metadata.insert("project".to_owned(), json!(request.profile.name));
        report.metadata.insert("tier".to_owned(), json!(request.profile.tier));
        report.metadata.insert("dryRun".to_owned(), json!(request.options.dry_run));

        let mut resolver = Resolver::new(&self.catalog, &request.options);
        let resolved = resolver.resolve(&request.features);
        report.warnings = resolver.take_warnings();
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(error) => return Err(fail(error, report)),
        };

        report.resolved_features = resolved.iter().map(|f| f.id().to_owned()).collect();
        report.dependency_edges = resolved
            .iter()
            .map(|f| (f.id().to_owned(), f.dependencies().to_vec()))
            .collect();
        report.metadata.insert("featureCount".to_owned(), json!(resolved.len()));

        let validation = validate(&resolved, &request.profile);
        report.conflicts = validation.conflicts;
        report.warnings.extend(validation.warnings);
        warn_unused_overrides(request, &resolved, &mut report.warnings);

        if request.options.fail_on_conflicts && report.has_conflicts() {
            let pairs = report
                .conflicts
                .iter()
                .map(|c| format!("{} / {} ({})", c.feature_a, c.feature_b, c.kind))
                .collect::<Vec<_>>()
                .join(", ");
            let error = ComposerError::CompositionConflict {
                count: report.conflicts.len(),
                context: Some(pairs.into()),
            };
            return Err(fail(error, report));
        }

        if request.options.dry_run {
            info!(features = resolved.len(), "Dry run finished");
            return Ok(report);
        }

        let bundle = match self
            .generator
            .generate(&resolved, &request.profile, &request.feature_config)
            .await
        {
            Ok(bundle) => bundle,
            Err(error) => return Err(fail(error, report)),
        };

        report.post_actions.clone_from(&bundle.post_actions);
        info!(
            features = resolved.len(),
            files = bundle.files.len(),
            post_actions = bundle.post_actions.len(),
            conflicts = report.conflicts.len(),
            "Composition finished"
        );
        report.bundle = Some(bundle);

        Ok(report)
    }
}

fn fail(error: ComposerError, report: CompositionResult) -> ComposeFailure {
    warn!(%error, "Composition aborted");
    ComposeFailure::new(error, report)
}

fn warn_unused_overrides(
    request: &CompositionRequest,
    resolved: &[Arc<Feature>],
    warnings: &mut Vec<String>,
) {
    for id in request.feature_config.keys() {
        if !resolved.iter().any(|f| f.id() == id) {
            let message =
                format!("Configuration supplied for '{id}', which is not part of the composition");
            warn!("{message}");
            warnings.push(message);
        }
    }
}
