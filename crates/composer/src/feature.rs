use crate::error::ComposerError;
use crate::provider::ArtifactProvider;
use std::fmt;
use std::sync::Arc;
use stencil_domain::ConfigMap;
use stencil_domain::feature::{FeatureKind, Tier, TierRange};
use typed_builder::TypedBuilder;

/// An immutable feature descriptor.
///
/// Built once with [`Feature::builder`], registered in a [`crate::Catalog`] and only read
/// afterwards.
///
/// ```
/// use stencil_composer::{Feature, ProviderError};
/// use stencil_composer::domain::ConfigMap;
/// use stencil_composer::domain::feature::{FeatureArtifacts, FeatureKind, ProjectProfile};
///
/// fn rest_api(_: &ProjectProfile, _: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
///     Ok(FeatureArtifacts::new().file("src/api.rs", "// routes"))
/// }
///
/// let feature = Feature::builder()
///     .id("api-rest")
///     .name("REST API")
///     .kind(FeatureKind::Api)
///     .dependencies(["health-basic"])
///     .provider(rest_api)
///     .build();
///
/// assert_eq!(feature.dependencies(), ["health-basic"]);
/// ```
#[derive(Clone, TypedBuilder)]
pub struct Feature {
    #[builder(setter(into))]
    id: String,
    #[builder(setter(into))]
    name: String,
    #[builder(default, setter(into))]
    description: String,
    #[builder(default = "0.1.0".to_owned(), setter(into))]
    version: String,
    kind: FeatureKind,
    #[builder(default, setter(strip_option, into))]
    category: Option<String>,
    #[builder(default, setter(transform = |ids: impl IntoIterator<Item = impl Into<String>>| {
        ids.into_iter().map(Into::into).collect()
    }))]
    dependencies: Vec<String>,
    #[builder(default, setter(transform = |ids: impl IntoIterator<Item = impl Into<String>>| {
        ids.into_iter().map(Into::into).collect()
    }))]
    optional_dependencies: Vec<String>,
    #[builder(default, setter(transform = |ids: impl IntoIterator<Item = impl Into<String>>| {
        ids.into_iter().map(Into::into).collect()
    }))]
    conflicts: Vec<String>,
    #[builder(default, setter(strip_option))]
    min_tier: Option<Tier>,
    #[builder(default, setter(strip_option))]
    max_tier: Option<Tier>,
    #[builder(default)]
    priority: i32,
    #[builder(default)]
    default_config: ConfigMap,
    #[builder(default, setter(transform = |provider: impl ArtifactProvider| {
        Some(Arc::new(provider) as Arc<dyn ArtifactProvider>)
    }))]
    provider: Option<Arc<dyn ArtifactProvider>>,
}

impl Feature {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub const fn kind(&self) -> FeatureKind {
        self.kind
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Hard dependencies, in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    #[must_use]
    pub fn optional_dependencies(&self) -> &[String] {
        &self.optional_dependencies
    }

    /// Ids declared incompatible by this feature. See [`Feature::conflicts_with`] for
    /// the symmetric check.
    #[must_use]
    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    /// Returns `true` if either side declares the other as a conflict.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.conflicts.iter().any(|id| *id == other.id)
            || other.conflicts.iter().any(|id| *id == self.id)
    }

    #[must_use]
    pub const fn tier_range(&self) -> TierRange {
        TierRange::new(self.min_tier, self.max_tier)
    }

    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub const fn default_config(&self) -> &ConfigMap {
        &self.default_config
    }

    #[must_use]
    pub fn provider(&self) -> Option<&Arc<dyn ArtifactProvider>> {
        self.provider.as_ref()
    }

    /// Structural checks run at registration, followed by de-duplication of id lists.
    pub(crate) fn normalized(mut self) -> Result<Self, ComposerError> {
        if self.id.trim().is_empty() {
            return Err(invalid(format!("feature '{}' has an empty id", self.name)));
        }
        if self.provider.is_none() {
            return Err(invalid(format!("feature '{}' has no artifact provider", self.id)));
        }
        if !self.tier_range().is_well_formed() {
            return Err(invalid(format!("feature '{}' has min tier above max tier", self.id)));
        }

        dedup_in_place(&mut self.dependencies);
        dedup_in_place(&mut self.optional_dependencies);
        dedup_in_place(&mut self.conflicts);

        if self.dependencies.contains(&self.id) || self.optional_dependencies.contains(&self.id) {
            return Err(invalid(format!("feature '{}' depends on itself", self.id)));
        }
        if self.conflicts.contains(&self.id) {
            return Err(invalid(format!("feature '{}' conflicts with itself", self.id)));
        }
        if let Some(both) = self.dependencies.iter().find(|dep| self.conflicts.contains(dep)) {
            return Err(invalid(format!(
                "feature '{}' both depends on and conflicts with '{both}'",
                self.id
            )));
        }

        Ok(self)
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("version", &self.version)
            .field("dependencies", &self.dependencies)
            .field("conflicts", &self.conflicts)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

fn invalid(message: String) -> ComposerError {
    ComposerError::InvalidFeature {
        message: message.into(),
        context: Some("Registering feature".into()),
    }
}

/// Keeps the first occurrence of every id.
fn dedup_in_place(ids: &mut Vec<String>) {
    let mut seen = fxhash::FxHashSet::default();
    ids.retain(|id| seen.insert(id.clone()));
}
