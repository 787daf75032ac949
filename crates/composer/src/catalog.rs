use crate::error::ComposerError;
use crate::feature::Feature;
use fxhash::FxHashMap;
use std::cmp::Reverse;
use std::sync::Arc;
use stencil_domain::feature::FeatureKind;
use tracing::debug;

/// Append-only registry of feature descriptors.
///
/// Filled once at startup, then shared read-only (usually as `Arc<Catalog>`).
/// Listings are ordered by descending priority, then ascending id.
#[derive(Debug, Default)]
pub struct Catalog {
    features: FxHashMap<String, Arc<Feature>>,
    by_kind: FxHashMap<FeatureKind, Vec<String>>,
    by_category: FxHashMap<String, Vec<String>>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a feature.
    ///
    /// # Errors
    /// [`ComposerError::DuplicateFeature`] when the id is taken, [`ComposerError::InvalidFeature`]
    /// when the descriptor fails its structural checks.
    pub fn register(&mut self, feature: Feature) -> Result<(), ComposerError> {
        let feature = feature.normalized()?;
        let id = feature.id().to_owned();

        if self.features.contains_key(&id) {
            return Err(ComposerError::DuplicateFeature {
                message: format!("feature '{id}' is already registered").into(),
                context: Some("Registering feature".into()),
            });
        }

        self.by_kind.entry(feature.kind()).or_default().push(id.clone());
        if let Some(category) = feature.category() {
            self.by_category.entry(category.to_owned()).or_default().push(id.clone());
        }

        debug!(feature = %id, kind = %feature.kind(), "Feature registered");
        self.features.insert(id, Arc::new(feature));
        Ok(())
    }

    /// Registers every feature, stopping at the first failure.
    ///
    /// # Errors
    /// See [`Catalog::register`].
    pub fn register_all(
        &mut self,
        features: impl IntoIterator<Item = Feature>,
    ) -> Result<(), ComposerError> {
        features.into_iter().try_for_each(|feature| self.register(feature))
    }

    /// # Errors
    /// [`ComposerError::FeatureNotFound`] if `id` is not registered.
    pub fn lookup(&self, id: &str) -> Result<&Arc<Feature>, ComposerError> {
        self.features.get(id).ok_or_else(|| ComposerError::FeatureNotFound {
            message: format!("feature '{id}' is not registered").into(),
            context: None,
        })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Feature>> {
        self.features.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn list_all(&self) -> Vec<&Arc<Feature>> {
        display_order(self.features.values())
    }

    #[must_use]
    pub fn list_by_kind(&self, kind: FeatureKind) -> Vec<&Arc<Feature>> {
        self.indexed(self.by_kind.get(&kind))
    }

    #[must_use]
    pub fn list_by_category(&self, category: &str) -> Vec<&Arc<Feature>> {
        self.indexed(self.by_category.get(category))
    }

    fn indexed(&self, ids: Option<&Vec<String>>) -> Vec<&Arc<Feature>> {
        let features = ids.into_iter().flatten().filter_map(|id| self.features.get(id));
        display_order(features)
    }
}

fn display_order<'a>(features: impl Iterator<Item = &'a Arc<Feature>>) -> Vec<&'a Arc<Feature>> {
    let mut listed: Vec<_> = features.collect();
    listed.sort_by(|a, b| {
        (Reverse(a.priority()), a.id()).cmp(&(Reverse(b.priority()), b.id()))
    });
    listed
}
