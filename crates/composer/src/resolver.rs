use crate::catalog::Catalog;
use crate::error::ComposerError;
use crate::feature::Feature;
use fxhash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use stencil_domain::composition::CompositionOptions;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// How the traversal reached an id.
#[derive(Debug, Clone, Copy)]
enum Via<'a> {
    Request,
    Requires(&'a str),
    Suggests(&'a str),
}

/// Computes the dependency closure of a request in a safe application order.
///
/// Depth-first with three-color marking: every feature lands after all of its
/// dependencies, requested roots are walked in the order given, and dependencies in
/// declaration order, so a fixed request over a fixed catalog always yields the same
/// order. Warnings gathered along the way stay readable through [`Resolver::warnings`]
/// even when resolution fails.
#[derive(Debug)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    options: &'a CompositionOptions,
    marks: FxHashMap<&'a str, Mark>,
    path: Vec<&'a str>,
    order: Vec<Arc<Feature>>,
    warnings: Vec<String>,
    noted: FxHashSet<String>,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, options: &'a CompositionOptions) -> Self {
        Self {
            catalog,
            options,
            marks: FxHashMap::default(),
            path: Vec::new(),
            order: Vec::new(),
            warnings: Vec::new(),
            noted: FxHashSet::default(),
        }
    }

    /// Resolves `requested` into a topological order, dependencies first.
    ///
    /// # Errors
    /// * [`ComposerError::FeatureNotFound`] for an unregistered id, unless
    ///   `auto_resolve_dependencies` is set (then it is skipped with a warning).
    /// * [`ComposerError::CyclicDependency`] with the full cycle path.
    pub fn resolve(
        &mut self,
        requested: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Vec<Arc<Feature>>, ComposerError> {
        self.marks.clear();
        self.path.clear();
        self.order.clear();
        self.warnings.clear();
        self.noted.clear();

        for id in requested {
            self.visit(id.as_ref(), Via::Request)?;
        }

        debug!(
            order = ?self.order.iter().map(|f| f.id()).collect::<Vec<_>>(),
            "Dependency resolution finished"
        );
        Ok(std::mem::take(&mut self.order))
    }

    /// Warnings from the latest [`Resolver::resolve`] call.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    fn visit(&mut self, id: &str, via: Via<'a>) -> Result<(), ComposerError> {
        if self.options.is_excluded(id) {
            self.note_excluded(id, via);
            return Ok(());
        }

        let catalog = self.catalog;
        let Some(feature) = catalog.get(id) else {
            return self.note_missing(id, via);
        };
        let key = feature.id();

        match self.marks.get(key) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => return Err(self.cycle_through(key)),
            None => {}
        }

        self.marks.insert(key, Mark::InProgress);
        self.path.push(key);

        for dependency in feature.dependencies() {
            self.visit(dependency, Via::Requires(key))?;
        }
        if self.options.include_optional {
            for dependency in feature.optional_dependencies() {
                self.visit(dependency, Via::Suggests(key))?;
            }
        }

        self.path.pop();
        self.marks.insert(key, Mark::Done);
        self.order.push(Arc::clone(feature));
        Ok(())
    }

    fn note_excluded(&mut self, id: &str, via: Via<'a>) {
        match via {
            Via::Request => {
                self.warn(format!("Feature '{id}' was requested but is excluded; skipped"));
            }
            Via::Requires(parent) => self.warn(format!(
                "Feature '{parent}' depends on excluded feature '{id}'; \
                 the generated project may be incomplete"
            )),
            Via::Suggests(parent) => {
                debug!(feature = parent, optional = id, "Optional dependency excluded");
            }
        }
    }

    fn note_missing(&mut self, id: &str, via: Via<'a>) -> Result<(), ComposerError> {
        let tolerated = self.options.auto_resolve_dependencies;
        match via {
            Via::Request if tolerated => {
                self.warn(format!("Requested feature '{id}' is not registered; skipped"));
                Ok(())
            }
            Via::Request => Err(ComposerError::FeatureNotFound {
                message: format!("feature '{id}' is not registered").into(),
                context: Some("Resolving requested features".into()),
            }),
            Via::Requires(parent) if tolerated => {
                self.warn(format!(
                    "Feature '{parent}' depends on unregistered feature '{id}'; skipped"
                ));
                Ok(())
            }
            Via::Requires(parent) => Err(ComposerError::FeatureNotFound {
                message: format!("feature '{id}' is not registered").into(),
                context: Some(format!("Dependency of '{parent}'").into()),
            }),
            Via::Suggests(parent) => {
                self.warn(format!(
                    "Optional dependency '{id}' of '{parent}' is not registered; skipped"
                ));
                Ok(())
            }
        }
    }

    /// `key` is on the current path; the cycle is the path suffix starting at it.
    fn cycle_through(&self, key: &str) -> ComposerError {
        let start = self.path.iter().position(|id| *id == key).unwrap_or_default();
        let cycle = self.path[start..]
            .iter()
            .copied()
            .chain(std::iter::once(key))
            .map(str::to_owned)
            .collect();

        ComposerError::CyclicDependency { cycle, context: None }
    }

    fn warn(&mut self, message: String) {
        if self.noted.insert(message.clone()) {
            warn!("{message}");
            self.warnings.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use stencil_domain::ConfigMap;
    use stencil_domain::feature::{FeatureArtifacts, FeatureKind, ProjectProfile};

    fn empty(_: &ProjectProfile, _: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
        Ok(FeatureArtifacts::new())
    }

    fn catalog(graph: &[(&str, &[&str])]) -> Catalog {
        let mut catalog = Catalog::new();
        for (id, deps) in graph {
            catalog
                .register(
                    Feature::builder()
                        .id(*id)
                        .name(*id)
                        .kind(FeatureKind::Core)
                        .dependencies(deps.iter().copied())
                        .provider(empty)
                        .build(),
                )
                .unwrap();
        }
        catalog
    }

    fn ids(features: &[Arc<Feature>]) -> Vec<&str> {
        features.iter().map(|f| f.id()).collect()
    }

    #[test]
    fn dependencies_come_first() {
        let catalog = catalog(&[("api", &["health"]), ("health", &[])]);
        let options = CompositionOptions::default();
        let resolved = Resolver::new(&catalog, &options).resolve(&["api"]).unwrap();

        assert_eq!(ids(&resolved), ["health", "api"]);
    }

    #[test]
    fn diamond_is_resolved_once() {
        let catalog = catalog(&[
            ("top", &["left", "right"]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("base", &[]),
        ]);
        let options = CompositionOptions::default();
        let resolved = Resolver::new(&catalog, &options).resolve(&["top", "base"]).unwrap();

        assert_eq!(ids(&resolved), ["base", "left", "right", "top"]);
    }

    #[test]
    fn cycle_reports_full_path() {
        let catalog = catalog(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"]), ("root", &["a"])]);
        let options = CompositionOptions::default();
        let err = Resolver::new(&catalog, &options).resolve(&["root"]).unwrap_err();

        match err {
            ComposerError::CyclicDependency { cycle, .. } => {
                assert_eq!(cycle, ["a", "b", "c", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_dependency_fails_without_auto_resolve() {
        let catalog = catalog(&[("api", &["ghost"])]);
        let options = CompositionOptions::default();
        let err = Resolver::new(&catalog, &options).resolve(&["api"]).unwrap_err();

        assert!(matches!(err, ComposerError::FeatureNotFound { .. }));
        assert!(err.to_string().contains("Dependency of 'api'"));
    }

    #[test]
    fn unknown_ids_are_warnings_with_auto_resolve() {
        let catalog = catalog(&[("api", &["ghost"])]);
        let options = CompositionOptions::builder().auto_resolve_dependencies(true).build();
        let mut resolver = Resolver::new(&catalog, &options);
        let resolved = resolver.resolve(&["phantom", "api"]).unwrap();

        assert_eq!(ids(&resolved), ["api"]);
        assert_eq!(resolver.warnings().len(), 2);
    }

    #[test]
    fn exclusion_is_absolute_and_reported() {
        let catalog = catalog(&[("api", &["health"]), ("health", &[])]);
        let options = CompositionOptions::builder().excluded_feature_ids(["health"]).build();
        let mut resolver = Resolver::new(&catalog, &options);
        let resolved = resolver.resolve(&["api", "health"]).unwrap();

        assert_eq!(ids(&resolved), ["api"]);
        assert_eq!(resolver.warnings().len(), 2);
        assert!(resolver.warnings()[0].contains("excluded feature 'health'"));
    }

    #[test]
    fn optional_dependencies_follow_the_option() {
        let mut catalog = catalog(&[("metrics", &[])]);
        catalog
            .register(
                Feature::builder()
                    .id("api")
                    .name("api")
                    .kind(FeatureKind::Api)
                    .optional_dependencies(["metrics", "ghost"])
                    .provider(empty)
                    .build(),
            )
            .unwrap();

        let plain = CompositionOptions::default();
        assert_eq!(ids(&Resolver::new(&catalog, &plain).resolve(&["api"]).unwrap()), ["api"]);

        let with_optional = CompositionOptions::builder().include_optional(true).build();
        let mut resolver = Resolver::new(&catalog, &with_optional);
        assert_eq!(ids(&resolver.resolve(&["api"]).unwrap()), ["metrics", "api"]);
        assert_eq!(resolver.warnings().len(), 1);
    }
}
