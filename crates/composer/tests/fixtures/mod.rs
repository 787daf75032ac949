#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use stencil_composer::domain::ConfigMap;
use stencil_composer::domain::feature::{FeatureArtifacts, FeatureKind, ProjectProfile};
use stencil_composer::{Catalog, Feature, ProviderError};

/// A stub feature whose provider always returns `artifacts`.
pub fn stub(
    id: &str,
    kind: FeatureKind,
    dependencies: &[&str],
    conflicts: &[&str],
    artifacts: FeatureArtifacts,
) -> Feature {
    Feature::builder()
        .id(id)
        .name(id)
        .kind(kind)
        .dependencies(dependencies.iter().copied())
        .conflicts(conflicts.iter().copied())
        .provider(move |_: &ProjectProfile, _: &ConfigMap| {
            Ok::<_, ProviderError>(artifacts.clone())
        })
        .build()
}

/// A stub feature that bumps `calls` every time its provider runs.
pub fn counted(id: &str, kind: FeatureKind, calls: &Arc<AtomicUsize>) -> Feature {
    let calls = Arc::clone(calls);
    let path = format!("{id}.txt");
    Feature::builder()
        .id(id)
        .name(id)
        .kind(kind)
        .provider(move |_: &ProjectProfile, _: &ConfigMap| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ProviderError>(FeatureArtifacts::new().file(path.clone(), "generated"))
        })
        .build()
}

pub fn catalog(features: impl IntoIterator<Item = Feature>) -> Catalog {
    let mut catalog = Catalog::new();
    catalog.register_all(features).expect("fixture features register");
    catalog
}

pub fn profile() -> ProjectProfile {
    ProjectProfile::builder().name("fixture").build()
}
