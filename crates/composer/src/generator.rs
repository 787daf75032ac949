use crate::error::ComposerError;
use crate::feature::Feature;
use crate::provider::ProviderError;
use fxhash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use stencil_domain::ConfigMap;
use stencil_domain::composition::GeneratedBundle;
use stencil_domain::config::ComposerConfig;
use stencil_domain::feature::{FeatureArtifacts, ProjectProfile};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Runs artifact providers and folds their output into one bundle.
///
/// Providers run concurrently, each on the blocking pool under a timeout. The merge
/// walks the resolved order regardless of completion order, so the bundle only
/// depends on the input.
#[derive(Debug, Clone)]
pub struct Generator {
    timeout: Duration,
    max_concurrency: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(&ComposerConfig::default())
    }
}

impl Generator {
    #[must_use]
    pub const fn new(config: &ComposerConfig) -> Self {
        Self { timeout: config.provider_timeout(), max_concurrency: config.max_concurrency }
    }

    /// Generates the bundle for `features` (in resolved order).
    ///
    /// `overrides` holds per-feature settings layered over each default config.
    ///
    /// # Errors
    /// [`ComposerError::FeatureGenerationFailed`] for the first provider that fails, times
    /// out or panics. Remaining providers are abandoned and no partial bundle is returned.
    pub async fn generate(
        &self,
        features: &[Arc<Feature>],
        profile: &ProjectProfile,
        overrides: &BTreeMap<String, ConfigMap>,
    ) -> Result<GeneratedBundle, ComposerError> {
        let profile = Arc::new(profile.clone());
        let permits = (self.max_concurrency > 0)
            .then(|| Arc::new(Semaphore::new(self.max_concurrency)));

        let mut tasks = JoinSet::new();
        for (index, feature) in features.iter().enumerate() {
            let call = ProviderCall {
                feature: Arc::clone(feature),
                profile: Arc::clone(&profile),
                config: merged_config(feature, overrides.get(feature.id())),
                limit: self.timeout,
            };
            let permits = permits.clone();

            tasks.spawn(async move {
                let _permit = match permits {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            return (index, Err(ProviderError::failed("generation slots closed")));
                        }
                    },
                    None => None,
                };
                (index, call.run().await)
            });
        }

        let mut produced: Vec<Option<FeatureArtifacts>> = vec![None; features.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(artifacts))) => produced[index] = Some(artifacts),
                Ok((index, Err(source))) => {
                    tasks.abort_all();
                    return Err(ComposerError::FeatureGenerationFailed {
                        feature_id: features[index].id().to_owned(),
                        source,
                        context: None,
                    });
                }
                Err(join_error) => {
                    tasks.abort_all();
                    return Err(ComposerError::Internal {
                        message: join_error.to_string().into(),
                        context: Some("Joining generation task".into()),
                    });
                }
            }
        }

        let mut assembler = BundleAssembler::default();
        for (feature, artifacts) in features.iter().zip(produced) {
            let artifacts = artifacts.ok_or_else(|| ComposerError::Internal {
                message: format!("no artifacts recorded for '{}'", feature.id()).into(),
                context: Some("Merging bundle".into()),
            })?;
            assembler.absorb(feature.id(), artifacts);
        }

        Ok(assembler.finish())
    }
}

/// `override` keys replace `default_config` keys; no deep merge.
#[must_use]
pub fn merged_config(feature: &Feature, overrides: Option<&ConfigMap>) -> ConfigMap {
    let mut config = feature.default_config().clone();
    if let Some(overrides) = overrides {
        config.extend(overrides.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    config
}

struct ProviderCall {
    feature: Arc<Feature>,
    profile: Arc<ProjectProfile>,
    config: ConfigMap,
    limit: Duration,
}

impl ProviderCall {
    async fn run(self) -> Result<FeatureArtifacts, ProviderError> {
        let Some(provider) = self.feature.provider().cloned() else {
            return Err(ProviderError::failed("feature has no artifact provider"));
        };
        let (profile, config) = (self.profile, self.config);

        // A blocking call cannot be interrupted; on timeout its result is dropped.
        let call = tokio::task::spawn_blocking(move || provider.generate(&profile, &config));

        match tokio::time::timeout(self.limit, call).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) if join_error.is_panic() => Err(ProviderError::Panicked {
                message: join_error.to_string().into(),
                context: None,
            }),
            Ok(Err(join_error)) => Err(ProviderError::Failed {
                message: join_error.to_string().into(),
                context: Some("Provider task cancelled".into()),
            }),
            Err(_) => Err(ProviderError::GenerationTimeout {
                message: format!("no result after {} ms", self.limit.as_millis()).into(),
                context: None,
            }),
        }
    }
}

/// Folds per-feature artifacts into a bundle.
///
/// Files and metadata are last-writer-wins, templates and assets keep the first-seen
/// order without duplicates, post actions are concatenated as they come.
#[derive(Debug, Default)]
struct BundleAssembler {
    bundle: GeneratedBundle,
    file_owners: FxHashMap<String, String>,
    templates: FxHashSet<String>,
    assets: FxHashSet<String>,
}

impl BundleAssembler {
    fn absorb(&mut self, owner: &str, artifacts: FeatureArtifacts) {
        for (path, content) in artifacts.files {
            if let Some(previous) = self.file_owners.insert(path.clone(), owner.to_owned()) {
                debug!(%path, %previous, feature = owner, "File overwritten by later feature");
            }
            self.bundle.files.insert(path, content);
        }

        for template in artifacts.templates {
            if self.templates.insert(template.clone()) {
                self.bundle.templates.push(template);
            }
        }
        for asset in artifacts.assets {
            if self.assets.insert(asset.clone()) {
                self.bundle.assets.push(asset);
            }
        }

        self.bundle.metadata.extend(artifacts.metadata);
        self.bundle.post_actions.extend(artifacts.post_actions);
    }

    fn finish(self) -> GeneratedBundle {
        self.bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stencil_domain::feature::{FeatureKind, PostAction, PostActionKind};

    fn empty(_: &ProjectProfile, _: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
        Ok(FeatureArtifacts::new())
    }

    #[test]
    fn assembler_merges_in_absorb_order() {
        let mut assembler = BundleAssembler::default();
        assembler.absorb(
            "a",
            FeatureArtifacts::new()
                .file("README.md", "from a")
                .template("base.hbs")
                .asset("logo.svg")
                .metadata("owner", "a")
                .post_action(PostAction::new(PostActionKind::Format, "fmt", "cargo")),
        );
        assembler.absorb(
            "b",
            FeatureArtifacts::new()
                .file("README.md", "from b")
                .template("base.hbs")
                .template("api.hbs")
                .metadata("owner", "b")
                .post_action(PostAction::new(PostActionKind::Format, "fmt", "cargo")),
        );

        let bundle = assembler.finish();
        assert_eq!(bundle.files["README.md"], "from b");
        assert_eq!(bundle.templates, ["base.hbs", "api.hbs"]);
        assert_eq!(bundle.assets, ["logo.svg"]);
        assert_eq!(bundle.metadata["owner"], json!("b"));
        assert_eq!(bundle.post_actions.len(), 2);
    }

    #[test]
    fn overrides_are_shallow() {
        let feature = Feature::builder()
            .id("db")
            .name("db")
            .kind(FeatureKind::Storage)
            .default_config(ConfigMap::from([
                ("engine".to_owned(), json!("postgres")),
                ("pool".to_owned(), json!({ "min": 1, "max": 10 })),
            ]))
            .provider(empty)
            .build();

        let overrides = ConfigMap::from([("pool".to_owned(), json!({ "max": 50 }))]);
        let config = merged_config(&feature, Some(&overrides));

        assert_eq!(config["engine"], json!("postgres"));
        assert_eq!(config["pool"], json!({ "max": 50 }));
        assert_eq!(merged_config(&feature, None), *feature.default_config());
    }
}
