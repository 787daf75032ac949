use std::borrow::Cow;
use stencil_domain::ConfigMap;
use stencil_domain::feature::{FeatureArtifacts, ProjectProfile};

/// Produces the artifacts of one feature for a given project.
///
/// Implementations must be side-effect free: the engine may call them concurrently,
/// on blocking worker threads, and may discard their output.
///
/// Any `Fn(&ProjectProfile, &ConfigMap) -> Result<FeatureArtifacts, ProviderError>`
/// closure is a provider, which keeps stubs in tests one-liners.
pub trait ArtifactProvider: Send + Sync + 'static {
    fn generate(
        &self,
        profile: &ProjectProfile,
        config: &ConfigMap,
    ) -> Result<FeatureArtifacts, ProviderError>;
}

impl<F> ArtifactProvider for F
where
    F: Fn(&ProjectProfile, &ConfigMap) -> Result<FeatureArtifacts, ProviderError>
        + Send
        + Sync
        + 'static,
{
    fn generate(
        &self,
        profile: &ProjectProfile,
        config: &ConfigMap,
    ) -> Result<FeatureArtifacts, ProviderError> {
        self(profile, config)
    }
}

/// Why an artifact provider did not produce artifacts.
#[stencil_derive::stencil_error]
pub enum ProviderError {
    #[error("Provider failed{}: {message}", format_context(.context))]
    Failed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid feature configuration{}: {message}", format_context(.context))]
    InvalidConfig { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The provider did not answer within the configured per-call limit.
    #[error("Generation timed out{}: {message}", format_context(.context))]
    GenerationTimeout { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Provider panicked{}: {message}", format_context(.context))]
    Panicked { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialize { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl ProviderError {
    pub fn failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Failed { message: message.into(), context: None }
    }

    pub fn invalid_config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidConfig { message: message.into(), context: None }
    }
}
