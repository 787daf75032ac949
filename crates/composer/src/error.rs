use crate::provider::ProviderError;
use std::borrow::Cow;

/// Errors raised while registering features or composing a project.
#[stencil_derive::stencil_error]
pub enum ComposerError {
    /// A feature with the same id is already registered.
    #[error("Duplicate feature{}: {message}", format_context(.context))]
    DuplicateFeature { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The descriptor is structurally unusable (empty id, no provider, self references...).
    #[error("Invalid feature{}: {message}", format_context(.context))]
    InvalidFeature { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Feature not found{}: {message}", format_context(.context))]
    FeatureNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// `cycle` starts and ends with the same id, e.g. `a -> b -> c -> a`.
    #[error("Cyclic dependency{}: {}", format_context(.context), .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String>, context: Option<Cow<'static, str>> },

    #[error("Composition conflict{}: {count} conflicting pair(s)", format_context(.context))]
    CompositionConflict { count: usize, context: Option<Cow<'static, str>> },

    #[error("Generation of feature '{feature_id}' failed{}: {source}", format_context(.context))]
    FeatureGenerationFailed {
        feature_id: String,
        source: ProviderError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal composer error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ComposerError {
    /// The failing feature's id for generation errors.
    #[must_use]
    pub fn feature_id(&self) -> Option<&str> {
        match self {
            Self::FeatureGenerationFailed { feature_id, .. } => Some(feature_id),
            _ => None,
        }
    }

    /// Whether the failure is a provider exceeding its time budget.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::FeatureGenerationFailed { source: ProviderError::GenerationTimeout { .. }, .. }
        )
    }
}
