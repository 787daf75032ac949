use crate::ConfigMap;
use crate::features::KindSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use typed_builder::TypedBuilder;

/// The closed set of feature categories a feature can belong to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FeatureKind {
    Core,
    Observability,
    Security,
    Storage,
    Api,
    Deployment,
    Messaging,
    Caching,
}

impl FeatureKind {
    /// The bit representing this kind inside a [`KindSet`].
    #[must_use]
    pub const fn flag(self) -> KindSet {
        match self {
            Self::Core => KindSet::CORE,
            Self::Observability => KindSet::OBSERVABILITY,
            Self::Security => KindSet::SECURITY,
            Self::Storage => KindSet::STORAGE,
            Self::Api => KindSet::API,
            Self::Deployment => KindSet::DEPLOYMENT,
            Self::Messaging => KindSet::MESSAGING,
            Self::Caching => KindSet::CACHING,
        }
    }
}

/// Project complexity tier. Ordered: `basic < intermediate < advanced < enterprise`.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Tier {
    #[default]
    Basic,
    Intermediate,
    Advanced,
    Enterprise,
}

/// Inclusive tier bounds; `None` leaves that side open.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRange {
    pub min: Option<Tier>,
    pub max: Option<Tier>,
}

impl TierRange {
    #[must_use]
    pub const fn new(min: Option<Tier>, max: Option<Tier>) -> Self {
        Self { min, max }
    }

    /// Whether `tier` lies within the bounds.
    #[must_use]
    pub fn admits(&self, tier: Tier) -> bool {
        self.min.is_none_or(|min| tier >= min) && self.max.is_none_or(|max| tier <= max)
    }

    /// A range is well-formed when `min <= max` (or either side is open).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }
}

/// The project a composition targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProfile {
    #[builder(setter(into))]
    pub name: String,
    #[builder(default)]
    #[serde(default)]
    pub tier: Tier,
    #[builder(default)]
    #[serde(default)]
    pub config: ConfigMap,
    /// Kinds of which at most one feature may be active.
    #[builder(default)]
    #[serde(default)]
    pub singleton_kinds: KindSet,
}

impl ProjectProfile {
    #[must_use]
    pub const fn is_singleton(&self, kind: FeatureKind) -> bool {
        self.singleton_kinds.has(kind)
    }
}

/// Type tag of a [`PostAction`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PostActionKind {
    InstallDependencies,
    Generate,
    Format,
    Migrate,
    Custom,
}

/// An external command the materialization layer runs after writing files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAction {
    pub kind: PostActionKind,
    pub description: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl PostAction {
    pub fn new(
        kind: PostActionKind,
        description: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            working_dir: None,
        }
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Everything a single feature contributes to a project.
///
/// Files are keyed by logical path relative to the project root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureArtifacts {
    pub files: BTreeMap<String, String>,
    pub templates: Vec<String>,
    pub assets: Vec<String>,
    pub metadata: ConfigMap,
    pub post_actions: Vec<PostAction>,
}

impl FeatureArtifacts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    #[must_use]
    pub fn template(mut self, reference: impl Into<String>) -> Self {
        self.templates.push(reference.into());
        self
    }

    #[must_use]
    pub fn asset(mut self, reference: impl Into<String>) -> Self {
        self.assets.push(reference.into());
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn post_action(mut self, action: PostAction) -> Self {
        self.post_actions.push(action);
        self
    }
}
