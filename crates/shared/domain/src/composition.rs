use crate::ConfigMap;
use crate::feature::{PostAction, ProjectProfile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum_macros::{AsRefStr, Display};
use typed_builder::TypedBuilder;

/// Knobs controlling a single composition run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositionOptions {
    /// Tolerate unknown feature ids (skipped with a warning) instead of failing.
    #[builder(default = false)]
    pub auto_resolve_dependencies: bool,
    /// Abort with a conflict error when any conflict is detected.
    #[builder(default = true)]
    pub fail_on_conflicts: bool,
    /// Ids that are never included, neither directly nor as a dependency.
    #[builder(default, setter(transform = |ids: impl IntoIterator<Item = impl Into<String>>| {
        ids.into_iter().map(Into::into).collect()
    }))]
    pub excluded_feature_ids: BTreeSet<String>,
    /// Also pull in each feature's optional dependencies.
    #[builder(default = false)]
    pub include_optional: bool,
    /// Resolve and validate only; skip generation.
    #[builder(default = false)]
    pub dry_run: bool,
}

impl Default for CompositionOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CompositionOptions {
    #[must_use]
    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded_feature_ids.contains(id)
    }
}

/// Input of one composition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRequest {
    /// Requested feature ids, in the order the caller wants them considered.
    #[builder(setter(transform = |ids: impl IntoIterator<Item = impl Into<String>>| {
        ids.into_iter().map(Into::into).collect()
    }))]
    pub features: Vec<String>,
    pub profile: ProjectProfile,
    /// Per-feature configuration overrides, layered over each feature's defaults.
    #[builder(default)]
    #[serde(default)]
    pub feature_config: BTreeMap<String, ConfigMap>,
    #[builder(default)]
    #[serde(default)]
    pub options: CompositionOptions,
}

/// Why two features cannot be active together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ConflictKind {
    /// One of the pair lists the other in its `conflicts`.
    Explicit,
    /// Both share a kind the project treats as singleton.
    TypeExclusive,
}

/// A detected incompatibility between two resolved features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictInfo {
    /// The member of the pair that comes first in resolved order.
    pub feature_a: String,
    pub feature_b: String,
    pub kind: ConflictKind,
    pub description: String,
    pub resolution: String,
}

/// Merged output of every feature in a composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedBundle {
    pub files: BTreeMap<String, String>,
    pub templates: Vec<String>,
    pub assets: Vec<String>,
    pub metadata: ConfigMap,
    pub post_actions: Vec<PostAction>,
}

/// Outcome of a composition run, also attached to failures as a diagnostic report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionResult {
    pub resolved_features: Vec<String>,
    /// `None` for dry runs and failed runs.
    pub bundle: Option<GeneratedBundle>,
    pub dependency_edges: BTreeMap<String, Vec<String>>,
    pub conflicts: Vec<ConflictInfo>,
    pub warnings: Vec<String>,
    pub post_actions: Vec<PostAction>,
    pub metadata: ConfigMap,
}

impl CompositionResult {
    #[must_use]
    pub const fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}
