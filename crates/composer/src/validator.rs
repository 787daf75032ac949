use crate::feature::Feature;
use std::sync::Arc;
use stencil_domain::composition::{ConflictInfo, ConflictKind};
use stencil_domain::feature::{ProjectProfile, TierRange};
use tracing::warn;

/// Findings of [`validate`]. The validator classifies only; the composer decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub conflicts: Vec<ConflictInfo>,
    pub warnings: Vec<String>,
}

/// Checks a resolved feature list against a project profile.
///
/// Every unordered pair is inspected once, `feature_a` being the member earlier in
/// resolved order. A pair can yield both an explicit and a type-exclusive conflict.
/// Tier mismatches are advisory and only produce warnings.
#[must_use]
pub fn validate(features: &[Arc<Feature>], profile: &ProjectProfile) -> Validation {
    let mut validation = Validation::default();

    for (index, a) in features.iter().enumerate() {
        for b in &features[index + 1..] {
            if a.conflicts_with(b) {
                validation.conflicts.push(ConflictInfo {
                    feature_a: a.id().to_owned(),
                    feature_b: b.id().to_owned(),
                    kind: ConflictKind::Explicit,
                    description: format!("'{}' and '{}' are declared incompatible", a.id(), b.id()),
                    resolution: format!(
                        "Remove '{}' or '{}' from the request, or exclude one of them",
                        a.id(),
                        b.id()
                    ),
                });
            }

            if a.kind() == b.kind() && a.id() != b.id() && profile.is_singleton(a.kind()) {
                let kind = a.kind();
                validation.conflicts.push(ConflictInfo {
                    feature_a: a.id().to_owned(),
                    feature_b: b.id().to_owned(),
                    kind: ConflictKind::TypeExclusive,
                    description: format!(
                        "'{}' and '{}' are both {kind} features; only one may be active",
                        a.id(),
                        b.id()
                    ),
                    resolution: format!(
                        "Keep a single {kind} feature, \
                         or drop {kind} from the project's singleton kinds"
                    ),
                });
            }
        }

        let range = a.tier_range();
        if !range.admits(profile.tier) {
            let message = format!(
                "Feature '{}' supports tiers {}, but project '{}' is {}",
                a.id(),
                describe(range),
                profile.name,
                profile.tier
            );
            warn!("{message}");
            validation.warnings.push(message);
        }
    }

    validation
}

fn describe(range: TierRange) -> String {
    match (range.min, range.max) {
        (Some(min), Some(max)) if min == max => format!("{min} only"),
        (Some(min), Some(max)) => format!("{min} to {max}"),
        (Some(min), None) => format!("{min} and above"),
        (None, Some(max)) => format!("up to {max}"),
        (None, None) => "any".to_owned(),
    }
}
