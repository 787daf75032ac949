use crate::feature::FeatureKind;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::IntoEnumIterator;

bitflags! {
    /// Represents a set of feature kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct KindSet: u16 {
        const CORE = 1 << 0;
        const OBSERVABILITY = 1 << 1;
        const SECURITY = 1 << 2;
        const STORAGE = 1 << 3;
        const API = 1 << 4;
        const DEPLOYMENT = 1 << 5;
        const MESSAGING = 1 << 6;
        const CACHING = 1 << 7;

        /// Kinds that allow only one active feature unless a profile says otherwise.
        const DEFAULT_SINGLETONS = Self::STORAGE.bits() | Self::CACHING.bits();
    }
}

impl KindSet {
    /// Returns `true` if `kind` is a member of this set.
    #[must_use]
    pub const fn has(self, kind: FeatureKind) -> bool {
        self.contains(kind.flag())
    }

    /// Lists the member kinds in declaration order.
    pub fn kinds(self) -> impl Iterator<Item = FeatureKind> {
        FeatureKind::iter().filter(move |kind| self.has(*kind))
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::DEFAULT_SINGLETONS
    }
}

impl From<FeatureKind> for KindSet {
    fn from(kind: FeatureKind) -> Self {
        kind.flag()
    }
}

impl FromIterator<FeatureKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = FeatureKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, kind| set | kind.flag())
    }
}

impl Serialize for KindSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.kinds())
    }
}

impl<'de> Deserialize<'de> for KindSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let kinds = Vec::<FeatureKind>::deserialize(deserializer)?;
        Ok(kinds.into_iter().collect())
    }
}
