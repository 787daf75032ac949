//! # Domain Models
//!
//! Pure data types shared by the composition engine and its callers.
//! Keep it lean: no I/O and no resolution logic, just data and simple helpers.
//!
//! * [`feature`]: feature kinds, tiers, project profiles and per-feature artifacts.
//! * [`features`]: the [`features::KindSet`] bitset used for singleton-kind policy.
//! * [`composition`]: request/result types exchanged with the composer.
//! * [`config`]: tunables of the composer itself.

pub mod composition;
pub mod config;
pub mod feature;
pub mod features;

use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form configuration map (feature settings, project settings, result metadata).
///
/// A `BTreeMap` so that iteration and serialization order are stable across runs.
pub type ConfigMap = BTreeMap<String, Value>;
