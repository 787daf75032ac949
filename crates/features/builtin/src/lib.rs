//! Stock features for the composition engine.
//!
//! | id | kind | depends on |
//! |---|---|---|
//! | `health-basic` | core | |
//! | `api-rest` | api | `health-basic` (optional: `observability-tracing`) |
//! | `observability-tracing` | observability | |
//! | `observability-metrics` | observability | `observability-tracing` |
//! | `security-jwt` | security | `api-rest` |
//! | `storage-database` | storage | |
//! | `storage-cache` | storage | |
//! | `caching-redis` | caching | |
//! | `messaging-nats` | messaging | (optional: `observability-tracing`) |
//! | `deployment-docker` | deployment | |
//!
//! ```no_run
//! use stencil_builtin::register_builtin;
//! use stencil_composer::{Catalog, Composer};
//!
//! let mut catalog = Catalog::new();
//! register_builtin(&mut catalog).expect("stock features are valid");
//! let composer = Composer::new(catalog);
//! ```

mod observability;
mod platform;
mod security;
mod settings;
mod storage;
mod web;

use stencil_composer::{Catalog, ComposerError, Feature};
use tracing::info;

pub use observability::{METRICS, TRACING};
pub use platform::{DOCKER, NATS};
pub use security::JWT;
pub use storage::{CACHE, DATABASE, REDIS};
pub use web::{API_REST, HEALTH_BASIC};

/// Every stock descriptor, unregistered.
#[must_use]
pub fn features() -> Vec<Feature> {
    [
        web::features(),
        observability::features(),
        security::features(),
        storage::features(),
        platform::features(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Registers the stock features into `catalog`.
///
/// # Errors
/// Fails if any stock id is already taken in `catalog`.
pub fn register_builtin(catalog: &mut Catalog) -> Result<(), ComposerError> {
    let features = features();
    let count = features.len();
    catalog.register_all(features)?;
    info!(count, "Builtin features registered");
    Ok(())
}

/// A fresh catalog holding only the stock features.
///
/// # Errors
/// See [`register_builtin`].
pub fn builtin_catalog() -> Result<Catalog, ComposerError> {
    let mut catalog = Catalog::new();
    register_builtin(&mut catalog)?;
    Ok(catalog)
}
