//! Feature composition engine.
//!
//! Turns a list of requested feature ids into a generated project bundle:
//!
//! * [`Catalog`]: append-only registry of [`Feature`] descriptors.
//! * [`Resolver`]: dependency closure in topological order, with cycle paths.
//! * [`validate`]: explicit, type-exclusive and tier checks over the resolved set.
//! * [`Generator`]: concurrent provider fan-out and an in-order merge.
//! * [`Composer`]: the orchestrator and the only entry point most callers need.
//!
//! The engine performs no I/O. Writing files and running post actions belongs to the
//! caller.
//!
//! ```no_run
//! # async fn run(catalog: stencil_composer::Catalog) {
//! use stencil_composer::Composer;
//! use stencil_composer::domain::composition::CompositionRequest;
//! use stencil_composer::domain::feature::ProjectProfile;
//!
//! let composer = Composer::builder().catalog(catalog).build();
//! let request = CompositionRequest::builder()
//!     .features(["api-rest"])
//!     .profile(ProjectProfile::builder().name("orders").build())
//!     .build();
//!
//! match composer.compose(&request).await {
//!     Ok(result) => println!("{} files", result.bundle.map_or(0, |b| b.files.len())),
//!     Err(failure) => eprintln!("{}: {:?}", failure.error(), failure.report().warnings),
//! }
//! # }
//! ```

mod builder;
mod catalog;
mod composer;
mod error;
mod feature;
mod generator;
mod provider;
mod resolver;
mod validator;

pub use builder::{ComposerBuilder, NoCatalog, WithCatalog};
pub use catalog::Catalog;
pub use composer::{ComposeFailure, Composer};
pub use error::{ComposerError, ComposerErrorExt};
pub use feature::{Feature, FeatureBuilder};
pub use generator::{Generator, merged_config};
pub use provider::{ArtifactProvider, ProviderError, ProviderErrorExt};
pub use resolver::Resolver;
pub use validator::{Validation, validate};

pub use stencil_domain as domain;
