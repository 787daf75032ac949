//! Kernel utilities shared across crates.
//! Keep this crate lightweight; today it only hosts the layered config loader.
//!
//! ## Config loading
//! ```rust,no_run
//! use stencil_kernel::config::load_composer_config;
//!
//! let cfg = load_composer_config(Some("stencil")).unwrap_or_default();
//! assert!(cfg.provider_timeout_ms > 0);
//! ```
pub mod config;

pub use stencil_domain as domain;
