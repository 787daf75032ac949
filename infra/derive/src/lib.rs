#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared across the workspace.
//! Currently a single attribute, [`macro@stencil_error`], which turns a plain enum into
//! a context-aware error type wired for `?`.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A companion `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>`.
///   Attaching context overwrites the `context` field of any variant that has one.
/// * For every variant whose fields are exactly `source` (or a field marked `#[source]`/`#[from]`)
///   plus `context`: `From<Source>` and `<ErrorName>Ext` for `Result<T, Source>`, so
///   upstream errors convert with `?` or `.context("...")?`.
///   Variants carrying additional fields must be constructed explicitly.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Applied to an **enum** with **named-field** variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. A variant with a source field must also carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[stencil_derive::stencil_error]
/// pub enum RenderError {
///     #[error("Template error{}: {source}", format_context(.context))]
///     Template { source: std::fmt::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal render error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn render() -> Result<String, RenderError> {
///     let mut out = String::new();
///     std::fmt::write(&mut out, format_args!("hi")).context("Writing greeting")?;
///     Ok(out)
/// }
/// ```
#[proc_macro_attribute]
pub fn stencil_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
