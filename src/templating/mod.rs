//! Tera-based templating for paths and file contents.
//!
//! This module provides the rendering contract the copy engine depends on:
//! a template string plus a data context goes in, a string (or a classified
//! [`TemplateError`]) comes out.
//!
//! # Overview
//!
//! - [`TemplateEnvironment`] - base Tera configuration (filters, functions)
//!   with an identity used for caching
//! - [`cache`] - process-wide memo of compiled templates keyed by environment,
//!   strictness and template text
//! - [`render_str`] - compile-or-reuse, then execute
//! - [`error`] - classification of Tera failures into missing variable,
//!   missing filter, missing item, syntax, or unknown
//!
//! # Strict and Non-Strict Rendering
//!
//! In strict mode a reference to an undefined variable fails. In non-strict
//! mode it renders as the empty string:
//!
//! ```text
//! "Hello {{ missing }}!"  ->  "Hello !"
//! ```
//!
//! Conditions on undefined names (`{% if missing %}`) are falsy in both modes,
//! and `default` filters and `is defined` tests still see the name as
//! undefined in non-strict mode.
//!
//! # Supported Syntax
//!
//! Everything Tera supports: `{{ var }}`, `{% if %}`, `{% for %}`, filters
//! such as `upper` or `replace`. Template inheritance and includes have no
//! meaning here because every template is compiled standalone.

pub mod cache;
pub mod environment;
pub mod error;
mod lenient;
pub mod renderer;

pub use cache::{
    CompiledTemplate, clear_template_cache, get_or_compile, is_template_cached,
    template_cache_len,
};
pub use environment::TemplateEnvironment;
pub use error::{TemplateError, TemplateErrorKind, classify, classify_message};
pub use renderer::render_str;

/// Template data: named values available to every template.
pub type TemplateContext = serde_json::Map<String, serde_json::Value>;
