//! Process-wide cache of compiled templates.
//!
//! Walking a tree renders the same path fragments and file bodies over and
//! over (and callers commonly walk the same tree repeatedly), so compiled
//! templates are memoized for the lifetime of the process.
//!
//! # Cache Key
//!
//! An entry is identified by:
//! - The identity of the [`TemplateEnvironment`] it was compiled against
//! - Whether undefined variables are strict
//! - The raw template text
//!
//! Entries are immutable once inserted and never expire. Long-running hosts and
//! tests can drop everything with [`clear_template_cache`].

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use serde_json::Value;
use tera::Tera;

use super::error::{TemplateError, classify};
use super::lenient::relax;
use super::{TemplateContext, TemplateEnvironment};
use crate::constants::TEMPLATE_NAME;

static TEMPLATE_CACHE: LazyLock<DashMap<TemplateCacheKey, Arc<CompiledTemplate>>> =
    LazyLock::new(DashMap::new);

/// Cache key for a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TemplateCacheKey {
    environment_id: u64,
    strict: bool,
    template: String,
}

impl TemplateCacheKey {
    pub(crate) fn new(environment_id: u64, strict: bool, template: &str) -> Self {
        Self {
            environment_id,
            strict,
            template: template.to_string(),
        }
    }
}

/// A template parsed against an environment, ready to execute.
pub struct CompiledTemplate {
    engine: Tera,
    strict: bool,
}

impl CompiledTemplate {
    /// Parse `template` against `env`.
    ///
    /// # Errors
    ///
    /// Returns a [`Syntax`](super::TemplateErrorKind::Syntax) error when the text does not parse.
    pub fn compile(
        template: &str,
        strict: bool,
        env: &TemplateEnvironment,
    ) -> Result<Self, TemplateError> {
        let mut engine = env.engine().clone();
        engine.add_raw_template(TEMPLATE_NAME, template).map_err(|e| classify(&e))?;
        if !strict {
            relax(&mut engine, TEMPLATE_NAME);
        }
        Ok(Self { engine, strict })
    }

    /// Whether undefined variables fail execution.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Execute against `context`.
    ///
    /// Non-strict templates were rewritten at compile time, so an undefined
    /// name renders empty without touching `context`.
    pub fn execute(&self, context: &TemplateContext) -> Result<String, TemplateError> {
        let tera_context = tera::Context::from_value(Value::Object(context.clone()))
            .map_err(|e| classify(&e))?;
        self.engine.render(TEMPLATE_NAME, &tera_context).map_err(|e| classify(&e))
    }
}

/// Fetch the compiled form of `template`, compiling and inserting it on a miss.
///
/// Compilation happens outside the map's locks; when two callers race on the
/// same key the first insert wins and both receive that entry.
pub fn get_or_compile(
    template: &str,
    strict: bool,
    env: &TemplateEnvironment,
) -> Result<Arc<CompiledTemplate>, TemplateError> {
    let key = TemplateCacheKey::new(env.id(), strict, template);
    if let Some(hit) = TEMPLATE_CACHE.get(&key) {
        return Ok(Arc::clone(hit.value()));
    }

    tracing::trace!("Compiling template ({} bytes, strict={})", template.len(), strict);
    let compiled = Arc::new(CompiledTemplate::compile(template, strict, env)?);
    let entry = TEMPLATE_CACHE.entry(key).or_insert(compiled);
    Ok(Arc::clone(entry.value()))
}

/// Drop every cached template.
pub fn clear_template_cache() {
    TEMPLATE_CACHE.clear();
}

/// Number of cached templates.
pub fn template_cache_len() -> usize {
    TEMPLATE_CACHE.len()
}

/// Whether a compiled entry exists for this exact key.
pub fn is_template_cached(template: &str, strict: bool, env: &TemplateEnvironment) -> bool {
    TEMPLATE_CACHE.contains_key(&TemplateCacheKey::new(env.id(), strict, template))
}
