//! Engine environments.
//!
//! A [`TemplateEnvironment`] is a base Tera instance (builtin filters plus any
//! registered by the caller) with a process-unique identity. Compiled templates
//! are cached per environment identity, so two environments with different
//! filters never share compiled entries.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use tera::Tera;

static NEXT_ENVIRONMENT_ID: AtomicU64 = AtomicU64::new(1);

static DEFAULT_ENVIRONMENT: LazyLock<Arc<TemplateEnvironment>> =
    LazyLock::new(|| Arc::new(TemplateEnvironment::new()));

fn next_id() -> u64 {
    NEXT_ENVIRONMENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Tera configuration shared by every template compiled against it.
///
/// Autoescaping is disabled: rendered output is written to files verbatim,
/// never embedded in HTML by this crate.
///
/// # Examples
///
/// ```rust,no_run
/// use std::collections::HashMap;
/// use renderfs::templating::{TemplateEnvironment, render_str};
/// use tera::Value;
///
/// let shout = |value: &Value, _args: &HashMap<String, Value>| -> tera::Result<Value> {
///     Ok(Value::String(value.as_str().unwrap_or_default().to_uppercase()))
/// };
/// let env = TemplateEnvironment::new().with_filter("shout", shout);
/// let context = serde_json::Map::new();
/// let out = render_str("{{ 'hi' | shout }}", &context, true, Some(&env)).unwrap();
/// assert_eq!(out, "HI");
/// ```
#[derive(Clone)]
pub struct TemplateEnvironment {
    id: u64,
    engine: Tera,
}

impl TemplateEnvironment {
    /// Create an environment with Tera's builtin filters, tests and functions.
    pub fn new() -> Self {
        let mut engine = Tera::default();
        engine.autoescape_on(vec![]);
        Self {
            id: next_id(),
            engine,
        }
    }

    /// The lazily created environment used when callers do not supply one.
    pub fn default_environment() -> Arc<Self> {
        Arc::clone(&DEFAULT_ENVIRONMENT)
    }

    /// Register a filter, returning an environment with a fresh identity.
    #[must_use]
    pub fn with_filter<F>(mut self, name: &str, filter: F) -> Self
    where
        F: tera::Filter + 'static,
    {
        self.engine.register_filter(name, filter);
        self.id = next_id();
        self
    }

    /// Register a global function, returning an environment with a fresh identity.
    #[must_use]
    pub fn with_function<F>(mut self, name: &str, function: F) -> Self
    where
        F: tera::Function + 'static,
    {
        self.engine.register_function(name, function);
        self.id = next_id();
        self
    }

    /// Process-unique identity used as part of the template cache key.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn engine(&self) -> &Tera {
        &self.engine
    }
}

impl Default for TemplateEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplateEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEnvironment").field("id", &self.id).finish_non_exhaustive()
    }
}
