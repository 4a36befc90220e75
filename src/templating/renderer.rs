//! String rendering through the compiled-template cache.

use super::cache::get_or_compile;
use super::error::TemplateError;
use super::{TemplateContext, TemplateEnvironment};

/// Render `template` with `context`.
///
/// Uses `env` when given, otherwise the shared default environment. The
/// compiled form is cached, so rendering the same text again only pays for
/// execution.
///
/// # Errors
///
/// Returns a classified [`TemplateError`] on syntax errors, on undefined
/// variables when `strict` is set, and on any other engine failure.
///
/// # Examples
///
/// ```rust,no_run
/// use renderfs::templating::{TemplateContext, render_str};
///
/// let mut context = TemplateContext::new();
/// context.insert("name".into(), "world".into());
/// assert_eq!(render_str("Hello {{ name }}!", &context, true, None).unwrap(), "Hello world!");
/// assert_eq!(render_str("Hello {{ other }}!", &context, false, None).unwrap(), "Hello !");
/// ```
pub fn render_str(
    template: &str,
    context: &TemplateContext,
    strict: bool,
    env: Option<&TemplateEnvironment>,
) -> Result<String, TemplateError> {
    match env {
        Some(env) => get_or_compile(template, strict, env)?.execute(context),
        None => {
            let env = TemplateEnvironment::default_environment();
            get_or_compile(template, strict, &env)?.execute(context)
        }
    }
}
