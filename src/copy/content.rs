//! File content rendering.

use std::borrow::Cow;

use tracing::debug;

use crate::templating::{TemplateContext, TemplateEnvironment, TemplateError, render_str};
use crate::utils::binary::is_binary;

/// Render file bytes through the template engine.
///
/// Content that sniffs as binary is returned unchanged unless
/// `template_binary` is set. Content that is not valid UTF-8 is likewise
/// returned unchanged, or decoded lossily when `template_binary` is set.
///
/// # Errors
///
/// Returns the classified engine failure.
pub fn render_bytes(
    raw: &[u8],
    context: &TemplateContext,
    template_binary: bool,
    strict: bool,
    env: Option<&TemplateEnvironment>,
) -> Result<Vec<u8>, TemplateError> {
    if !template_binary && is_binary(raw) {
        return Ok(raw.to_vec());
    }

    let text = match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) if template_binary => String::from_utf8_lossy(raw),
        Err(err) => {
            debug!("Passing through content that is not UTF-8: {}", err);
            return Ok(raw.to_vec());
        }
    };

    Ok(render_str(&text, context, strict, env)?.into_bytes())
}
