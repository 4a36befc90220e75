//! Path rendering and validation.

use crate::core::PathError;
use crate::templating::{TemplateContext, TemplateEnvironment, render_str};
use crate::utils::path::{clean_path, escapes_root, file_name, join, parent, strip_template_suffix};

/// Render a source-relative path into a destination-relative one.
///
/// The rendered text is trimmed, backslashes become `/`, and the result is
/// lexically cleaned. File names lose one template suffix (`.jinja`,
/// `.tmpl`); directory names keep theirs.
///
/// Returns `Ok(None)` when the entry should be skipped: the path rendered
/// empty, cleaned to `.`, or the file name was nothing but a suffix.
///
/// # Errors
///
/// [`PathError::Template`] when the engine fails, [`PathError::Escape`] when
/// the cleaned path leaves the destination (`../x`, `/x`, `C:/x`).
///
/// # Examples
///
/// ```
/// use renderfs::copy::render_path;
/// use renderfs::templating::TemplateContext;
///
/// let mut context = TemplateContext::new();
/// context.insert("name".into(), "demo".into());
///
/// let rendered = render_path("{{ name }}/README.md.jinja", false, &context, false, None).unwrap();
/// assert_eq!(rendered.as_deref(), Some("demo/README.md"));
///
/// let skipped = render_path("{% if flag %}compose.yaml{% endif %}", false, &context, false, None).unwrap();
/// assert_eq!(skipped, None);
/// ```
pub fn render_path(
    path: &str,
    is_dir: bool,
    context: &TemplateContext,
    strict: bool,
    env: Option<&TemplateEnvironment>,
) -> Result<Option<String>, PathError> {
    let rendered = render_str(path, context, strict, env)?;

    let rendered = rendered.trim();
    if rendered.is_empty() {
        return Ok(None);
    }

    let rendered = rendered.replace('\\', "/");
    let clean = clean_path(&rendered);
    if clean == "." {
        return Ok(None);
    }

    if escapes_root(&clean) {
        return Err(PathError::Escape { rendered });
    }

    if is_dir {
        return Ok(Some(clean));
    }

    let stripped = strip_template_suffix(file_name(&clean));
    if stripped.is_empty() || stripped == "." {
        return Ok(None);
    }
    Ok(Some(join(parent(&clean).unwrap_or(""), stripped)))
}
