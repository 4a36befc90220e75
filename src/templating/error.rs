//! Template failure classification.
//!
//! Tera reports most rendering failures as free-text messages chained through
//! [`std::error::Error::source`]. This module flattens that chain and sorts the
//! failure into a [`TemplateErrorKind`] by pattern matching, extracting the
//! offending name and a source line where the engine mentions one.
//!
//! Classification is best-effort diagnostics. Callers may branch on the kind
//! (non-strict rendering does), but must not depend on the exact message text.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use strsim::levenshtein;
use thiserror::Error;

use super::TemplateContext;
use crate::constants::TEMPLATE_NAME;

/// Maximum allowed Levenshtein distance as a percentage of the name length for
/// "did you mean" suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

static FILTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Filter ['`]([^'`]+)['`] not found").expect("valid filter regex")
});
static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Variable `([^`]+)` not found").expect("valid variable regex")
});
static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bline (\d+)").expect("valid line regex"));
static POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)").expect("valid position regex"));
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid ident regex"));

/// Category of a template failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateErrorKind {
    /// The failure could not be attributed to a more specific category.
    Unknown,
    /// A bare top-level name is not present in the context.
    MissingVariable,
    /// A filter referenced by the template is not registered.
    MissingFilter,
    /// An attribute or index lookup on a value found nothing.
    MissingItem,
    /// The template text does not parse.
    Syntax,
}

impl TemplateErrorKind {
    /// Stable snake_case identifier, suitable for logs and JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::MissingVariable => "missing_variable",
            Self::MissingFilter => "missing_filter",
            Self::MissingItem => "missing_item",
            Self::Syntax => "syntax",
        }
    }
}

impl fmt::Display for TemplateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified template failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TemplateError {
    /// What kind of failure this is.
    pub kind: TemplateErrorKind,
    /// The missing variable, filter, or item key, when one was recognized.
    pub name: Option<String>,
    /// Full lookup expression for missing variables and items (`params.app`).
    pub lookup: Option<String>,
    /// 1-based source line, when the engine reported one.
    pub line: Option<usize>,
    /// Cleaned engine message (the whole source chain, internal names removed).
    pub message: String,
}

impl TemplateError {
    /// Build an unclassified error from a plain message.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: TemplateErrorKind::Unknown,
            name: None,
            lookup: None,
            line: None,
            message: message.into(),
        }
    }

    /// Generate a multi-line diagnostic with suggestions drawn from `context`.
    pub fn format_with_context(&self, context: &TemplateContext) -> String {
        let mut msg = String::new();

        let header = match self.kind {
            TemplateErrorKind::MissingVariable => "Template Variable Not Found",
            TemplateErrorKind::MissingItem => "Template Item Not Found",
            TemplateErrorKind::MissingFilter => "Template Filter Not Found",
            TemplateErrorKind::Syntax => "Template Syntax Error",
            TemplateErrorKind::Unknown => "Template Rendering Failed",
        };
        msg.push_str(&format!("ERROR: {header}\n\n"));

        if let Some(lookup) = self.lookup.as_deref().or(self.name.as_deref()) {
            msg.push_str(&format!("Name: {lookup}\n"));
        }
        if let Some(line) = self.line {
            msg.push_str(&format!("Line: {line}\n"));
        }
        msg.push_str(&format!("Error: {}\n", self.message));

        if matches!(self.kind, TemplateErrorKind::MissingVariable | TemplateErrorKind::MissingItem)
        {
            let target = self.lookup.as_deref().or(self.name.as_deref()).unwrap_or_default();
            let available = available_variables(context);
            let suggestions = find_similar_variables(target, &available);
            if !suggestions.is_empty() {
                msg.push_str("\nDid you mean one of these?\n");
                for suggestion in suggestions {
                    msg.push_str(&format!("  - {suggestion}\n"));
                }
            }
        }

        msg
    }
}

/// Classify an engine failure.
///
/// Passing an error that already is a [`TemplateError`] returns a clone of it,
/// so classification can be applied at every layer without loss.
pub fn classify(error: &(dyn std::error::Error + 'static)) -> TemplateError {
    if let Some(existing) = error.downcast_ref::<TemplateError>() {
        return existing.clone();
    }

    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }

    classify_message(&messages.join("\n"))
}

/// Classify a raw failure message.
pub fn classify_message(raw: &str) -> TemplateError {
    let mut error = TemplateError::unknown(clean_message(raw));
    error.line = extract_line(raw);

    if let Some(caps) = FILTER_RE.captures(raw) {
        error.kind = TemplateErrorKind::MissingFilter;
        error.name = Some(caps[1].to_string());
    } else if let Some(caps) = VARIABLE_RE.captures(raw) {
        let lookup = caps[1].trim().to_string();
        if IDENT_RE.is_match(&lookup) {
            error.kind = TemplateErrorKind::MissingVariable;
            error.name = Some(lookup.clone());
        } else {
            error.kind = TemplateErrorKind::MissingItem;
            error.name = Some(trailing_segment(&lookup));
        }
        error.lookup = Some(lookup);
    } else if raw.contains("Failed to parse") {
        error.kind = TemplateErrorKind::Syntax;
    }

    error
}

/// Remove Tera's references to the internal template name and join the chain.
fn clean_message(raw: &str) -> String {
    let quoted = format!("'{TEMPLATE_NAME}'");
    let mut parts = Vec::new();

    for line in raw.split('\n') {
        let cleaned = line
            .replace(&format!("while rendering {quoted}"), "")
            .replace(&format!("Failed to render {quoted}"), "")
            .replace(&format!("Failed to parse {quoted}"), "")
            .replace(&quoted, "template")
            .trim_end()
            .to_string();
        if !cleaned.trim().is_empty() {
            parts.push(cleaned.trim().to_string());
        }
    }

    if parts.is_empty() {
        "template rendering failed".to_string()
    } else {
        parts.join(": ")
    }
}

fn extract_line(raw: &str) -> Option<usize> {
    LINE_RE
        .captures(raw)
        .or_else(|| POSITION_RE.captures(raw))
        .and_then(|caps| caps[1].parse::<usize>().ok())
        .filter(|line| *line > 0)
}

/// Last key of a lookup expression: `a.b.c` -> `c`, `a["b"]` -> `b`, `a[0]` -> `0`.
fn trailing_segment(lookup: &str) -> String {
    if let Some(stripped) = lookup.strip_suffix(']') {
        if let Some(open) = stripped.rfind('[') {
            return stripped[open + 1..].trim_matches(|c| c == '"' || c == '\'').to_string();
        }
    }
    lookup.rsplit('.').next().unwrap_or(lookup).to_string()
}

/// Dotted names reachable in `context`, three levels deep.
fn available_variables(context: &TemplateContext) -> Vec<String> {
    fn walk(prefix: &str, value: &serde_json::Value, depth: usize, out: &mut BTreeSet<String>) {
        out.insert(prefix.to_string());
        if depth == 0 {
            return;
        }
        if let Some(map) = value.as_object() {
            for (key, child) in map {
                walk(&format!("{prefix}.{key}"), child, depth - 1, out);
            }
        }
    }

    let mut out = BTreeSet::new();
    for (key, value) in context {
        walk(key, value, 2, &mut out);
    }
    out.into_iter().collect()
}

fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> =
        available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();
    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist > 0 && *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(var, _)| var)
        .collect()
}
