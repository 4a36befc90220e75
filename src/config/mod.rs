//! Configuration and template data loading for the `renderfs` binary.
//!
//! Three layers feed a copy, later layers winning:
//!
//! 1. **Config file** (`renderfs.toml`) - defaults for flags and a `[context]`
//!    table. Read from `--config` when given, otherwise from the working
//!    directory when present.
//! 2. **Data files** (`--data`) - JSON, YAML or TOML mappings, merged in the
//!    order given.
//! 3. **Inline values** (`--set key=value`) - applied last.
//!
//! Context layers are deep-merged: mappings merge key by key, any other value
//! replaces what was there.
//!
//! ```toml
//! strict = true
//! template_binary = false
//! on_conflict = "skip"
//! ignore = ["target/", "*.log"]
//!
//! [context]
//! project_name = "demo"
//! features = { docker = true }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants::CONFIG_FILE_NAME;
use crate::copy::ConflictPolicy;
use crate::templating::TemplateContext;

/// Contents of a `renderfs.toml` file.
///
/// Unset fields leave the command-line defaults alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Fail on undefined variables.
    pub strict: Option<bool>,
    /// Render binary content too.
    pub template_binary: Option<bool>,
    /// `overwrite`, `skip` or `fail`. Unknown values fall back to overwrite.
    pub on_conflict: Option<String>,
    /// Gitignore-style patterns.
    pub ignore: Vec<String>,
    /// Base template data.
    pub context: TemplateContext,
}

impl RenderConfig {
    /// Parse the config file at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid config TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load `explicit` when given, otherwise `renderfs.toml` from `dir` if it
    /// exists, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Fails when an explicit path is missing or any found file is invalid.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!("Using config {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Parsed conflict policy, when set.
    pub fn conflict_policy(&self) -> Option<ConflictPolicy> {
        self.on_conflict.as_deref().map(ConflictPolicy::parse_or_default)
    }
}

/// Read a data file as a template context, choosing the format by extension.
///
/// # Errors
///
/// Fails on unreadable files, unknown extensions, parse errors, and documents
/// whose top level is not a mapping.
pub fn load_data_file(path: &Path) -> Result<TemplateContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let value: Value = match extension.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON data file {}", path.display()))?,
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML data file {}", path.display()))?,
        "toml" => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML data file {}", path.display()))?,
        other => bail!(
            "Unsupported data file extension '{}' for {} (expected json, yaml, yml or toml)",
            other,
            path.display()
        ),
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(TemplateContext::new()),
        _ => Err(anyhow!("Data file {} must contain a mapping at the top level", path.display())),
    }
}

/// Deep-merge `overlay` into `base`.
pub fn merge_context(base: &mut TemplateContext, overlay: TemplateContext) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_context(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Parse a `key=value` assignment into a one-entry context.
///
/// The value is read as JSON when it parses (`3`, `true`, `["a"]`), and as a
/// plain string otherwise. Dotted keys build nested mappings.
///
/// ```
/// use renderfs::config::parse_assignment;
/// use serde_json::json;
///
/// let ctx = parse_assignment("features.docker=true").unwrap();
/// assert_eq!(ctx["features"], json!({ "docker": true }));
/// assert_eq!(parse_assignment("name=demo").unwrap()["name"], json!("demo"));
/// ```
///
/// # Errors
///
/// Fails without `=` or with an empty key segment.
pub fn parse_assignment(assignment: &str) -> Result<TemplateContext> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid assignment '{}': expected key=value", assignment))?;

    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        bail!("Invalid assignment '{}': empty key", assignment);
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut segments = key.rsplit('.');
    let mut nested = TemplateContext::new();
    if let Some(last) = segments.next() {
        nested.insert(last.to_string(), value);
    }
    for segment in segments {
        let mut outer = TemplateContext::new();
        outer.insert(segment.to_string(), Value::Object(nested));
        nested = outer;
    }
    Ok(nested)
}

/// Build the final context from config, data files and assignments.
///
/// # Errors
///
/// Propagates data file and assignment errors.
pub fn build_context(
    config: &RenderConfig,
    data_files: &[PathBuf],
    assignments: &[String],
) -> Result<TemplateContext> {
    let mut context = config.context.clone();
    for path in data_files {
        merge_context(&mut context, load_data_file(path)?);
    }
    for assignment in assignments {
        merge_context(&mut context, parse_assignment(assignment)?);
    }
    Ok(context)
}
