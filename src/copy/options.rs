//! Per-invocation options and the statistics a copy reports.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::templating::{TemplateContext, TemplateEnvironment};

/// What to do when a destination file exists with different content.
///
/// Identical content is never a conflict, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Replace the existing content.
    #[default]
    Overwrite,
    /// Leave the existing content untouched.
    Skip,
    /// Abort the copy with a conflict error.
    Fail,
}

impl ConflictPolicy {
    /// Parse a policy name, falling back to [`ConflictPolicy::Overwrite`] for
    /// anything unrecognized.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("Unknown conflict policy '{}', using overwrite", value);
            Self::Overwrite
        })
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown conflict policy: {other}")),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
            Self::Fail => "fail",
        })
    }
}

/// Options for a single copy.
///
/// ```
/// use renderfs::copy::{ConflictPolicy, Options};
///
/// let options = Options::new()
///     .with_value("project_name", "demo")
///     .strict(true)
///     .on_conflict(ConflictPolicy::Skip)
///     .ignore(["target/", "*.log"]);
/// assert_eq!(options.ignore_patterns.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Template data for paths and contents.
    pub context: TemplateContext,
    /// Engine environment; the shared default when unset.
    pub environment: Option<Arc<TemplateEnvironment>>,
    /// Fail on undefined variables instead of rendering them empty.
    pub strict_variables: bool,
    /// Render content that sniffs as binary instead of copying it verbatim.
    pub template_binary: bool,
    /// Conflict policy for differing destination files.
    pub on_conflict: ConflictPolicy,
    /// Gitignore-style patterns. When empty, the ignore-file at the source
    /// root is used instead.
    pub ignore_patterns: Vec<String>,
}

impl Options {
    /// Default options: empty context, lenient, overwrite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole template context.
    #[must_use]
    pub fn with_context(mut self, context: TemplateContext) -> Self {
        self.context = context;
        self
    }

    /// Set one context value.
    #[must_use]
    pub fn with_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Use a custom engine environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Arc<TemplateEnvironment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Toggle strict undefined-variable handling.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    /// Toggle rendering of binary content.
    #[must_use]
    pub fn template_binary(mut self, enabled: bool) -> Self {
        self.template_binary = enabled;
        self
    }

    /// Set the conflict policy.
    #[must_use]
    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = policy;
        self
    }

    /// Append ignore patterns.
    #[must_use]
    pub fn ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }
}

/// Outcome counters of a copy.
///
/// Only regular files are counted. Ignored entries, entries whose path
/// renders empty, directories and symlinks are not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Files written where nothing existed.
    pub created: usize,
    /// Files rewritten because content differed.
    pub updated: usize,
    /// Files left alone under the skip policy.
    pub skipped: usize,
    /// Files whose destination already held the rendered bytes.
    pub identical: usize,
}

impl Stats {
    /// Number of files dispositioned.
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.identical
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, updated {}, skipped {}, identical {}",
            self.created, self.updated, self.skipped, self.identical
        )
    }
}
