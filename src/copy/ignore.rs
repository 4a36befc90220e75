//! Gitignore-style exclusion of source entries.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

use crate::constants::IGNORE_FILE_NAME;
use crate::core::{FileOperation, RenderFsError};
use crate::source::SourceTree;

/// Compiled ignore patterns.
///
/// Later patterns override earlier ones, a trailing `/` restricts a pattern
/// to directories, and `!` re-includes.
pub struct IgnoreMatcher {
    gitignore: Gitignore,
}

impl IgnoreMatcher {
    /// Compile `patterns`. Returns `None` when they contain no rule.
    ///
    /// # Errors
    ///
    /// Fails with [`RenderFsError::InvalidIgnorePattern`] on the first
    /// pattern that does not compile.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Option<Self>, RenderFsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(".");
        for pattern in patterns {
            let pattern = pattern.as_ref();
            builder.add_line(None, pattern).map_err(|source| RenderFsError::InvalidIgnorePattern {
                pattern: pattern.to_string(),
                source,
            })?;
        }

        let gitignore = builder.build().map_err(|source| RenderFsError::InvalidIgnorePattern {
            pattern: String::new(),
            source,
        })?;

        if gitignore.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self { gitignore }))
    }

    /// Matcher for a copy: the explicit `patterns` when any are given,
    /// otherwise the ignore-file at the root of `source` if it exists.
    ///
    /// # Errors
    ///
    /// Fails when the ignore-file cannot be read or a pattern does not compile.
    pub fn for_source(
        source: &dyn SourceTree,
        patterns: &[String],
    ) -> Result<Option<Self>, RenderFsError> {
        if !patterns.is_empty() {
            debug!("Using {} explicit ignore patterns", patterns.len());
            return Self::from_patterns(patterns);
        }

        if !source.exists(IGNORE_FILE_NAME) {
            return Ok(None);
        }

        let raw = source
            .read_file(IGNORE_FILE_NAME)
            .map_err(|err| {
                RenderFsError::io(FileOperation::ReadIgnoreFile, IGNORE_FILE_NAME, err)
            })?;
        let text = String::from_utf8_lossy(&raw);
        if text.contains('\u{FFFD}') {
            warn!("{} contains invalid UTF-8; affected lines may not match", IGNORE_FILE_NAME);
        }
        debug!("Loaded ignore patterns from {}", IGNORE_FILE_NAME);
        Self::from_patterns(text.lines())
    }

    /// Whether the entry at `path` is excluded.
    pub fn matches_path(&self, path: &str, is_dir: bool) -> bool {
        self.gitignore.matched(path, is_dir).is_ignore()
    }
}

impl std::fmt::Debug for IgnoreMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IgnoreMatcher")
            .field("rules", &self.gitignore.len())
            .finish()
    }
}
