//! Test utilities for renderfs
//!
//! Helpers shared by unit and integration tests: once-only logging setup and
//! small builders for source trees on disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use renderfs::test_utils::{TreeFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let fixture = TreeFixture::new()
//!     .unwrap()
//!     .file("README.md.jinja", "Project: {{ project_name }}\n")
//!     .unwrap();
//! assert!(fixture.source_path().join("README.md.jinja").exists());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::source::DirSource;
use crate::templating::TemplateContext;
use crate::writers::DirWriter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG` when set, otherwise stays
/// silent. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// A temporary source directory and destination directory pair.
pub struct TreeFixture {
    temp: TempDir,
}

impl TreeFixture {
    /// Fresh fixture with empty `source/` and no `dest/` yet.
    ///
    /// # Errors
    ///
    /// Fails when the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        std::fs::create_dir_all(temp.path().join("source"))
            .context("Failed to create source dir")?;
        Ok(Self { temp })
    }

    /// Root of the source tree.
    pub fn source_path(&self) -> PathBuf {
        self.temp.path().join("source")
    }

    /// Root of the destination tree.
    pub fn dest_path(&self) -> PathBuf {
        self.temp.path().join("dest")
    }

    /// Temporary directory holding both trees.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write a source file, creating parents.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors.
    pub fn file(self, path: &str, content: impl AsRef<[u8]>) -> Result<Self> {
        write_file(&self.source_path().join(path), content.as_ref())?;
        Ok(self)
    }

    /// Write a destination file ahead of a copy, creating parents.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors.
    pub fn existing(self, path: &str, content: impl AsRef<[u8]>) -> Result<Self> {
        write_file(&self.dest_path().join(path), content.as_ref())?;
        Ok(self)
    }

    /// Source handle over the fixture.
    pub fn source(&self) -> DirSource {
        DirSource::new(self.source_path())
    }

    /// Destination writer over the fixture.
    ///
    /// # Errors
    ///
    /// Fails when the destination root cannot be created.
    pub fn writer(&self) -> Result<DirWriter> {
        DirWriter::new(self.dest_path()).context("Failed to create destination writer")
    }

    /// Read a destination file as UTF-8.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or not UTF-8.
    pub fn read_dest(&self, path: &str) -> Result<String> {
        let full = self.dest_path().join(path);
        std::fs::read_to_string(&full).with_context(|| format!("Failed to read {}", full.display()))
    }

    /// Whether anything exists at a destination path (links not followed).
    pub fn dest_exists(&self, path: &str) -> bool {
        std::fs::symlink_metadata(self.dest_path().join(path)).is_ok()
    }
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Template context from a JSON object literal.
///
/// Anything other than an object yields an empty context.
pub fn context(value: serde_json::Value) -> TemplateContext {
    match value {
        serde_json::Value::Object(map) => map,
        _ => TemplateContext::new(),
    }
}
