//! The copy orchestrator.
//!
//! A copy walks a [`SourceTree`] in pre-order and, for every entry below the
//! root, runs the same pipeline:
//!
//! 1. **Ignore** - entries matched by the [`IgnoreMatcher`] are dropped; an
//!    ignored directory is never descended into. The ignore-file at the root
//!    is never copied.
//! 2. **Path** - [`render_path`] produces the destination path. An empty
//!    result drops the entry (and, for a directory, its whole subtree).
//! 3. **Symlink** - links are recreated verbatim and never descended into.
//! 4. **Directory** - created with the source mode, then walked.
//! 5. **File** - content goes through [`render_bytes`], then [`resolve`]
//!    decides between create, update, skip and identical before anything is
//!    written.
//!
//! The walk is sequential and stops at the first error. Everything written
//! before that point stays in place, and the [`Stats`] gathered so far travel
//! with the error in a [`CopyFailure`].
//!
//! # Example
//!
//! ```
//! use renderfs::copy::{Copier, Options};
//! use renderfs::source::MemorySource;
//! use renderfs::writers::MemoryWriter;
//!
//! let source = MemorySource::new()
//!     .with_file("README.md.jinja", "Project: {{ project_name }}\n")
//!     .with_file("{% if docker %}compose.yaml{% endif %}", "services: {}\n");
//! let destination = MemoryWriter::new();
//!
//! let stats = Copier::new(Options::new().with_value("project_name", "X"))
//!     .source(&source)
//!     .destination(&destination)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(stats.created, 1);
//! assert_eq!(destination.contents_string("README.md").as_deref(), Some("Project: X\n"));
//! assert_eq!(destination.files(), vec!["README.md"]);
//! ```

pub mod conflict;
pub mod content;
pub mod ignore;
pub mod options;
pub mod path;

pub use conflict::{Decision, resolve};
pub use content::render_bytes;
pub use ignore::IgnoreMatcher;
pub use options::{ConflictPolicy, Options, Stats};
pub use path::render_path;

use std::io::{self, Write};

use tracing::{debug, info};

use crate::constants::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, IGNORE_FILE_NAME};
use crate::core::{CopyFailure, FileOperation, RenderFsError};
use crate::source::{SourceEntry, SourceTree};
use crate::utils::path::parent;
use crate::writers::Writer;

/// Configures and runs a copy.
///
/// Source and destination are optional until [`run`](Self::run), which
/// refuses to start without both.
pub struct Copier<'a> {
    source: Option<&'a dyn SourceTree>,
    destination: Option<&'a dyn Writer>,
    options: Options,
}

impl<'a> Copier<'a> {
    /// A copier with `options` and no source or destination yet.
    pub fn new(options: Options) -> Self {
        Self {
            source: None,
            destination: None,
            options,
        }
    }

    /// Tree to read from.
    #[must_use]
    pub fn source(mut self, source: &'a dyn SourceTree) -> Self {
        self.source = Some(source);
        self
    }

    /// Store to write into.
    #[must_use]
    pub fn destination(mut self, destination: &'a dyn Writer) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Walk the source and materialize it into the destination.
    ///
    /// # Errors
    ///
    /// Returns a [`CopyFailure`] carrying the first error and the statistics
    /// accumulated before it. Setup errors (missing source or destination,
    /// invalid ignore patterns) are raised before anything is written.
    pub fn run(&self) -> Result<Stats, CopyFailure> {
        let source = self
            .source
            .ok_or_else(|| CopyFailure::new(Stats::default(), RenderFsError::MissingSource))?;
        let destination = self
            .destination
            .ok_or_else(|| CopyFailure::new(Stats::default(), RenderFsError::MissingDestination))?;

        let matcher = IgnoreMatcher::for_source(source, &self.options.ignore_patterns)
            .map_err(|error| CopyFailure::new(Stats::default(), error))?;

        let mut walk = Walk {
            source,
            destination,
            options: &self.options,
            matcher,
            stats: Stats::default(),
        };

        debug!(
            "Starting copy (strict: {}, template_binary: {}, on_conflict: {})",
            self.options.strict_variables, self.options.template_binary, self.options.on_conflict
        );

        match walk.walk_dir("") {
            Ok(()) => {
                info!("Copy finished: {}", walk.stats);
                Ok(walk.stats)
            }
            Err(error) => {
                debug!("Copy aborted after {}: {}", walk.stats, error);
                Err(CopyFailure::new(walk.stats, error))
            }
        }
    }
}

/// Render `source` into `destination` with `options`.
///
/// # Errors
///
/// See [`Copier::run`].
pub fn copy(
    source: &dyn SourceTree,
    destination: &dyn Writer,
    options: Options,
) -> Result<Stats, CopyFailure> {
    Copier::new(options).source(source).destination(destination).run()
}

struct Walk<'a> {
    source: &'a dyn SourceTree,
    destination: &'a dyn Writer,
    options: &'a Options,
    matcher: Option<IgnoreMatcher>,
    stats: Stats,
}

impl Walk<'_> {
    fn walk_dir(&mut self, dir: &str) -> Result<(), RenderFsError> {
        let entries = self
            .source
            .read_dir(dir)
            .map_err(|err| RenderFsError::io(FileOperation::ListDir, display_dir(dir), err))?;

        for entry in &entries {
            self.visit(entry)?;
        }
        Ok(())
    }

    fn visit(&mut self, entry: &SourceEntry) -> Result<(), RenderFsError> {
        if let Some(matcher) = &self.matcher {
            if matcher.matches_path(&entry.path, entry.is_dir) {
                debug!("Ignoring {}", entry.path);
                return Ok(());
            }
        }

        if entry.path == IGNORE_FILE_NAME {
            return Ok(());
        }

        let rendered = render_path(
            &entry.path,
            entry.is_dir,
            &self.options.context,
            self.options.strict_variables,
            self.options.environment.as_deref(),
        )
        .map_err(|source| RenderFsError::RenderPath {
            path: entry.path.clone(),
            source,
        })?;

        let Some(rendered) = rendered else {
            debug!("Skipping {} (path rendered empty)", entry.path);
            return Ok(());
        };

        if entry.is_symlink {
            return self.copy_symlink(entry, &rendered);
        }

        if entry.is_dir {
            self.destination
                .mkdir_all(&rendered, mode_or(entry.mode, DEFAULT_DIR_MODE))
                .map_err(|err| RenderFsError::io(FileOperation::CreateDir, &rendered, err))?;
            debug!("Created directory {}", rendered);
            return self.walk_dir(&entry.path);
        }

        self.copy_file(entry, &rendered)
    }

    fn copy_symlink(&mut self, entry: &SourceEntry, rendered: &str) -> Result<(), RenderFsError> {
        let target = self.source.read_link(&entry.path).map_err(|err| {
            if err.kind() == io::ErrorKind::Unsupported {
                RenderFsError::SymlinkUnsupported { path: entry.path.clone() }
            } else {
                RenderFsError::io(FileOperation::ReadLink, &entry.path, err)
            }
        })?;

        self.destination
            .symlink(&target, rendered)
            .map_err(|err| RenderFsError::io(FileOperation::Symlink, rendered, err))?;
        debug!("Linked {} -> {}", rendered, target);
        Ok(())
    }

    fn copy_file(&mut self, entry: &SourceEntry, rendered: &str) -> Result<(), RenderFsError> {
        let raw = self
            .source
            .read_file(&entry.path)
            .map_err(|err| RenderFsError::io(FileOperation::Read, &entry.path, err))?;

        let content = render_bytes(
            &raw,
            &self.options.context,
            self.options.template_binary,
            self.options.strict_variables,
            self.options.environment.as_deref(),
        )
        .map_err(|source| RenderFsError::RenderFile {
            path: entry.path.clone(),
            source,
        })?;

        match resolve(self.destination, rendered, &content, self.options.on_conflict)? {
            Decision::Identical => {
                self.stats.identical += 1;
                debug!("Identical {}", rendered);
                return Ok(());
            }
            Decision::Skip => {
                self.stats.skipped += 1;
                debug!("Skipped {} (destination differs)", rendered);
                return Ok(());
            }
            Decision::Update => self.stats.updated += 1,
            Decision::Create => self.stats.created += 1,
        }

        if let Some(dir) = parent(rendered) {
            self.destination
                .mkdir_all(dir, DEFAULT_DIR_MODE)
                .map_err(|err| RenderFsError::io(FileOperation::CreateParent, dir, err))?;
        }

        let mut handle = self
            .destination
            .create_file(rendered, mode_or(entry.mode, DEFAULT_FILE_MODE))
            .map_err(|err| RenderFsError::io(FileOperation::CreateFile, rendered, err))?;

        let written = handle.write_all(&content);
        let closed = handle.close();
        written.map_err(|err| RenderFsError::io(FileOperation::Write, rendered, err))?;
        closed.map_err(|err| RenderFsError::io(FileOperation::Close, rendered, err))?;

        debug!("Wrote {} ({} bytes)", rendered, content.len());
        Ok(())
    }
}

fn mode_or(mode: u32, default: u32) -> u32 {
    match mode & 0o7777 {
        0 => default,
        bits => bits,
    }
}

fn display_dir(dir: &str) -> &str {
    if dir.is_empty() { "." } else { dir }
}
