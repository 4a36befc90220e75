//! renderfs - template-driven tree copy
//!
//! Walks a source tree, renders every path and text file through
//! [Tera](https://keats.github.io/tera/) with a data context, and writes the
//! result into a destination while counting which files were created,
//! updated, skipped, or already identical.
//!
//! # Architecture Overview
//!
//! For every entry of the source tree, in pre-order:
//!
//! ```text
//! ignore matcher -> path renderer -> symlink | directory | file
//!                                                  |
//!                     content renderer -> conflict resolver -> writer
//! ```
//!
//! Path and content rendering share one process-wide cache of compiled
//! templates. Engine failures are classified (missing variable, filter, item,
//! syntax) before they surface.
//!
//! # Core Modules
//!
//! - [`copy`] - the orchestrator plus path, content, conflict and ignore stages
//! - [`templating`] - Tera binding, compiled-template cache, error classifier
//! - [`source`] - readable source trees (native directory, in-memory)
//! - [`writers`] - destinations (native directory, in-memory, zip archive)
//! - [`core`] - error types and user-facing error display
//! - [`utils`] - binary sniffing and lexical path helpers
//! - [`config`] - `renderfs.toml` and data file loading for the CLI
//! - [`cli`] - the `renderfs` command
//!
//! # Template Conventions
//!
//! - Paths are templates too: `{{ name }}/main.rs` lands under the rendered
//!   directory name.
//! - A path that renders empty is skipped, together with its subtree:
//!   `{% if docker %}compose.yaml{% endif %}`.
//! - `.jinja` and `.tmpl` are stripped from file names after rendering.
//! - Rendered paths may not leave the destination (`../`, `/`, `C:`).
//! - Binary files are copied verbatim unless binary templating is enabled.
//! - A `.renderfs-ignore` file at the source root lists gitignore-style
//!   exclusions when no explicit patterns are given; it is never copied.
//!
//! # Example
//!
//! ```rust,no_run
//! use renderfs::copy::{ConflictPolicy, Options, copy};
//! use renderfs::source::DirSource;
//! use renderfs::writers::DirWriter;
//!
//! # fn main() -> anyhow::Result<()> {
//! let source = DirSource::new("templates/service");
//! let destination = DirWriter::new("out/billing")?;
//! let options = Options::new()
//!     .with_value("project_name", "billing")
//!     .on_conflict(ConflictPolicy::Skip);
//!
//! let stats = copy(&source, &destination, options)?;
//! println!("{stats}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod copy;
pub mod core;
pub mod source;
pub mod templating;
pub mod utils;
pub mod writers;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use copy::{ConflictPolicy, Copier, Options, Stats, copy};
pub use core::{CopyFailure, RenderFsError};
