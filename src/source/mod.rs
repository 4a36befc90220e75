//! Read-only source trees the copy engine walks.
//!
//! A [`SourceTree`] exposes directory listing, file reads and (optionally)
//! symlink resolution over `/`-separated relative paths. The empty path `""`
//! names the root.
//!
//! # Backends
//!
//! - [`DirSource`] - a directory on the native filesystem
//! - [`MemorySource`] - an in-memory tree, mostly for tests and embedding
//!
//! Listings are sorted by name, so a pre-order walk visits parents before
//! children and produces the same order on every platform.

pub mod dir;
pub mod memory;

pub use dir::DirSource;
pub use memory::MemorySource;

use std::io;

/// One node of a source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path relative to the tree root, `/`-separated.
    pub path: String,
    /// Whether the entry is a directory. A symlink to a directory is not.
    pub is_dir: bool,
    /// Whether the entry is a symbolic link.
    pub is_symlink: bool,
    /// Permission bits; `0` when the backend carries none.
    pub mode: u32,
}

impl SourceEntry {
    /// Final segment of the entry path.
    pub fn name(&self) -> &str {
        crate::utils::path::file_name(&self.path)
    }
}

/// Capability interface over a readable tree.
pub trait SourceTree {
    /// List the direct children of `path`, sorted by name.
    fn read_dir(&self, path: &str) -> io::Result<Vec<SourceEntry>>;

    /// Read the full content of the file at `path`.
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Target text of the symlink at `path`.
    ///
    /// Trees without symlink support keep the default, which fails with
    /// [`io::ErrorKind::Unsupported`].
    fn read_link(&self, path: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("symlinks are not supported: {path}"),
        ))
    }

    /// Whether anything exists at `path`.
    fn exists(&self, path: &str) -> bool;
}
