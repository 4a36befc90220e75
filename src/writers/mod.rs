//! Destination backends the copy engine writes into.
//!
//! A [`Writer`] offers four capabilities over `/`-separated paths relative to
//! its own root:
//!
//! - [`Writer::mkdir_all`] - create a directory and its missing ancestors
//! - [`Writer::create_file`] - create or truncate a file, returning a
//!   [`WriteHandle`] the caller must [`close`](WriteHandle::close)
//! - [`Writer::symlink`] - create a symbolic link
//! - [`Writer::open`] - read an existing file, failing with
//!   [`io::ErrorKind::NotFound`] when nothing is there
//!
//! # Backends
//!
//! - [`DirWriter`] - a directory on the native filesystem
//! - [`MemoryWriter`] - a shared in-memory store with inspection accessors
//! - [`ZipWriter`] - a zip archive built in one pass

pub mod archive;
pub mod dir;
pub mod memory;
mod store;

pub use archive::ZipWriter;
pub use dir::DirWriter;
pub use memory::MemoryWriter;

use std::io::{self, Read, Write};

/// Writable handle returned by [`Writer::create_file`].
///
/// Closing is explicit so that failures while flushing surface separately
/// from failures while writing.
pub trait WriteHandle: Write {
    /// Flush and release the handle.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Capability interface over a destination store.
pub trait Writer {
    /// Create `path` and all missing ancestors with `mode`. Succeeds when the
    /// directory already exists.
    fn mkdir_all(&self, path: &str, mode: u32) -> io::Result<()>;

    /// Create or truncate the file at `path`. `mode` applies to new files.
    fn create_file(&self, path: &str, mode: u32) -> io::Result<Box<dyn WriteHandle + '_>>;

    /// Create a symbolic link at `link` pointing to `target`.
    fn symlink(&self, target: &str, link: &str) -> io::Result<()>;

    /// Open the file at `path` for reading, following symlinks.
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;
}

pub(crate) fn lock_poisoned() -> io::Error {
    io::Error::other("writer state lock poisoned")
}
