//! Native filesystem destination.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::{WriteHandle, Writer};
use crate::utils::path::to_native;

/// Writes into a directory on the local filesystem.
///
/// Permission bits are applied on unix and ignored elsewhere. Reads follow
/// symlinks, so a destination link to identical content compares as identical.
/// Writes follow existing links only when they resolve inside the root.
#[derive(Debug, Clone)]
pub struct DirWriter {
    root: PathBuf,
}

impl DirWriter {
    /// Writer rooted at `root`, creating the directory when missing.
    ///
    /// # Errors
    ///
    /// Fails when the root cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of this writer.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn native(&self, path: &str) -> PathBuf {
        to_native(&self.root, path)
    }

    /// Whether `native` is a symlink whose target lies outside the root.
    fn links_outside_root(&self, native: &Path) -> io::Result<bool> {
        match fs::symlink_metadata(native) {
            Ok(meta) if meta.file_type().is_symlink() => {}
            _ => return Ok(false),
        }
        let root = fs::canonicalize(&self.root)?;
        let resolved = match fs::canonicalize(native) {
            Ok(resolved) => resolved,
            Err(_) => {
                // Dangling link: the file would be created beside its target.
                let target = fs::read_link(native)?;
                let target = match native.parent() {
                    Some(dir) => dir.join(target),
                    None => target,
                };
                match (target.parent(), target.file_name()) {
                    (Some(dir), Some(name)) => fs::canonicalize(dir)?.join(name),
                    _ => return Ok(true),
                }
            }
        };
        Ok(!resolved.starts_with(root))
    }
}

struct DirFileHandle {
    file: BufWriter<File>,
}

impl Write for DirFileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl WriteHandle for DirFileHandle {
    fn close(self: Box<Self>) -> io::Result<()> {
        self.file.into_inner().map_err(io::IntoInnerError::into_error)?;
        Ok(())
    }
}

impl Writer for DirWriter {
    fn mkdir_all(&self, path: &str, mode: u32) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(self.native(path))
    }

    fn create_file(&self, path: &str, mode: u32) -> io::Result<Box<dyn WriteHandle + '_>> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        let native = self.native(path);
        if self.links_outside_root(&native)? {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("refusing to write through a symlink leaving the destination: {path}"),
            ));
        }
        let file = options.open(native)?;
        Ok(Box::new(DirFileHandle { file: BufWriter::new(file) }))
    }

    #[cfg(unix)]
    fn symlink(&self, target: &str, link: &str) -> io::Result<()> {
        let link_path = self.native(link);
        match fs::read_link(&link_path) {
            Ok(existing) if existing == Path::new(target) => Ok(()),
            _ => std::os::unix::fs::symlink(target, link_path),
        }
    }

    #[cfg(not(unix))]
    fn symlink(&self, _target: &str, link: &str) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("symlinks are not supported on this platform: {link}"),
        ))
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let native = self.native(path);
        if fs::metadata(&native)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path}"),
            ));
        }
        Ok(Box::new(File::open(native)?))
    }
}
