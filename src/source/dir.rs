//! Native filesystem source.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{SourceEntry, SourceTree};
use crate::utils::path::{join, to_native};

/// A directory on the local filesystem.
///
/// Links are never followed while listing: a symlink shows up as an entry
/// with `is_symlink` set and is resolved only through [`SourceTree::read_link`].
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this source.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn native(&self, path: &str) -> PathBuf {
        to_native(&self.root, path)
    }
}

impl SourceTree for DirSource {
    fn read_dir(&self, path: &str) -> io::Result<Vec<SourceEntry>> {
        let dir = self.native(path);
        let mut entries = Vec::new();

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let name = entry.file_name().to_string_lossy();
            let file_type = entry.file_type();
            let metadata = entry.metadata().map_err(io::Error::from)?;

            entries.push(SourceEntry {
                path: join(path, &name),
                is_dir: file_type.is_dir(),
                is_symlink: file_type.is_symlink(),
                mode: permission_bits(&metadata),
            });
        }

        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.native(path))
    }

    fn read_link(&self, path: &str) -> io::Result<String> {
        let target = std::fs::read_link(self.native(path))?;
        Ok(target.to_string_lossy().replace('\\', "/"))
    }

    fn exists(&self, path: &str) -> bool {
        std::fs::symlink_metadata(self.native(path)).is_ok()
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(_metadata: &std::fs::Metadata) -> u32 {
    0
}
