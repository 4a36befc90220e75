//! Destination conflict resolution.

use std::io::{self, Read};

use super::options::ConflictPolicy;
use crate::core::{FileOperation, RenderFsError};
use crate::writers::Writer;

/// Disposition of a rendered file against the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing exists at the path.
    Create,
    /// Different content exists and will be replaced.
    Update,
    /// Different content exists and is kept.
    Skip,
    /// The destination already holds exactly these bytes.
    Identical,
}

/// Compare `content` against whatever `destination` holds at `path`.
///
/// # Errors
///
/// Fails on any open or read error other than not-found, and with
/// [`RenderFsError::Conflict`] when the content differs under
/// [`ConflictPolicy::Fail`].
pub fn resolve(
    destination: &dyn Writer,
    path: &str,
    content: &[u8],
    policy: ConflictPolicy,
) -> Result<Decision, RenderFsError> {
    let mut existing = match destination.open(path) {
        Ok(reader) => reader,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Decision::Create),
        Err(err) => return Err(RenderFsError::io(FileOperation::CheckDestination, path, err)),
    };

    let mut current = Vec::new();
    existing
        .read_to_end(&mut current)
        .map_err(|err| RenderFsError::io(FileOperation::ReadExisting, path, err))?;

    if current == content {
        return Ok(Decision::Identical);
    }

    match policy {
        ConflictPolicy::Overwrite => Ok(Decision::Update),
        ConflictPolicy::Skip => Ok(Decision::Skip),
        ConflictPolicy::Fail => Err(RenderFsError::Conflict { path: path.to_string() }),
    }
}
