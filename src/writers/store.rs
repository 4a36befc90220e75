//! Entry bookkeeping shared by the in-memory and archive writers.

use std::collections::BTreeMap;
use std::io;

use crate::utils::path::{clean_path, escapes_root, is_windows_abs, join, parent};

/// Bound on symlink hops while resolving a path.
const MAX_LINK_DEPTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Dir { mode: u32 },
    File { data: Vec<u8>, mode: u32 },
    Symlink { target: String },
}

#[derive(Debug, Default)]
pub(crate) struct EntryStore {
    nodes: BTreeMap<String, Node>,
}

impl EntryStore {
    pub(crate) fn get(&self, path: &str) -> Option<&Node> {
        self.nodes.get(&normalize(path))
    }

    pub(crate) fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    /// Create missing directories along `path`. Returns the ones created,
    /// outermost first.
    pub(crate) fn mkdir_all(&mut self, path: &str, mode: u32) -> io::Result<Vec<String>> {
        let path = normalize(path);
        let mut created = Vec::new();
        if path == "." {
            return Ok(created);
        }

        let mut current = String::new();
        for segment in path.split('/') {
            current = join(&current, segment);
            match self.nodes.get(&current) {
                Some(Node::Dir { .. }) => {}
                Some(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("not a directory: {current}"),
                    ));
                }
                None => {
                    self.nodes.insert(current.clone(), Node::Dir { mode });
                    created.push(current.clone());
                }
            }
        }
        Ok(created)
    }

    /// Where a write to `path` lands after following symlinks.
    ///
    /// Fails when the target is a directory or its parent is missing.
    pub(crate) fn file_target(&self, path: &str) -> io::Result<String> {
        let resolved = self.resolve(&normalize(path))?;
        match self.nodes.get(&resolved) {
            Some(Node::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {resolved}"),
            )),
            _ => {
                if let Some(dir) = parent(&resolved) {
                    if !matches!(self.nodes.get(dir), Some(Node::Dir { .. })) {
                        return Err(io::Error::new(
                            io::ErrorKind::NotFound,
                            format!("parent directory missing: {dir}"),
                        ));
                    }
                }
                Ok(resolved)
            }
        }
    }

    /// Store `data` at a path returned by [`file_target`](Self::file_target).
    /// An existing file keeps its mode.
    pub(crate) fn put_file(&mut self, path: &str, data: Vec<u8>, mode: u32) {
        let mode = match self.nodes.get(path) {
            Some(Node::File { mode, .. }) => *mode,
            _ => mode,
        };
        self.nodes.insert(
            path.to_string(),
            Node::File {
                data,
                mode,
            },
        );
    }

    pub(crate) fn symlink(&mut self, target: &str, link: &str) -> io::Result<()> {
        let link = normalize(link);
        match self.nodes.get(&link) {
            Some(Node::Symlink { target: existing }) if existing == target => Ok(()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("already exists: {link}"),
            )),
            None => {
                if let Some(dir) = parent(&link) {
                    self.mkdir_all(dir, crate::constants::DEFAULT_DIR_MODE)?;
                }
                self.nodes.insert(link, Node::Symlink { target: target.to_string() });
                Ok(())
            }
        }
    }

    /// Content of the file at `path`, following symlinks.
    pub(crate) fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let resolved = self.resolve(&normalize(path))?;
        match self.nodes.get(&resolved) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {resolved}"),
            )),
            Some(Node::Symlink { .. }) | None => Err(not_found(path)),
        }
    }

    fn resolve(&self, path: &str) -> io::Result<String> {
        let mut current = path.to_string();
        for _ in 0..MAX_LINK_DEPTH {
            match self.nodes.get(&current) {
                Some(Node::Symlink { target }) => {
                    current = link_destination(&current, target).ok_or_else(|| not_found(path))?;
                }
                _ => return Ok(current),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("too many levels of symbolic links: {path}"),
        ))
    }
}

/// Store-relative path a symlink at `link` pointing to `target` refers to.
/// Absolute targets and targets leaving the store resolve to nothing.
fn link_destination(link: &str, target: &str) -> Option<String> {
    if target.starts_with('/') || is_windows_abs(target) {
        return None;
    }
    let joined = clean_path(&join(parent(link).unwrap_or(""), target));
    if escapes_root(&joined) { None } else { Some(joined) }
}

fn normalize(path: &str) -> String {
    clean_path(path.trim_start_matches('/'))
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
}
