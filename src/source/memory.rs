//! In-memory source tree.

use std::collections::BTreeMap;
use std::io;

use super::{SourceEntry, SourceTree};
use crate::utils::path::{clean_path, file_name, parent};

#[derive(Debug, Clone)]
enum Node {
    Dir { mode: u32 },
    File { data: Vec<u8>, mode: u32 },
    Symlink { target: String },
}

/// A source tree held in memory.
///
/// Parents of inserted paths are created implicitly with no mode bits.
///
/// ```
/// use renderfs::source::{MemorySource, SourceTree};
///
/// let source = MemorySource::new()
///     .with_file("docs/README.md.jinja", "Project: {{ name }}\n")
///     .with_symlink("latest", "docs");
///
/// assert!(source.exists("docs"));
/// assert_eq!(source.read_dir("").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    nodes: BTreeMap<String, Node>,
}

impl MemorySource {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file without mode bits.
    #[must_use]
    pub fn with_file(self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.with_file_mode(path, data, 0)
    }

    /// Add a file with explicit permission bits.
    #[must_use]
    pub fn with_file_mode(mut self, path: &str, data: impl Into<Vec<u8>>, mode: u32) -> Self {
        self.insert(
            path,
            Node::File {
                data: data.into(),
                mode,
            },
        );
        self
    }

    /// Add a directory without mode bits.
    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        self.with_dir_mode(path, 0)
    }

    /// Add a directory with explicit permission bits.
    #[must_use]
    pub fn with_dir_mode(mut self, path: &str, mode: u32) -> Self {
        self.insert(path, Node::Dir { mode });
        self
    }

    /// Add a symlink pointing at `target`. The target is stored verbatim.
    #[must_use]
    pub fn with_symlink(mut self, path: &str, target: &str) -> Self {
        self.insert(path, Node::Symlink { target: target.to_string() });
        self
    }

    fn insert(&mut self, path: &str, node: Node) {
        let path = clean_path(path.trim_start_matches('/'));
        let mut ancestor = parent(&path);
        while let Some(dir) = ancestor {
            self.nodes.entry(dir.to_string()).or_insert(Node::Dir { mode: 0 });
            ancestor = parent(dir);
        }
        self.nodes.insert(path, node);
    }

    fn lookup(&self, path: &str) -> io::Result<&Node> {
        self.nodes.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {path}"))
        })
    }
}

impl SourceTree for MemorySource {
    fn read_dir(&self, path: &str) -> io::Result<Vec<SourceEntry>> {
        if !path.is_empty() {
            match self.lookup(path)? {
                Node::Dir { .. } => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("not a directory: {path}"),
                    ));
                }
            }
        }

        let wanted = if path.is_empty() { None } else { Some(path) };
        let mut entries: Vec<SourceEntry> = self
            .nodes
            .iter()
            .filter(|(candidate, _)| parent(candidate) == wanted)
            .map(|(candidate, node)| {
                let (is_dir, is_symlink, mode) = match node {
                    Node::Dir { mode } => (true, false, *mode),
                    Node::File { mode, .. } => (false, false, *mode),
                    Node::Symlink { .. } => (false, true, 0),
                };
                SourceEntry {
                    path: candidate.clone(),
                    is_dir,
                    is_symlink,
                    mode,
                }
            })
            .collect();
        entries.sort_by(|a, b| file_name(&a.path).cmp(file_name(&b.path)));
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        match self.lookup(path)? {
            Node::File { data, .. } => Ok(data.clone()),
            Node::Dir { .. } => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path}"),
            )),
            Node::Symlink { .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a symlink: {path}"),
            )),
        }
    }

    fn read_link(&self, path: &str) -> io::Result<String> {
        match self.lookup(path)? {
            Node::Symlink { target } => Ok(target.clone()),
            _ => Err(io::Error::new(io::ErrorKind::InvalidInput, format!("not a symlink: {path}"))),
        }
    }

    fn exists(&self, path: &str) -> bool {
        path.is_empty() || self.nodes.contains_key(path)
    }
}
