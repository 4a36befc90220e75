//! In-memory destination.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex};

use super::store::{EntryStore, Node};
use super::{WriteHandle, Writer, lock_poisoned};

/// A destination held in memory.
///
/// Clones share the same store, so a test can hand one clone to the copy
/// engine and inspect the result through another.
///
/// ```
/// use std::io::Write;
///
/// use renderfs::writers::{MemoryWriter, Writer};
///
/// let writer = MemoryWriter::new();
/// writer.mkdir_all("docs", 0o755).unwrap();
/// let mut handle = writer.create_file("docs/a.txt", 0o644).unwrap();
/// handle.write_all(b"hello").unwrap();
/// handle.close().unwrap();
///
/// assert_eq!(writer.contents("docs/a.txt"), Some(b"hello".to_vec()));
/// assert_eq!(writer.file_mode("docs/a.txt"), Some(0o644));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    store: Arc<Mutex<EntryStore>>,
}

impl MemoryWriter {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Content of the file at `path`, following symlinks.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.store.lock().ok()?.read(path).ok()
    }

    /// Content of the file at `path` as UTF-8.
    pub fn contents_string(&self, path: &str) -> Option<String> {
        self.contents(path).and_then(|data| String::from_utf8(data).ok())
    }

    /// Mode of the file stored at `path`.
    pub fn file_mode(&self, path: &str) -> Option<u32> {
        match self.store.lock().ok()?.get(path) {
            Some(Node::File { mode, .. }) => Some(*mode),
            _ => None,
        }
    }

    /// Mode of the directory stored at `path`.
    pub fn dir_mode(&self, path: &str) -> Option<u32> {
        match self.store.lock().ok()?.get(path) {
            Some(Node::Dir { mode }) => Some(*mode),
            _ => None,
        }
    }

    /// Every symlink as `link -> target`.
    pub fn symlinks(&self) -> BTreeMap<String, String> {
        let Ok(store) = self.store.lock() else {
            return BTreeMap::new();
        };
        store
            .nodes()
            .iter()
            .filter_map(|(path, node)| match node {
                Node::Symlink { target } => Some((path.clone(), target.clone())),
                _ => None,
            })
            .collect()
    }

    /// Paths of every stored file, sorted.
    pub fn files(&self) -> Vec<String> {
        let Ok(store) = self.store.lock() else {
            return Vec::new();
        };
        store
            .nodes()
            .iter()
            .filter(|(_, node)| matches!(node, Node::File { .. }))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Whether a directory exists at `path`.
    pub fn is_dir(&self, path: &str) -> bool {
        self.dir_mode(path).is_some()
    }
}

struct MemoryFileHandle {
    store: Arc<Mutex<EntryStore>>,
    path: String,
    mode: u32,
    buffer: Vec<u8>,
}

impl Write for MemoryFileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteHandle for MemoryFileHandle {
    fn close(self: Box<Self>) -> io::Result<()> {
        let handle = *self;
        let mut store = handle.store.lock().map_err(|_| lock_poisoned())?;
        store.put_file(&handle.path, handle.buffer, handle.mode);
        Ok(())
    }
}

impl Writer for MemoryWriter {
    fn mkdir_all(&self, path: &str, mode: u32) -> io::Result<()> {
        let mut store = self.store.lock().map_err(|_| lock_poisoned())?;
        store.mkdir_all(path, mode).map(|_| ())
    }

    fn create_file(&self, path: &str, mode: u32) -> io::Result<Box<dyn WriteHandle + '_>> {
        let mut store = self.store.lock().map_err(|_| lock_poisoned())?;
        let target = store.file_target(path)?;
        store.put_file(&target, Vec::new(), mode);
        Ok(Box::new(MemoryFileHandle {
            store: Arc::clone(&self.store),
            path: target,
            mode,
            buffer: Vec::new(),
        }))
    }

    fn symlink(&self, target: &str, link: &str) -> io::Result<()> {
        let mut store = self.store.lock().map_err(|_| lock_poisoned())?;
        store.symlink(target, link)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let store = self.store.lock().map_err(|_| lock_poisoned())?;
        Ok(Box::new(Cursor::new(store.read(path)?)))
    }
}
