//! Zip archive destination.
//!
//! Entries are appended to the archive as the copy engine produces them.
//! Everything written is also kept in memory so that [`Writer::open`] can
//! answer conflict checks for paths already written in this archive; any
//! other path reads as not found.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::Mutex;

use tracing::debug;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use super::store::{EntryStore, Node};
use super::{WriteHandle, Writer, lock_poisoned};

struct ArchiveState<W: Write + Seek> {
    archive: zip::ZipWriter<W>,
    entries: EntryStore,
}

/// Builds a zip archive from rendered output.
///
/// Call [`finish`](Self::finish) once the copy completes to write the
/// central directory.
pub struct ZipWriter<W: Write + Seek> {
    state: Mutex<ArchiveState<W>>,
}

impl ZipWriter<File> {
    /// Create (or truncate) an archive file at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl ZipWriter<Cursor<Vec<u8>>> {
    /// Archive built in memory.
    pub fn in_memory() -> Self {
        Self::new(Cursor::new(Vec::new()))
    }
}

impl<W: Write + Seek> ZipWriter<W> {
    /// Archive written to `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            state: Mutex::new(ArchiveState {
                archive: zip::ZipWriter::new(inner),
                entries: EntryStore::default(),
            }),
        }
    }

    /// Write the central directory and return the underlying sink.
    ///
    /// # Errors
    ///
    /// Fails when the archive cannot be finalized.
    pub fn finish(self) -> io::Result<W> {
        let state = self.state.into_inner().map_err(|_| lock_poisoned())?;
        Ok(state.archive.finish()?)
    }

    fn options(mode: u32) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(mode)
    }
}

struct ZipFileHandle<'a, W: Write + Seek> {
    writer: &'a ZipWriter<W>,
    path: String,
    mode: u32,
    buffer: Vec<u8>,
}

impl<W: Write + Seek> Write for ZipFileHandle<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write + Seek> WriteHandle for ZipFileHandle<'_, W> {
    fn close(self: Box<Self>) -> io::Result<()> {
        let handle = *self;
        let mut state = handle.writer.state.lock().map_err(|_| lock_poisoned())?;
        state.archive.start_file(handle.path.clone(), ZipWriter::<W>::options(handle.mode))?;
        state.archive.write_all(&handle.buffer)?;
        state.entries.put_file(&handle.path, handle.buffer, handle.mode);
        debug!("Added archive entry {}", handle.path);
        Ok(())
    }
}

impl<W: Write + Seek> Writer for ZipWriter<W> {
    fn mkdir_all(&self, path: &str, mode: u32) -> io::Result<()> {
        let mut state = self.state.lock().map_err(|_| lock_poisoned())?;
        let created = state.entries.mkdir_all(path, mode)?;
        for dir in created {
            state.archive.add_directory(format!("{dir}/"), Self::options(mode))?;
        }
        Ok(())
    }

    fn create_file(&self, path: &str, mode: u32) -> io::Result<Box<dyn WriteHandle + '_>> {
        let state = self.state.lock().map_err(|_| lock_poisoned())?;
        let target = state.entries.file_target(path)?;
        if state.entries.get(&target).is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("archive entry already written: {target}"),
            ));
        }
        Ok(Box::new(ZipFileHandle {
            writer: self,
            path: target,
            mode,
            buffer: Vec::new(),
        }))
    }

    fn symlink(&self, target: &str, link: &str) -> io::Result<()> {
        let mut state = self.state.lock().map_err(|_| lock_poisoned())?;
        if let Some(Node::Symlink { target: existing }) = state.entries.get(link) {
            if existing == target {
                return Ok(());
            }
        }
        state.entries.symlink(target, link)?;
        state.archive.add_symlink(
            link.trim_start_matches('/').to_string(),
            target.to_string(),
            Self::options(0o777),
        )?;
        Ok(())
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let state = self.state.lock().map_err(|_| lock_poisoned())?;
        Ok(Box::new(Cursor::new(state.entries.read(path)?)))
    }
}
