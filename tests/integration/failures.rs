//! Backend failures while writing rendered files.

use std::io::{self, Read, Write};

use anyhow::Result;
use renderfs::copy::{Options, copy};
use renderfs::core::{ErrorCategory, FileOperation, RenderFsError};
use renderfs::source::MemorySource;
use renderfs::writers::{MemoryWriter, WriteHandle, Writer};

/// How the handle for the target path misbehaves.
#[derive(Clone, Copy)]
enum Fault {
    Write,
    Close,
    WriteAndClose,
}

/// Delegates to a [`MemoryWriter`], except for one path whose handle fails.
struct FaultyWriter {
    inner: MemoryWriter,
    path: &'static str,
    fault: Fault,
}

struct FaultyHandle {
    fault: Fault,
}

impl Write for FaultyHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.fault {
            Fault::Write | Fault::WriteAndClose => Err(io::Error::other("disk full")),
            Fault::Close => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteHandle for FaultyHandle {
    fn close(self: Box<Self>) -> io::Result<()> {
        match self.fault {
            Fault::Close | Fault::WriteAndClose => Err(io::Error::other("flush failed")),
            Fault::Write => Ok(()),
        }
    }
}

impl Writer for FaultyWriter {
    fn mkdir_all(&self, path: &str, mode: u32) -> io::Result<()> {
        self.inner.mkdir_all(path, mode)
    }

    fn create_file(&self, path: &str, mode: u32) -> io::Result<Box<dyn WriteHandle + '_>> {
        if path == self.path {
            return Ok(Box::new(FaultyHandle { fault: self.fault }));
        }
        self.inner.create_file(path, mode)
    }

    fn symlink(&self, target: &str, link: &str) -> io::Result<()> {
        self.inner.symlink(target, link)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        self.inner.open(path)
    }
}

fn source() -> MemorySource {
    MemorySource::new()
        .with_file("a.txt", "a")
        .with_file("docs/b.txt", "{{ name }}")
        .with_file("docs/c.txt", "c")
}

fn run(fault: Fault) -> (renderfs::CopyFailure, MemoryWriter) {
    let writer = FaultyWriter {
        inner: MemoryWriter::new(),
        path: "docs/b.txt",
        fault,
    };
    let failure = copy(&source(), &writer, Options::new().with_value("name", "b")).unwrap_err();
    (failure, writer.inner)
}

#[test]
fn test_close_error_surfaces_after_successful_write() -> Result<()> {
    let (failure, written) = run(Fault::Close);

    assert_eq!(failure.error.category(), ErrorCategory::Io);
    assert!(matches!(
        &failure.error,
        RenderFsError::Io { operation: FileOperation::Close, path, .. } if path == "docs/b.txt"
    ));
    assert_eq!(failure.error.to_string(), "failed to close docs/b.txt");
    assert_eq!(failure.stats.created, 2, "counted before the write");
    assert_eq!(written.files(), vec!["a.txt"]);
    Ok(())
}

#[test]
fn test_write_error_reported_before_close_error() -> Result<()> {
    let (failure, written) = run(Fault::WriteAndClose);

    assert!(matches!(
        &failure.error,
        RenderFsError::Io { operation: FileOperation::Write, path, .. } if path == "docs/b.txt"
    ));
    assert!(!written.files().contains(&"docs/c.txt".to_string()));
    Ok(())
}

#[test]
fn test_write_error_alone() -> Result<()> {
    let (failure, _) = run(Fault::Write);

    assert!(matches!(
        &failure.error,
        RenderFsError::Io { operation: FileOperation::Write, .. }
    ));
    assert_eq!(failure.stats.total(), 2);
    Ok(())
}
