//! Symlink recreation and symlinked destinations.

use std::io;

use anyhow::Result;
use renderfs::copy::{ConflictPolicy, Options, copy};
use renderfs::core::RenderFsError;
use renderfs::source::{MemorySource, SourceEntry, SourceTree};
use renderfs::writers::MemoryWriter;

/// Source that cannot resolve symlink targets.
struct NoLinks(MemorySource);

impl SourceTree for NoLinks {
    fn read_dir(&self, path: &str) -> io::Result<Vec<SourceEntry>> {
        self.0.read_dir(path)
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.0.read_file(path)
    }

    fn exists(&self, path: &str) -> bool {
        self.0.exists(path)
    }
}

#[test]
fn test_symlinks_recreated_with_verbatim_target() -> Result<()> {
    let source = MemorySource::new()
        .with_file("docs/index.md", "# {{ name }}")
        .with_symlink("{{ name }}-latest", "docs/{{ name }}");
    let writer = MemoryWriter::new();

    let stats = copy(&source, &writer, Options::new().with_value("name", "demo"))?;

    assert_eq!(stats.total(), 1, "symlinks are not counted");
    assert_eq!(
        writer.symlinks().get("demo-latest").map(String::as_str),
        Some("docs/{{ name }}")
    );
    Ok(())
}

#[test]
fn test_source_without_symlink_support_fails() -> Result<()> {
    let source = NoLinks(MemorySource::new().with_file("a.txt", "a").with_symlink("b", "a.txt"));
    let writer = MemoryWriter::new();

    let failure = copy(&source, &writer, Options::new()).unwrap_err();

    assert!(matches!(&failure.error, RenderFsError::SymlinkUnsupported { path } if path == "b"));
    assert_eq!(failure.stats.created, 1);
    Ok(())
}

#[test]
fn test_identical_through_destination_symlink() -> Result<()> {
    let source = MemorySource::new().with_file("file.txt", "same");
    let writer = MemoryWriter::new();
    {
        use renderfs::writers::Writer;
        use std::io::Write;
        let mut handle = writer.create_file("real.txt", 0o644)?;
        handle.write_all(b"same")?;
        handle.close()?;
        writer.symlink("real.txt", "file.txt")?;
    }

    let stats = copy(&source, &writer, Options::new())?;

    assert_eq!(stats.identical, 1);
    assert_eq!(writer.symlinks().get("file.txt").map(String::as_str), Some("real.txt"));
    Ok(())
}

#[cfg(unix)]
mod unix {
    use super::*;
    use renderfs::test_utils::TreeFixture;
    use std::os::unix::fs::symlink;
    use std::path::Path;

    #[test]
    fn test_directory_symlinks_copied_and_not_descended() -> Result<()> {
        let fixture = TreeFixture::new()?.file("docs/index.md", "# index")?.file("file.txt", "f")?;
        symlink("docs", fixture.source_path().join("latest"))?;
        symlink("file.txt", fixture.source_path().join("alias.txt"))?;

        let stats = copy(&fixture.source(), &fixture.writer()?, Options::new())?;

        assert_eq!(stats.created, 2);
        let dest = fixture.dest_path();
        assert_eq!(std::fs::read_link(dest.join("latest"))?, Path::new("docs"));
        assert_eq!(std::fs::read_link(dest.join("alias.txt"))?, Path::new("file.txt"));
        assert_eq!(fixture.read_dest("latest/index.md")?, "# index");

        let again = copy(&fixture.source(), &fixture.writer()?, Options::new())?;
        assert_eq!(again.identical, 2, "re-running over existing links succeeds");
        Ok(())
    }

    #[test]
    fn test_destination_symlink_identical_and_skip() -> Result<()> {
        let fixture = TreeFixture::new()?
            .file("same.txt", "same")?
            .file("differs.txt", "new")?
            .existing("targets/same.txt", "same")?
            .existing("targets/differs.txt", "original")?;
        let dest = fixture.dest_path();
        symlink("targets/same.txt", dest.join("same.txt"))?;
        symlink("targets/differs.txt", dest.join("differs.txt"))?;

        let options = Options::new().on_conflict(ConflictPolicy::Skip);
        let stats = copy(&fixture.source(), &fixture.writer()?, options)?;

        assert_eq!(stats.identical, 1);
        assert_eq!(stats.skipped, 1);
        assert!(std::fs::symlink_metadata(dest.join("same.txt"))?.file_type().is_symlink());
        assert_eq!(fixture.read_dest("targets/differs.txt")?, "original");
        Ok(())
    }
}
