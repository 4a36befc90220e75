//! Zip archive destination.

use std::io::{Cursor, Read};

use anyhow::Result;
use renderfs::copy::{ConflictPolicy, Options, copy};
use renderfs::source::MemorySource;
use renderfs::writers::ZipWriter;
use zip::ZipArchive;

#[test]
fn test_copy_into_archive() -> Result<()> {
    let source = MemorySource::new()
        .with_file("README.md.jinja", "Project: {{ project_name }}\n")
        .with_file_mode("bin/run.sh", "#!/bin/sh\necho {{ project_name }}\n", 0o755)
        .with_symlink("readme", "README.md");
    let writer = ZipWriter::in_memory();

    let stats = copy(&source, &writer, Options::new().with_value("project_name", "X"))?;
    assert_eq!(stats.created, 2);

    let bytes = writer.finish()?.into_inner();
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut readme = String::new();
    archive.by_name("README.md")?.read_to_string(&mut readme)?;
    assert_eq!(readme, "Project: X\n");

    let script = archive.by_name("bin/run.sh")?;
    assert_eq!(script.unix_mode().map(|mode| mode & 0o777), Some(0o755));
    drop(script);

    assert!(archive.by_name("bin/").is_ok());
    assert!(archive.by_name("readme").is_ok());
    Ok(())
}

#[test]
fn test_archive_conflicts_only_see_written_entries() -> Result<()> {
    // Two source paths that render to the same destination.
    let source = MemorySource::new()
        .with_file("a/{{ name }}.txt", "one")
        .with_file("a/{{ other }}.txt", "two");
    let writer = ZipWriter::in_memory();
    let options = Options::new()
        .with_value("name", "same")
        .with_value("other", "same")
        .on_conflict(ConflictPolicy::Skip);

    let stats = copy(&source, &writer, options)?;

    assert_eq!(stats.created, 1);
    assert_eq!(stats.skipped, 1);
    writer.finish()?;
    Ok(())
}
