//! Ignore-file and explicit pattern handling.

use anyhow::Result;
use renderfs::copy::{Options, copy};
use renderfs::core::{ErrorCategory, RenderFsError};
use renderfs::source::MemorySource;
use renderfs::test_utils::TreeFixture;
use renderfs::writers::MemoryWriter;

#[test]
fn test_ignore_file_excludes_and_is_not_copied() -> Result<()> {
    let fixture = TreeFixture::new()?
        .file(".renderfs-ignore", "ignored.txt\n")?
        .file("ignored.txt", "ignore me")?
        .file("kept.txt", "keep me")?;

    let stats = copy(&fixture.source(), &fixture.writer()?, Options::new())?;

    assert_eq!(stats.created, 1);
    assert!(!fixture.dest_exists("ignored.txt"));
    assert!(!fixture.dest_exists(".renderfs-ignore"));
    assert_eq!(fixture.read_dest("kept.txt")?, "keep me");
    Ok(())
}

#[test]
fn test_explicit_patterns_replace_ignore_file() -> Result<()> {
    let source = MemorySource::new()
        .with_file(".renderfs-ignore", "a.txt\n")
        .with_file("a.txt", "a")
        .with_file("b.txt", "b");
    let writer = MemoryWriter::new();

    copy(&source, &writer, Options::new().ignore(["b.txt"]))?;

    assert_eq!(writer.files(), vec!["a.txt"]);
    Ok(())
}

#[test]
fn test_ignored_directory_is_pruned() -> Result<()> {
    let source = MemorySource::new()
        .with_file("target/debug/out.bin", "x")
        .with_file("target.txt", "not a directory")
        .with_file("src/lib.rs", "// {{ missing }}");
    let writer = MemoryWriter::new();

    let stats = copy(&source, &writer, Options::new().ignore(["target/"]))?;

    assert_eq!(stats.created, 2);
    assert!(!writer.is_dir("target"));
    assert_eq!(writer.files(), vec!["src/lib.rs", "target.txt"]);
    Ok(())
}

#[test]
fn test_negation_reincludes() -> Result<()> {
    let source = MemorySource::new()
        .with_file("notes/a.md", "a")
        .with_file("notes/keep.md", "k")
        .with_file("README.md", "r");
    let writer = MemoryWriter::new();

    copy(&source, &writer, Options::new().ignore(["*.md", "!keep.md"]))?;

    assert_eq!(writer.files(), vec!["notes/keep.md"]);
    Ok(())
}

#[test]
fn test_patterns_match_source_paths_not_rendered_ones() -> Result<()> {
    let source = MemorySource::new().with_file("{{ name }}.txt", "x");
    let writer = MemoryWriter::new();

    copy(&source, &writer, Options::new().with_value("name", "out").ignore(["out.txt"]))?;

    assert_eq!(writer.files(), vec!["out.txt"]);
    Ok(())
}

#[test]
fn test_invalid_pattern_is_a_setup_error() -> Result<()> {
    let source = MemorySource::new().with_file("a.txt", "a");
    let writer = MemoryWriter::new();

    let failure = copy(&source, &writer, Options::new().ignore(["ok", "{bad"])).unwrap_err();

    assert_eq!(failure.error.category(), ErrorCategory::Setup);
    assert!(matches!(
        &failure.error,
        RenderFsError::InvalidIgnorePattern { pattern, .. } if pattern == "{bad"
    ));
    assert!(writer.files().is_empty());
    Ok(())
}
