//! Conflict policies and identical-content detection against real directories.

use anyhow::Result;
use renderfs::copy::{ConflictPolicy, Options, copy};
use renderfs::core::{ErrorCategory, FileOperation, RenderFsError};
use renderfs::test_utils::TreeFixture;

#[test]
fn test_identical_content_is_left_alone() -> Result<()> {
    let fixture = TreeFixture::new()?.file("file.txt", "same")?.existing("file.txt", "same")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let existing = fixture.dest_path().join("file.txt");
        std::fs::set_permissions(&existing, std::fs::Permissions::from_mode(0o600))?;
    }

    for policy in [ConflictPolicy::Overwrite, ConflictPolicy::Skip, ConflictPolicy::Fail] {
        let options = Options::new().on_conflict(policy);
        let stats = copy(&fixture.source(), &fixture.writer()?, options)?;
        assert_eq!(stats.identical, 1, "policy {policy}");
        assert_eq!(stats.total(), 1);
    }

    assert_eq!(fixture.read_dest("file.txt")?, "same");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(fixture.dest_path().join("file.txt"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "identical files keep their mode");
    }
    Ok(())
}

#[test]
fn test_skip_policy_keeps_original() -> Result<()> {
    let fixture = TreeFixture::new()?.file("file.txt", "new")?.existing("file.txt", "original")?;

    let options = Options::new().on_conflict(ConflictPolicy::Skip);
    let stats = copy(&fixture.source(), &fixture.writer()?, options)?;

    assert_eq!(stats.skipped, 1);
    assert_eq!(fixture.read_dest("file.txt")?, "original");
    Ok(())
}

#[test]
fn test_overwrite_policy_replaces() -> Result<()> {
    let fixture = TreeFixture::new()?.file("file.txt", "new")?.existing("file.txt", "original")?;

    let stats = copy(&fixture.source(), &fixture.writer()?, Options::new())?;

    assert_eq!(stats.updated, 1);
    assert_eq!(fixture.read_dest("file.txt")?, "new");
    Ok(())
}

#[test]
fn test_fail_policy_aborts_with_partial_stats() -> Result<()> {
    let fixture = TreeFixture::new()?
        .file("a.txt", "a")?
        .file("b.txt", "new")?
        .file("c.txt", "c")?
        .existing("b.txt", "original")?;

    let options = Options::new().on_conflict(ConflictPolicy::Fail);
    let failure = copy(&fixture.source(), &fixture.writer()?, options).unwrap_err();

    assert_eq!(failure.error.category(), ErrorCategory::Conflict);
    assert!(matches!(&failure.error, RenderFsError::Conflict { path } if path == "b.txt"));
    assert_eq!(failure.stats.created, 1);
    assert_eq!(fixture.read_dest("a.txt")?, "a", "earlier writes are kept");
    assert_eq!(fixture.read_dest("b.txt")?, "original");
    assert!(!fixture.dest_exists("c.txt"), "the walk stops at the conflict");
    assert!(failure.to_string().contains("created 1"));
    Ok(())
}

#[test]
fn test_second_run_reports_identical() -> Result<()> {
    let fixture = TreeFixture::new()?
        .file("README.md.jinja", "# {{ name }}\n")?
        .file("{{ name }}/main.rs", "fn main() {}\n")?
        .file("static/logo.png", b"\x89PNG\r\n\x1a\n{{ name }}".as_slice())?;
    let options = Options::new().with_value("name", "demo");

    let first = copy(&fixture.source(), &fixture.writer()?, options.clone())?;
    assert_eq!(first.created, 3);

    let second = copy(&fixture.source(), &fixture.writer()?, options)?;
    assert_eq!(second.identical, 3);
    assert_eq!(second.total(), 3);
    Ok(())
}

#[test]
fn test_directory_at_file_destination_is_fatal() -> Result<()> {
    let fixture = TreeFixture::new()?.file("taken", "content")?;
    std::fs::create_dir_all(fixture.dest_path().join("taken"))?;

    for policy in [ConflictPolicy::Overwrite, ConflictPolicy::Skip] {
        let options = Options::new().on_conflict(policy);
        let failure = copy(&fixture.source(), &fixture.writer()?, options).unwrap_err();
        assert!(
            matches!(
                &failure.error,
                RenderFsError::Io {
                    operation: FileOperation::CheckDestination,
                    ..
                }
            ),
            "got {:?}",
            failure.error
        );
        assert_eq!(failure.stats.total(), 0);
    }
    assert!(fixture.dest_path().join("taken").is_dir());
    Ok(())
}
