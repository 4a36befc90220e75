//! Rendering of paths and contents through a full copy.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use renderfs::copy::{Options, copy};
use renderfs::core::{ErrorCategory, PathError, RenderFsError};
use renderfs::source::MemorySource;
use renderfs::templating::{TemplateEnvironment, TemplateErrorKind};
use renderfs::test_utils::{TreeFixture, context, init_test_logging};
use renderfs::writers::MemoryWriter;
use serde_json::json;
use tera::Value;

#[test]
fn test_readme_template_is_rendered_and_renamed() -> Result<()> {
    init_test_logging(None);
    let fixture = TreeFixture::new()?.file("README.md.jinja", "Project: {{ project_name }}\n")?;

    let options = Options::new().with_context(context(json!({ "project_name": "X" })));
    let stats = copy(&fixture.source(), &fixture.writer()?, options)?;

    assert_eq!(stats.created, 1);
    assert_eq!(fixture.read_dest("README.md")?, "Project: X\n");
    assert!(!fixture.dest_exists("README.md.jinja"));
    Ok(())
}

#[test]
fn test_conditional_path_renders_empty_and_is_skipped() -> Result<()> {
    let fixture = TreeFixture::new()?
        .file("{% if flag %}compose.yaml{% endif %}", "services: {}\n")?
        .file("main.txt", "main")?;

    let options = Options::new().with_value("flag", false);
    let stats = copy(&fixture.source(), &fixture.writer()?, options)?;

    assert_eq!(stats.created, 1);
    assert_eq!(stats.total(), 1, "skipped paths are not counted");
    assert!(!fixture.dest_exists("compose.yaml"));
    assert_eq!(std::fs::read_dir(fixture.dest_path())?.count(), 1);
    Ok(())
}

#[test]
fn test_directory_rendering_empty_prunes_subtree() -> Result<()> {
    // The child would fail in strict mode if it were ever visited.
    let source = MemorySource::new()
        .with_file("{% if docs %}docs{% endif %}/{{ undefined_name }}.md", "{{ undefined }}")
        .with_file("src/{{ name }}.rs", "fn {{ name }}() {}\n");
    let writer = MemoryWriter::new();

    let options = Options::new().with_value("name", "main").strict(true);
    let stats = copy(&source, &writer, options)?;

    assert_eq!(stats.created, 1);
    assert_eq!(writer.files(), vec!["src/main.rs"]);
    assert_eq!(writer.contents_string("src/main.rs").as_deref(), Some("fn main() {}\n"));
    Ok(())
}

#[test]
fn test_templated_directory_names() -> Result<()> {
    let source = MemorySource::new()
        .with_file("{{ package }}/lib.rs.tmpl", "// {{ package | upper }}\n")
        .with_dir("{{ package }}/tests.jinja");
    let writer = MemoryWriter::new();

    copy(&source, &writer, Options::new().with_value("package", "core"))?;

    assert!(writer.is_dir("core"));
    assert!(writer.is_dir("core/tests.jinja"), "directory names keep their suffix");
    assert_eq!(writer.contents_string("core/lib.rs").as_deref(), Some("// CORE\n"));
    Ok(())
}

#[test]
fn test_loops_and_nested_context() -> Result<()> {
    let source = MemorySource::new().with_file(
        "deps.txt",
        "{% for dep in deps %}{{ dep.name }}={{ dep.version }}\n{% endfor %}",
    );
    let writer = MemoryWriter::new();
    let ctx = context(json!({
        "deps": [ { "name": "serde", "version": "1" }, { "name": "tera", "version": "1.20" } ]
    }));

    copy(&source, &writer, Options::new().with_context(ctx))?;

    assert_eq!(writer.contents_string("deps.txt").as_deref(), Some("serde=1\ntera=1.20\n"));
    Ok(())
}

#[test]
fn test_missing_variable_lenient_and_strict() -> Result<()> {
    let source = MemorySource::new().with_file("greeting.txt", "Hello {{ missing }}!");

    let writer = MemoryWriter::new();
    copy(&source, &writer, Options::new())?;
    assert_eq!(writer.contents_string("greeting.txt").as_deref(), Some("Hello !"));

    let writer = MemoryWriter::new();
    let failure = copy(&source, &writer, Options::new().strict(true)).unwrap_err();
    assert_eq!(failure.error.category(), ErrorCategory::Content);
    match &failure.error {
        RenderFsError::RenderFile { path, source } => {
            assert_eq!(path, "greeting.txt");
            assert_eq!(source.kind, TemplateErrorKind::MissingVariable);
            assert_eq!(source.name.as_deref(), Some("missing"));
        }
        other => panic!("expected content error, got {other:?}"),
    }
    assert!(writer.files().is_empty());
    Ok(())
}

#[test]
fn test_missing_filter_is_classified() -> Result<()> {
    let source = MemorySource::new().with_file("a.txt", "{{ name | shout }}");
    let writer = MemoryWriter::new();

    let failure = copy(&source, &writer, Options::new().with_value("name", "x")).unwrap_err();
    let template = failure.error.template_error().expect("template error");
    assert_eq!(template.kind, TemplateErrorKind::MissingFilter);
    assert_eq!(template.name.as_deref(), Some("shout"));
    Ok(())
}

#[test]
fn test_custom_environment_filter() -> Result<()> {
    let env = TemplateEnvironment::new().with_filter(
        "shout",
        |value: &Value, _args: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::String(format!("{}!", value.as_str().unwrap_or_default().to_uppercase())))
        },
    );
    let source = MemorySource::new().with_file("{{ name | shout }}.txt", "{{ name | shout }}");
    let writer = MemoryWriter::new();

    let options = Options::new().with_value("name", "hey").with_environment(Arc::new(env));
    copy(&source, &writer, options)?;

    assert_eq!(writer.contents_string("HEY!.txt").as_deref(), Some("HEY!"));
    Ok(())
}

#[test]
fn test_binary_content_passthrough_and_opt_in() -> Result<()> {
    let raw = b"GIF89a{{ project_name }}".to_vec();
    let source = MemorySource::new().with_file("logo.gif", raw.clone());

    let writer = MemoryWriter::new();
    copy(&source, &writer, Options::new().with_value("project_name", "X"))?;
    assert_eq!(writer.contents("logo.gif"), Some(raw));

    let writer = MemoryWriter::new();
    copy(&source, &writer, Options::new().with_value("project_name", "X").template_binary(true))?;
    assert_eq!(writer.contents("logo.gif"), Some(b"GIF89aX".to_vec()));
    Ok(())
}

#[test]
fn test_binary_with_control_bytes_is_untouched() -> Result<()> {
    let raw = vec![0x00, 0x01, b'{', b'{', b' ', b'x', b' ', b'}', b'}', 0xFF];
    let source = MemorySource::new().with_file("blob.bin", raw.clone());
    let writer = MemoryWriter::new();

    copy(&source, &writer, Options::new().strict(true))?;

    assert_eq!(writer.contents("blob.bin"), Some(raw));
    Ok(())
}

#[test]
fn test_path_escape_is_rejected_without_writes() -> Result<()> {
    let templates = [
        "{{ up }}/evil.txt",
        "{{ slash }}etc/evil.txt",
        "C:/evil.txt",
        "{{ up }}{{ slash }}evil.txt",
    ];
    for template in templates {
        let source = MemorySource::new().with_file("0-first.txt", "ok").with_file(template, "x");
        let writer = MemoryWriter::new();

        let options = Options::new().with_value("up", "..").with_value("slash", "/");
        let failure = copy(&source, &writer, options).unwrap_err();
        assert!(
            matches!(
                &failure.error,
                RenderFsError::RenderPath { source: PathError::Escape { .. }, .. }
            ),
            "{template} should escape, got {:?}",
            failure.error
        );
        assert_eq!(failure.stats.created, 1, "entries before the escape stay written");
        assert!(writer.files().iter().all(|f| !f.contains("evil")));
    }
    Ok(())
}

#[test]
fn test_stats_count_only_dispositioned_files() -> Result<()> {
    let source = MemorySource::new()
        .with_file(".renderfs-ignore", "*.log\n")
        .with_file("a.txt", "a")
        .with_file("b/c.txt", "c")
        .with_file("debug.log", "log")
        .with_file("{% if no %}skip.txt{% endif %}", "skip")
        .with_dir("empty");
    let writer = MemoryWriter::new();

    let stats = copy(&source, &writer, Options::new())?;

    assert_eq!(stats.total(), 2);
    assert_eq!(writer.files(), vec!["a.txt", "b/c.txt"]);
    assert!(writer.is_dir("empty"));
    Ok(())
}

#[test]
fn test_directories_created_before_their_files() -> Result<()> {
    // The memory writer refuses files whose parent does not exist yet.
    let source = MemorySource::new()
        .with_dir_mode("bin", 0o700)
        .with_file_mode("bin/run.sh", "#!/bin/sh\n", 0o755)
        .with_file("{{ dir }}/nested/file.txt", "x");
    let writer = MemoryWriter::new();

    copy(&source, &writer, Options::new().with_value("dir", "gen"))?;

    assert_eq!(writer.dir_mode("bin"), Some(0o700));
    assert_eq!(writer.file_mode("bin/run.sh"), Some(0o755));
    assert_eq!(writer.contents_string("gen/nested/file.txt").as_deref(), Some("x"));
    Ok(())
}

#[test]
fn test_rendering_is_stable() -> Result<()> {
    let source = MemorySource::new().with_file("f.txt", "{{ a }}-{{ b | default(value='d') }}");
    let first = MemoryWriter::new();
    let second = MemoryWriter::new();
    let options = Options::new().with_value("a", 1);

    copy(&source, &first, options.clone())?;
    copy(&source, &second, options)?;

    assert_eq!(first.contents("f.txt"), second.contents("f.txt"));
    assert_eq!(first.contents_string("f.txt").as_deref(), Some("1-d"));
    Ok(())
}
