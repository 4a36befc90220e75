//! Lexical helpers for `/`-separated relative paths.
//!
//! Source and destination paths inside the engine are always relative,
//! forward-slash separated strings, independent of the host platform. None of
//! these helpers touch the filesystem.

use std::path::{Path, PathBuf};

use crate::constants::TEMPLATE_SUFFIXES;

/// Lexically clean a `/`-separated path.
///
/// Collapses repeated separators, drops `.` segments and resolves `..` against
/// the preceding segment. Leading `..` segments of relative paths are kept,
/// `..` directly under the root of an absolute path is dropped. An empty
/// result is `"."`.
///
/// ```
/// use renderfs::utils::path::clean_path;
///
/// assert_eq!(clean_path("a//b/./c/../d/"), "a/b/d");
/// assert_eq!(clean_path("a/../../x"), "../x");
/// assert_eq!(clean_path("/../x"), "/x");
/// assert_eq!(clean_path("a/.."), ".");
/// ```
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Whether a cleaned path would resolve outside the directory it is joined to.
///
/// Rejects parent traversal (`..`, `../x`), rooted paths (`/x`), UNC paths
/// (`//server/share`) and drive-letter paths (`C:`, `C:/x`).
pub fn escapes_root(clean: &str) -> bool {
    clean == ".." || clean.starts_with("../") || clean.starts_with('/') || is_windows_abs(clean)
}

/// Drive-letter or UNC form.
pub fn is_windows_abs(value: &str) -> bool {
    if value.starts_with("//") || value.starts_with("\\\\") {
        return true;
    }
    let bytes = value.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Strip one recognized template suffix from a file name.
///
/// ```
/// use renderfs::utils::path::strip_template_suffix;
///
/// assert_eq!(strip_template_suffix("README.md.jinja"), "README.md");
/// assert_eq!(strip_template_suffix("main.go.tmpl"), "main.go");
/// assert_eq!(strip_template_suffix("plain.txt"), "plain.txt");
/// ```
pub fn strip_template_suffix(name: &str) -> &str {
    TEMPLATE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}

/// Parent of a relative path, or `None` for a single segment.
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent).filter(|p| !p.is_empty())
}

/// Last segment of a relative path.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Resolve a relative `/`-separated path under a native root directory.
pub fn to_native(root: &Path, path: &str) -> PathBuf {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Join a relative parent and a child name; an empty parent is the root.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == "." {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}
