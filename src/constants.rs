//! Global constants used throughout the renderfs codebase.
//!
//! Reserved file names, default permission bits, and the sniffing window live
//! here so the magic values are discoverable in one place.

/// Name of the ignore-file consulted at the source root when no explicit
/// ignore patterns are supplied. The file itself is never copied.
pub const IGNORE_FILE_NAME: &str = ".renderfs-ignore";

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "renderfs.toml";

/// File name suffixes marking a file name as a template artifact.
///
/// After a file path is rendered, a single trailing suffix from this list is
/// stripped from the last path segment (`README.md.jinja` -> `README.md`).
/// Directories are never stripped.
pub const TEMPLATE_SUFFIXES: &[&str] = &[".jinja", ".tmpl"];

/// Permission bits used for directories whose source entry carries none.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Permission bits used for files whose source entry carries none.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Number of leading bytes inspected by the binary detector.
pub const SNIFF_LEN: usize = 512;

/// Name under which a compiled template is registered inside its Tera instance.
pub(crate) const TEMPLATE_NAME: &str = "__renderfs_template";
