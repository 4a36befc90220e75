//! Leaf helpers shared by the copy engine.
//!
//! # Modules
//!
//! - [`binary`] - content sniffing that decides whether a payload is templated
//! - [`path`] - lexical cleaning and validation of `/`-separated relative paths

pub mod binary;
pub mod path;

pub use binary::is_binary;
pub use path::{clean_path, escapes_root, strip_template_suffix};
