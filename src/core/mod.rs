//! Core types shared by every renderfs layer.
//!
//! # Error Management
//!
//! - [`RenderFsError`] - every way a copy can fail, grouped by [`ErrorCategory`]
//! - [`PathError`] - path rendering failures, either a template error or an
//!   escape from the destination root
//! - [`CopyFailure`] - an error paired with the statistics gathered before it
//! - [`ErrorContext`] and [`user_friendly_error`] - colored terminal output
//!   with suggestions, used by the CLI
//!
//! # Examples
//!
//! ```rust,no_run
//! use renderfs::core::{RenderFsError, user_friendly_error};
//!
//! let err = anyhow::Error::new(RenderFsError::MissingSource);
//! user_friendly_error(&err).display();
//! ```

pub mod error;

pub use error::{
    CopyFailure, ErrorCategory, ErrorContext, FileOperation, PathError, RenderFsError,
    user_friendly_error,
};
