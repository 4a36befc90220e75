//! Error handling for renderfs
//!
//! This module provides the error types returned by the copy engine and the
//! user-friendly wrapper the CLI prints.
//!
//! # Error Categories
//!
//! [`RenderFsError`] variants fall into the categories of [`ErrorCategory`]:
//! - **Setup**: missing source or destination, bad ignore patterns. Raised
//!   before anything is written.
//! - **Path**: a path failed to render or rendered outside the destination.
//! - **Content**: a file body failed to render. The wrapped
//!   [`TemplateError`] carries the sub-kind (missing variable, filter, item)
//!   and the source line when known.
//! - **Conflict**: the destination holds different content under the `Fail`
//!   policy.
//! - **Io**: any read, write, close, mkdir or symlink failure, tagged with the
//!   [`FileOperation`] and the path.
//!
//! None of these are retried. [`CopyFailure`] pairs the error with the
//! statistics accumulated before the walk stopped.

use std::fmt;
use std::io;

use colored::Colorize;
use thiserror::Error;

use crate::copy::Stats;
use crate::templating::TemplateError;

/// File operation that failed, used to tag I/O errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Listing a source directory
    ListDir,
    /// Reading a source file
    Read,
    /// Reading a source symlink target
    ReadLink,
    /// Reading the root ignore-file
    ReadIgnoreFile,
    /// Creating a destination directory
    CreateDir,
    /// Creating the parent directory of a destination file
    CreateParent,
    /// Creating or truncating a destination file
    CreateFile,
    /// Writing destination bytes
    Write,
    /// Closing a destination file
    Close,
    /// Creating a destination symlink
    Symlink,
    /// Opening the existing destination object
    CheckDestination,
    /// Reading the existing destination object
    ReadExisting,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileOperation::ListDir => "list directory",
            FileOperation::Read => "read",
            FileOperation::ReadLink => "read symlink",
            FileOperation::ReadIgnoreFile => "read ignore file",
            FileOperation::CreateDir => "create directory",
            FileOperation::CreateParent => "create parent",
            FileOperation::CreateFile => "create",
            FileOperation::Write => "write",
            FileOperation::Close => "close",
            FileOperation::Symlink => "create symlink",
            FileOperation::CheckDestination => "check destination",
            FileOperation::ReadExisting => "read existing",
        };
        f.write_str(name)
    }
}

/// Failure while rendering a path.
#[derive(Debug, Error)]
pub enum PathError {
    /// The template engine failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The rendered path points outside the destination root.
    #[error("rendered path {rendered:?} escapes destination")]
    Escape {
        /// Rendered path before cleaning.
        rendered: String,
    },
}

/// Coarse classification of a [`RenderFsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised before traversal starts.
    Setup,
    /// Path rendering or validation.
    Path,
    /// Content rendering.
    Content,
    /// Destination differs under the `Fail` policy.
    Conflict,
    /// Filesystem or backend failure.
    Io,
}

/// The main error type for copy operations.
#[derive(Debug, Error)]
pub enum RenderFsError {
    /// No source tree was configured.
    #[error("source tree is required")]
    MissingSource,

    /// No destination writer was configured.
    #[error("destination writer is required")]
    MissingDestination,

    /// An ignore pattern failed to compile.
    #[error("invalid ignore pattern {pattern:?}")]
    InvalidIgnorePattern {
        /// The offending pattern line.
        pattern: String,
        /// Parser error from the gitignore compiler.
        #[source]
        source: ignore::Error,
    },

    /// A relative path failed to render.
    #[error("failed to render path {path}")]
    RenderPath {
        /// Source-relative path of the entry.
        path: String,
        /// What went wrong.
        #[source]
        source: PathError,
    },

    /// A file body failed to render.
    #[error("failed to render file {path}")]
    RenderFile {
        /// Source-relative path of the entry.
        path: String,
        /// Classified engine failure.
        #[source]
        source: TemplateError,
    },

    /// Destination content differs and the policy is `Fail`.
    #[error("destination file {path} exists and differs")]
    Conflict {
        /// Destination-relative path.
        path: String,
    },

    /// The source tree cannot resolve symlink targets.
    #[error("source tree does not support symlinks: {path}")]
    SymlinkUnsupported {
        /// Source-relative path of the symlink.
        path: String,
    },

    /// A backend operation failed.
    #[error("failed to {operation} {path}")]
    Io {
        /// Which operation failed.
        operation: FileOperation,
        /// Relative path the operation targeted.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl RenderFsError {
    /// Wrap an I/O error with the operation and path it belongs to.
    pub fn io(operation: FileOperation, path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingSource | Self::MissingDestination | Self::InvalidIgnorePattern { .. } => {
                ErrorCategory::Setup
            }
            Self::RenderPath { .. } => ErrorCategory::Path,
            Self::RenderFile { .. } => ErrorCategory::Content,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::SymlinkUnsupported { .. } | Self::Io { .. } => ErrorCategory::Io,
        }
    }

    /// The classified template failure, for path and content render errors.
    pub fn template_error(&self) -> Option<&TemplateError> {
        match self {
            Self::RenderFile { source, .. } => Some(source),
            Self::RenderPath {
                source: PathError::Template(source),
                ..
            } => Some(source),
            _ => None,
        }
    }
}

/// A copy that stopped early, with the statistics gathered until then.
#[derive(Debug, Error)]
#[error("copy aborted ({stats})")]
pub struct CopyFailure {
    /// Counters accumulated before the failure.
    pub stats: Stats,
    /// Why the copy stopped.
    #[source]
    pub error: RenderFsError,
}

impl CopyFailure {
    /// Pair an error with partial statistics.
    pub fn new(stats: Stats, error: RenderFsError) -> Self {
        Self {
            stats,
            error,
        }
    }
}

/// Error wrapper with a suggestion and details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// Full error chain, outermost first.
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details about the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one applies.
pub fn user_friendly_error(error: &anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    let render_error = error.chain().find_map(|e| e.downcast_ref::<RenderFsError>());
    let Some(render_error) = render_error else {
        return ErrorContext::new(message);
    };

    let context = ErrorContext::new(message);
    match render_error {
        RenderFsError::Conflict { .. } => context
            .with_suggestion("Re-run with --on-conflict overwrite or --on-conflict skip")
            .with_details("Files written before the conflict were kept"),
        RenderFsError::InvalidIgnorePattern { .. } => context
            .with_suggestion("Check the pattern against gitignore syntax"),
        RenderFsError::RenderPath {
            source: PathError::Escape { .. },
            ..
        } => context.with_suggestion(
            "Rendered paths must stay inside the destination; avoid leading '/', '..' or drive letters",
        ),
        RenderFsError::SymlinkUnsupported { .. } => {
            context.with_suggestion("Add the symlink to the ignore patterns or replace it with a file")
        }
        other => match other.template_error() {
            Some(template) => {
                let mut context = context;
                if let Some(line) = template.line {
                    context = context.with_details(format!("{} at line {}", template.kind, line));
                } else {
                    context = context.with_details(template.kind.to_string());
                }
                match template.kind {
                    crate::templating::TemplateErrorKind::MissingVariable
                    | crate::templating::TemplateErrorKind::MissingItem => context.with_suggestion(
                        "Provide the value with --data or --set, or drop --strict to render it empty",
                    ),
                    crate::templating::TemplateErrorKind::MissingFilter => {
                        context.with_suggestion("Check the filter name against Tera's builtin filters")
                    }
                    _ => context,
                }
            }
            None => context,
        },
    }
}
