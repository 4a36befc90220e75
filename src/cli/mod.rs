//! Command-line interface for renderfs.
//!
//! A single command renders a source directory into a destination directory
//! or zip archive:
//!
//! ```bash
//! renderfs ./template ./out --set project_name=demo
//! renderfs ./template ./out --data values.yaml --strict --on-conflict skip
//! renderfs ./template ./demo.zip --archive --ignore 'target/'
//! ```
//!
//! # Options
//!
//! - `--data <FILE>` - JSON, YAML or TOML mapping merged into the context
//! - `--set <KEY=VALUE>` - single context value, parsed as JSON when possible
//! - `--strict` - fail on undefined variables
//! - `--template-binary` - render content that sniffs as binary
//! - `--on-conflict <overwrite|skip|fail>` - policy for differing files
//! - `--ignore <PATTERN>` - gitignore-style exclusion, replaces the ignore-file
//! - `--config <FILE>` - config file instead of `./renderfs.toml`
//! - `--archive` - write DEST as a zip archive
//! - `--verbose` / `--quiet` - log level
//!
//! # Exit Status
//!
//! `0` on success, `2` when a conflict stopped the copy under
//! `--on-conflict fail`, `1` for every other failure.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{RenderConfig, build_context};
use crate::copy::{ConflictPolicy, Options, Stats, copy};
use crate::core::RenderFsError;
use crate::source::DirSource;
use crate::writers::{DirWriter, ZipWriter};

/// Exit status for a copy stopped by a conflict.
pub const EXIT_CONFLICT: i32 = 2;

/// Exit status for every other failure.
pub const EXIT_FAILURE: i32 = 1;

/// Render a template tree into a directory or archive.
#[derive(Parser, Debug)]
#[command(
    name = "renderfs",
    about = "Render a template tree into a directory or archive",
    version,
    long_about = "renderfs walks SOURCE, renders every path and text file through Tera with the \
                  supplied context, and writes the result to DEST while reporting which files \
                  were created, updated, skipped, or already identical."
)]
pub struct Cli {
    /// Template directory to read.
    pub source: PathBuf,

    /// Destination directory, or archive file with `--archive`.
    pub dest: PathBuf,

    /// Data file merged into the template context (json, yaml, yml, toml).
    #[arg(short, long = "data", value_name = "FILE")]
    pub data: Vec<PathBuf>,

    /// Context value as KEY=VALUE; dotted keys nest.
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Fail on undefined variables instead of rendering them empty.
    #[arg(long)]
    pub strict: bool,

    /// Render files detected as binary instead of copying them verbatim.
    #[arg(long)]
    pub template_binary: bool,

    /// What to do when a destination file differs.
    #[arg(long, value_name = "POLICY")]
    pub on_conflict: Option<ConflictPolicy>,

    /// Gitignore-style pattern to exclude; replaces the source ignore-file.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Config file to use instead of `renderfs.toml` in the working directory.
    #[arg(short, long, env = "RENDERFS_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write DEST as a zip archive.
    #[arg(long)]
    pub archive: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors and skip the summary.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Fails on configuration problems and on any copy failure; the
    /// [`CopyFailure`](crate::core::CopyFailure) stays in the error chain.
    pub fn execute(self) -> Result<Stats> {
        init_logging(self.verbose, self.quiet);

        let cwd = std::env::current_dir().context("Failed to determine working directory")?;
        let config = RenderConfig::discover(self.config.as_deref(), &cwd)?;
        let options = self.build_options(&config)?;

        if !self.source.is_dir() {
            bail!("Source {} is not a directory", self.source.display());
        }

        let source = DirSource::new(&self.source);
        info!("Rendering {} into {}", self.source.display(), self.dest.display());

        let stats = if self.archive {
            render_archive(&source, &self.dest, options)?
        } else {
            let writer = DirWriter::new(&self.dest).with_context(|| {
                format!("Failed to create destination {}", self.dest.display())
            })?;
            copy(&source, &writer, options)?
        };

        if !self.quiet {
            print_summary(&self.source, &self.dest, &stats);
        }
        Ok(stats)
    }

    /// Combine flags with the config file. Flags win.
    ///
    /// # Errors
    ///
    /// Fails when a data file or assignment is invalid.
    pub fn build_options(&self, config: &RenderConfig) -> Result<Options> {
        let context = build_context(config, &self.data, &self.set)?;
        let ignore = if self.ignore.is_empty() {
            config.ignore.clone()
        } else {
            self.ignore.clone()
        };
        let on_conflict = self.on_conflict.or_else(|| config.conflict_policy()).unwrap_or_default();

        debug!("Context keys: {:?}", context.keys().collect::<Vec<_>>());

        Ok(Options::new()
            .with_context(context)
            .strict(self.strict || config.strict.unwrap_or(false))
            .template_binary(self.template_binary || config.template_binary.unwrap_or(false))
            .on_conflict(on_conflict)
            .ignore(ignore))
    }
}

fn render_archive(source: &DirSource, dest: &Path, options: Options) -> Result<Stats> {
    let writer = ZipWriter::create(dest)
        .with_context(|| format!("Failed to create archive {}", dest.display()))?;
    let stats = match copy(source, &writer, options) {
        Ok(stats) => stats,
        Err(failure) => {
            // The archive would hold only part of the tree.
            drop(writer);
            if let Err(err) = std::fs::remove_file(dest) {
                warn!("Failed to remove partial archive {}: {}", dest.display(), err);
            }
            return Err(failure.into());
        }
    };
    writer.finish().with_context(|| format!("Failed to finalize archive {}", dest.display()))?;
    Ok(stats)
}

fn print_summary(source: &Path, dest: &Path, stats: &Stats) {
    println!("{} Rendered {} into {}", "✓".green(), source.display(), dest.display());
    println!(
        "  {} created, {} updated, {} skipped, {} identical",
        stats.created.to_string().green(),
        stats.updated.to_string().yellow(),
        stats.skipped.to_string().cyan(),
        stats.identical.to_string().dimmed()
    );
}

/// Install the stderr log subscriber.
///
/// `--verbose` selects debug, `--quiet` errors only, otherwise `RUST_LOG` or
/// info.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Process exit status for a failed run.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    let conflict = error
        .chain()
        .filter_map(|e| e.downcast_ref::<RenderFsError>())
        .any(|e| matches!(e, RenderFsError::Conflict { .. }));
    if conflict { EXIT_CONFLICT } else { EXIT_FAILURE }
}
