//! renderfs CLI entry point
//!
//! Parses arguments, runs the copy, and turns failures into colored
//! diagnostics with a meaningful exit status.

use clap::Parser;
use renderfs::cli::{self, Cli};
use renderfs::core::user_friendly_error;

fn main() {
    let cli = Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let code = cli::exit_code(&e);
        user_friendly_error(&e).display();
        std::process::exit(code);
    }
}
