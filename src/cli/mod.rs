//! CLI module for the Quipu compiler
//!
//! ## Commands
//!
//! - `check <files...>` - Parse sources and report diagnostics
//! - `ast <files...>` - Parse sources and dump the program as JSON
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. Command
//! functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::process;

use clap::{Parser, Subcommand};
use thiserror::Error;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: i32,
}

impl CliError {
    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: 1,
        }
    }

    /// A failure whose diagnostic has already been printed.
    pub fn reported() -> Self {
        Self {
            message: String::new(),
            exit_code: 1,
        }
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Argument definitions
// ============================================================================

#[derive(Parser)]
#[command(name = "quipu", version, about = "Quipu language front end")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse source files and report errors
    Check {
        /// Source files, parsed into one program in order
        files: Vec<String>,
    },
    /// Parse source files and print the program as JSON
    Ast {
        /// Source files, parsed into one program in order
        files: Vec<String>,
        /// Print unformatted JSON
        #[arg(long)]
        compact: bool,
    },
}

/// Parse arguments, dispatch, print errors, and set the exit code.
pub fn run() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Check { files } => commands::check(&files),
        Command::Ast { files, compact } => commands::ast(&files, compact),
    };
    if let Err(error) = result {
        if !error.message.is_empty() {
            eprintln!("{}", error);
        }
        process::exit(error.exit_code);
    }
}
