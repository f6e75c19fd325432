//! Diagnostics and error reporting for the Quipu front end
//!
//! The front end reports exactly one failure per parse: the first lexical,
//! structural, or contextual violation aborts with a `CompileError` carrying
//! the filename, the 1-based source line, and a message.

use std::fmt;

/// A compile-time error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub filename: String,
    pub line: usize,
    pub kind: ErrorKind,
    pub message: String,
}

impl CompileError {
    /// A malformed token: bad character, bad literal, unterminated string,
    /// illegal escape, bad interpolation format.
    pub fn lexical(filename: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            line,
            kind: ErrorKind::Lexical,
            message: message.into(),
        }
    }

    /// An unexpected token or missing punctuator.
    pub fn structural(filename: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            line,
            kind: ErrorKind::Structural,
            message: message.into(),
        }
    }

    /// A well-formed construct in an illegal position: `break` outside a
    /// loop, a duplicate constructor, a bad modifier combination.
    pub fn contextual(filename: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            line,
            kind: ErrorKind::Contextual,
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}: {}", self.filename, self.line, self.kind, self.message)
    }
}

impl std::error::Error for CompileError {}

/// Reporting category of a [`CompileError`].
///
/// The parse fails the same way regardless of the category; it only affects
/// how the error is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Structural,
    Contextual,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "lex error"),
            ErrorKind::Structural => write!(f, "syntax error"),
            ErrorKind::Contextual => write!(f, "error"),
        }
    }
}

/// Print an error with the offending source line.
pub fn print_error(source: &str, error: &CompileError) {
    let red = "\x1b[31m";
    let cyan = "\x1b[36m";
    let bold = "\x1b[1m";
    let reset = "\x1b[0m";

    eprintln!(
        "{bold}{red}{kind}{reset}{bold}: {message}{reset}",
        kind = error.kind,
        message = error.message,
    );
    eprintln!(
        "  {cyan}-->{reset} {file}:{line}",
        file = error.filename,
        line = error.line,
    );

    if let Some(text) = source.lines().nth(error.line.saturating_sub(1)) {
        let width = error.line.to_string().len();
        eprintln!("  {cyan}{:>width$} |{reset}", "");
        eprintln!("  {cyan}{} |{reset} {}", error.line, text);
        eprintln!("  {cyan}{:>width$} |{reset}", "");
    }

    eprintln!();
}
