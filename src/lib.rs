//! Quipu - a small statically typed, object-oriented language that
//! transpiles to C-family targets.
//!
//! This crate is the front end: lexer, parser, and the AST the per-target
//! generators consume.

pub mod cli;
pub mod frontend;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::source;
