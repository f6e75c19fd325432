//! CLI command implementations

use std::fs;

use crate::frontend::ast::Program;
use crate::frontend::diagnostics;
use crate::frontend::parser::Parser;

use super::{CliError, CliResult};

/// Parse every file, in order, into one accumulating program. On a parse
/// failure the diagnostic is printed with source context.
fn parse_files(files: &[String]) -> CliResult<Program> {
    if files.is_empty() {
        return Err(CliError::failure("No input files"));
    }
    let mut parser = Parser::new();
    for file in files {
        let source = fs::read_to_string(file)
            .map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file, e)))?;
        if let Err(error) = parser.parse(file, &source) {
            diagnostics::print_error(&source, &error);
            return Err(CliError::reported());
        }
    }
    Ok(parser.into_program())
}

pub fn check(files: &[String]) -> CliResult<()> {
    let program = parse_files(files)?;
    println!(
        "parsed {} type(s) and {} top-level native block(s) from {} file(s)",
        program.types.len(),
        program.top_level_natives.len(),
        files.len()
    );
    Ok(())
}

pub fn ast(files: &[String], compact: bool) -> CliResult<()> {
    let program = parse_files(files)?;
    let json = if compact {
        serde_json::to_string(&program)
    } else {
        serde_json::to_string_pretty(&program)
    };
    match json {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => Err(CliError::failure(format!("Error serializing AST: {}", e))),
    }
}
