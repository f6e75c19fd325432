//! String scanning for the Quipu lexer
//!
//! Handles regular strings, character literals, and the literal fragments of
//! interpolated strings.

use super::tokens::TokenKind;
use super::Lexer;
use crate::frontend::diagnostics::CompileError;

impl Lexer {
    /// Scan string content after an opening `"` (or, for interpolated
    /// strings, after the `}` closing an argument).
    ///
    /// In interpolated mode a `{` ends the fragment: the literal prefix is
    /// returned as `InterpolatedString` and the parser takes over to parse
    /// the argument. The closing `"` always yields a plain `LiteralString`,
    /// which for an interpolated string is the final suffix.
    pub(super) fn read_string(&mut self, interpolated: bool) -> Result<TokenKind, CompileError> {
        let mut value = String::new();
        loop {
            let Some(c) = self.reader.read_char() else {
                return Err(self.error("Unterminated string literal"));
            };
            match c {
                '"' => return Ok(TokenKind::LiteralString(value)),
                '{' if interpolated => {
                    if self.reader.eat_char('{') {
                        value.push('{');
                    } else {
                        return Ok(TokenKind::InterpolatedString(value));
                    }
                }
                '\n' => return Err(self.error("Unterminated string literal")),
                '\\' => value.push(self.read_escape()?),
                _ => value.push(c),
            }
        }
    }

    /// Scan a character literal after the opening `'`. The decoded code
    /// point becomes an integer literal.
    pub(super) fn read_char_literal(&mut self) -> Result<TokenKind, CompileError> {
        let value = match self.reader.read_char() {
            None | Some('\n') => return Err(self.error("Unterminated character literal")),
            Some('\'') => return Err(self.error("Empty character literal")),
            Some('\\') => self.read_escape()?,
            Some(c) => c,
        };
        if !self.reader.eat_char('\'') {
            return Err(self.error("Unterminated character literal"));
        }
        Ok(TokenKind::LiteralLong(value as i64))
    }

    /// Decode one escape sequence after the backslash.
    fn read_escape(&mut self) -> Result<char, CompileError> {
        match self.reader.read_char() {
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('0') => Ok('\0'),
            Some('\\') => Ok('\\'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some(c) => Err(self.error(format!("Invalid escape sequence '\\{}'", c))),
            None => Err(self.error("Unterminated string literal")),
        }
    }
}
