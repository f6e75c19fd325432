//! Number scanning for the Quipu lexer
//!
//! Handles decimal, hex (`0x`), and binary (`0b`) integers plus
//! floating-point literals. Underscores are digit separators everywhere.

use super::tokens::TokenKind;
use super::{is_ident_start, Lexer};
use crate::frontend::diagnostics::CompileError;

impl Lexer {
    pub(super) fn read_number(&mut self, first: char) -> Result<TokenKind, CompileError> {
        if first == '0' {
            if self.reader.eat_char('x') {
                return self.read_radix_digits(16, "hexadecimal");
            }
            if self.reader.eat_char('b') {
                return self.read_radix_digits(2, "binary");
            }
        }

        let mut value = String::from(first);
        self.read_digits(&mut value);
        let mut is_double = false;

        // Fraction. `1..2` is a range, so a dot counts only when a digit
        // follows it.
        if self.reader.peek_char() == Some('.')
            && self.reader.peek_second().is_some_and(|c| c.is_ascii_digit())
        {
            is_double = true;
            value.push('.');
            self.reader.read_char();
            self.read_digits(&mut value);
        }

        // Exponent
        if matches!(self.reader.peek_char(), Some('e' | 'E')) {
            is_double = true;
            value.push('e');
            self.reader.read_char();
            if let Some(sign @ ('+' | '-')) = self.reader.peek_char() {
                value.push(sign);
                self.reader.read_char();
            }
            if !self.reader.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("Invalid floating-point literal"));
            }
            self.read_digits(&mut value);
        }

        self.check_literal_end()?;

        if is_double {
            match value.parse::<f64>() {
                Ok(d) => Ok(TokenKind::LiteralDouble(d)),
                Err(_) => Err(self.error(format!("Invalid floating-point literal '{}'", value))),
            }
        } else {
            match value.parse::<i64>() {
                Ok(i) => Ok(TokenKind::LiteralLong(i)),
                Err(_) => Err(self.error(format!("Integer '{}' out of range", value))),
            }
        }
    }

    /// Digits of a hex or binary literal, after the `0x`/`0b` prefix.
    fn read_radix_digits(&mut self, radix: u32, what: &str) -> Result<TokenKind, CompileError> {
        let mut value = String::new();
        while let Some(c) = self.reader.peek_char() {
            if c == '_' {
                self.reader.read_char();
            } else if c.to_digit(radix).is_some() {
                value.push(c);
                self.reader.read_char();
            } else {
                break;
            }
        }
        if value.is_empty() {
            return Err(self.error(format!("Invalid {} literal", what)));
        }
        self.check_literal_end()?;
        match i64::from_str_radix(&value, radix) {
            Ok(i) => Ok(TokenKind::LiteralLong(i)),
            Err(_) => Err(self.error(format!("Integer '{}' out of range", value))),
        }
    }

    fn read_digits(&mut self, value: &mut String) {
        while let Some(c) = self.reader.peek_char() {
            match c {
                '0'..='9' => {
                    value.push(c);
                    self.reader.read_char();
                }
                '_' => {
                    self.reader.read_char();
                }
                _ => break,
            }
        }
    }

    /// A numeric literal must not run straight into an identifier or
    /// further digits (`123abc`, `0b12`).
    fn check_literal_end(&mut self) -> Result<(), CompileError> {
        if self
            .reader
            .peek_char()
            .is_some_and(|c| is_ident_start(c) || c.is_ascii_digit())
        {
            return Err(self.error("Invalid numeric literal"));
        }
        Ok(())
    }
}
