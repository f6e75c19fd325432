//! Lexer for the Quipu programming language
//!
//! Handles tokenization including:
//! - Keywords and identifiers
//! - Numeric literals (decimal, hex, binary, character literals)
//! - String literals and interpolated strings (`$"..."`)
//! - `///` documentation comments
//! - Operators and punctuation, with `>>` split into two `>` tokens while a
//!   generic type-argument list is being parsed
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, the keyword table)
//! - `strings` - String/char/interpolated-string scanning
//! - `numbers` - Numeric literal scanning
//!
//! The lexer is pull-based: the parser owns it, reads `current()`, and
//! advances on demand with `next_token`. Interpolated strings interleave the
//! two: after each `{argument}` the parser calls `read_interpolated_string`
//! to resume scanning the literal where the argument ended.

mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{TokenKind, KEYWORDS};

use crate::frontend::diagnostics::CompileError;
use crate::frontend::source::SourceReader;

/// Lexer over one Quipu source file.
pub struct Lexer {
    reader: SourceReader,
    current: TokenKind,
    token_line: usize,
    parsing_type_arg: bool,
}

impl Lexer {
    /// Open a lexer over the given input. No token is read yet; the caller
    /// primes the stream with the first `next_token` call.
    pub fn open(filename: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            reader: SourceReader::open(filename, source),
            current: TokenKind::Eof,
            token_line: 1,
            parsing_type_arg: false,
        }
    }

    pub fn filename(&self) -> &str {
        self.reader.filename()
    }

    /// 1-based line of the current token's first character.
    pub fn line(&self) -> usize {
        self.token_line
    }

    /// The current token.
    pub fn current(&self) -> &TokenKind {
        &self.current
    }

    /// Toggle the `>`/`>>` treatment used inside generic type-argument
    /// lists. Returns the previous setting so the caller can restore it.
    pub fn set_parsing_type_arg(&mut self, on: bool) -> bool {
        std::mem::replace(&mut self.parsing_type_arg, on)
    }

    // ========================================================================
    // Token-level operations used by the parser
    // ========================================================================

    /// Is the current token of the given kind? Literal payloads are ignored.
    pub fn see(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current) == std::mem::discriminant(kind)
    }

    /// Advance to the next token, returning the token that was current.
    pub fn next_token(&mut self) -> Result<TokenKind, CompileError> {
        let next = self.read_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Advance past the current token if it matches.
    pub fn eat(&mut self, kind: &TokenKind) -> Result<bool, CompileError> {
        if self.see(kind) {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Require the current token to match, and advance past it.
    pub fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), CompileError> {
        self.check(kind, what)?;
        self.next_token()?;
        Ok(())
    }

    /// Require the current token to match without consuming it.
    pub fn check(&self, kind: &TokenKind, what: &str) -> Result<(), CompileError> {
        if self.see(kind) {
            Ok(())
        } else {
            Err(CompileError::structural(
                self.reader.filename(),
                self.token_line,
                format!("Expected {}, found {}", what, self.current),
            ))
        }
    }

    /// Resume scanning an interpolated string after the `}` that closed an
    /// argument. Replaces the current token with the next fragment: an
    /// `InterpolatedString` if another argument follows, or the final
    /// `LiteralString` suffix.
    pub fn read_interpolated_string(&mut self) -> Result<(), CompileError> {
        self.token_line = self.reader.line();
        self.current = self.read_string(true)?;
        Ok(())
    }

    // ========================================================================
    // Capture plumbing for native blocks
    // ========================================================================

    /// Start capturing every character consumed from here on.
    pub fn attach_capture(&mut self) {
        self.reader.attach_capture();
    }

    /// Stop capturing and take the buffer.
    pub fn detach_capture(&mut self) -> String {
        self.reader.detach_capture()
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    pub(super) fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::lexical(self.reader.filename(), self.token_line, message)
    }

    fn read_token(&mut self) -> Result<TokenKind, CompileError> {
        loop {
            while let Some(c) = self.reader.peek_char() {
                if c.is_whitespace() {
                    self.reader.read_char();
                } else {
                    break;
                }
            }

            self.token_line = self.reader.line();

            let Some(c) = self.reader.read_char() else {
                return Ok(TokenKind::Eof);
            };

            let kind = match c {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                ':' => TokenKind::Colon,
                '?' => TokenKind::Question,
                '#' => TokenKind::Hash,
                '~' => TokenKind::Tilde,

                '.' => {
                    if self.reader.eat_char('.') {
                        TokenKind::DotDot
                    } else {
                        TokenKind::Dot
                    }
                }

                '+' => {
                    if self.reader.eat_char('+') {
                        TokenKind::PlusPlus
                    } else if self.reader.eat_char('=') {
                        TokenKind::PlusEq
                    } else {
                        TokenKind::Plus
                    }
                }
                '-' => {
                    if self.reader.eat_char('-') {
                        TokenKind::MinusMinus
                    } else if self.reader.eat_char('=') {
                        TokenKind::MinusEq
                    } else {
                        TokenKind::Minus
                    }
                }
                '*' => {
                    if self.reader.eat_char('=') {
                        TokenKind::StarEq
                    } else {
                        TokenKind::Star
                    }
                }
                '%' => {
                    if self.reader.eat_char('=') {
                        TokenKind::PercentEq
                    } else {
                        TokenKind::Percent
                    }
                }

                '/' => {
                    if self.reader.eat_char('/') {
                        if self.reader.eat_char('/') {
                            return self.read_doc_comment();
                        }
                        self.skip_line();
                        continue;
                    } else if self.reader.eat_char('*') {
                        self.skip_block_comment()?;
                        continue;
                    } else if self.reader.eat_char('=') {
                        TokenKind::SlashEq
                    } else {
                        TokenKind::Slash
                    }
                }

                '&' => {
                    if self.reader.eat_char('&') {
                        TokenKind::AmpAmp
                    } else if self.reader.eat_char('=') {
                        TokenKind::AmpEq
                    } else {
                        TokenKind::Amp
                    }
                }
                '|' => {
                    if self.reader.eat_char('|') {
                        TokenKind::PipePipe
                    } else if self.reader.eat_char('=') {
                        TokenKind::PipeEq
                    } else {
                        TokenKind::Pipe
                    }
                }
                '^' => {
                    if self.reader.eat_char('=') {
                        TokenKind::CaretEq
                    } else {
                        TokenKind::Caret
                    }
                }

                '!' => {
                    if self.reader.eat_char('=') {
                        TokenKind::NotEq
                    } else {
                        TokenKind::Bang
                    }
                }
                '=' => {
                    if self.reader.eat_char('=') {
                        TokenKind::EqEq
                    } else if self.reader.eat_char('>') {
                        TokenKind::FatArrow
                    } else {
                        TokenKind::Eq
                    }
                }

                '<' => {
                    if self.reader.eat_char('=') {
                        TokenKind::LtEq
                    } else if self.reader.eat_char('<') {
                        if self.reader.eat_char('=') {
                            TokenKind::ShlEq
                        } else {
                            TokenKind::Shl
                        }
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    // Inside a generic type-argument list `>>` closes two
                    // nested lists, so only one `>` may be consumed here.
                    if self.parsing_type_arg {
                        TokenKind::Gt
                    } else if self.reader.eat_char('=') {
                        TokenKind::GtEq
                    } else if self.reader.eat_char('>') {
                        if self.reader.eat_char('=') {
                            TokenKind::ShrEq
                        } else {
                            TokenKind::Shr
                        }
                    } else {
                        TokenKind::Gt
                    }
                }

                '"' => self.read_string(false)?,
                '\'' => self.read_char_literal()?,
                '$' => {
                    if self.reader.eat_char('"') {
                        self.read_string(true)?
                    } else {
                        return Err(self.error("Expected '\"' after '$'"));
                    }
                }

                '0'..='9' => self.read_number(c)?,

                _ if is_ident_start(c) => self.read_identifier(c),

                _ => return Err(self.error(format!("Invalid character '{}'", c))),
            };

            return Ok(kind);
        }
    }

    fn read_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);
        while let Some(c) = self.reader.peek_char() {
            if is_ident_continue(c) {
                name.push(c);
                self.reader.read_char();
            } else {
                break;
            }
        }
        KEYWORDS.get(name.as_str()).cloned().unwrap_or(TokenKind::Id(name))
    }

    /// Scan one `///` line. Consecutive doc-comment lines become separate
    /// tokens; the parser concatenates them into one documentation block.
    fn read_doc_comment(&mut self) -> Result<TokenKind, CompileError> {
        let mut text = String::new();
        if self.reader.peek_char() == Some(' ') {
            self.reader.read_char();
        }
        while let Some(c) = self.reader.read_char() {
            if c == '\n' {
                break;
            }
            if c != '\r' {
                text.push(c);
            }
        }
        Ok(TokenKind::DocComment(text))
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.reader.read_char() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), CompileError> {
        loop {
            match self.reader.read_char() {
                None => return Err(self.error("Unterminated block comment")),
                Some('*') => {
                    if self.reader.eat_char('/') {
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }
}

/// Check if a character can start an identifier (ASCII-only).
pub(super) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
pub(super) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Drain a source string into a token list.
///
/// Convenience for tests and fuzzing; interpolated-string continuations are
/// parser-driven, so this sees the raw fragment boundaries only.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(filename: &str, source: &str) -> Result<Vec<TokenKind>, CompileError> {
    let mut lexer = Lexer::open(filename, source);
    lexer.next_token()?;
    let mut tokens = Vec::new();
    loop {
        let kind = lexer.current().clone();
        let done = matches!(kind, TokenKind::Eof);
        tokens.push(kind);
        if done {
            return Ok(tokens);
        }
        lexer.next_token()?;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let tokens = lex("test.qp", "class enum native foreach sealed throws").unwrap();
        assert!(matches!(tokens[0], TokenKind::Class));
        assert!(matches!(tokens[1], TokenKind::Enum));
        assert!(matches!(tokens[2], TokenKind::Native));
        assert!(matches!(tokens[3], TokenKind::Foreach));
        assert!(matches!(tokens[4], TokenKind::Sealed));
        assert!(matches!(tokens[5], TokenKind::Throws));
    }

    #[test]
    fn test_identifiers() {
        let tokens = lex("test.qp", "foo _bar baz2").unwrap();
        assert!(matches!(&tokens[0], TokenKind::Id(s) if s == "foo"));
        assert!(matches!(&tokens[1], TokenKind::Id(s) if s == "_bar"));
        assert!(matches!(&tokens[2], TokenKind::Id(s) if s == "baz2"));
    }

    #[test]
    fn test_operators() {
        let tokens = lex("test.qp", "+ ++ += << <<= >>= && || => .. # !").unwrap();
        assert!(matches!(tokens[0], TokenKind::Plus));
        assert!(matches!(tokens[1], TokenKind::PlusPlus));
        assert!(matches!(tokens[2], TokenKind::PlusEq));
        assert!(matches!(tokens[3], TokenKind::Shl));
        assert!(matches!(tokens[4], TokenKind::ShlEq));
        assert!(matches!(tokens[5], TokenKind::ShrEq));
        assert!(matches!(tokens[6], TokenKind::AmpAmp));
        assert!(matches!(tokens[7], TokenKind::PipePipe));
        assert!(matches!(tokens[8], TokenKind::FatArrow));
        assert!(matches!(tokens[9], TokenKind::DotDot));
        assert!(matches!(tokens[10], TokenKind::Hash));
        assert!(matches!(tokens[11], TokenKind::Bang));
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("test.qp", "42 0x1f 0b1010 1_000_000 2.5 1e10 6.02e23").unwrap();
        assert!(matches!(tokens[0], TokenKind::LiteralLong(42)));
        assert!(matches!(tokens[1], TokenKind::LiteralLong(31)));
        assert!(matches!(tokens[2], TokenKind::LiteralLong(10)));
        assert!(matches!(tokens[3], TokenKind::LiteralLong(1_000_000)));
        assert!(matches!(tokens[4], TokenKind::LiteralDouble(d) if (d - 2.5).abs() < 1e-9));
        assert!(matches!(tokens[5], TokenKind::LiteralDouble(d) if (d - 1e10).abs() < 1.0));
        assert!(matches!(tokens[6], TokenKind::LiteralDouble(_)));
    }

    #[test]
    fn test_range_not_double() {
        // 1..2 is LiteralLong DotDot LiteralLong, not a malformed double
        let tokens = lex("test.qp", "1..2").unwrap();
        assert!(matches!(tokens[0], TokenKind::LiteralLong(1)));
        assert!(matches!(tokens[1], TokenKind::DotDot));
        assert!(matches!(tokens[2], TokenKind::LiteralLong(2)));
    }

    #[test]
    fn test_char_literal() {
        let tokens = lex("test.qp", r"'A' '\n' '\''").unwrap();
        assert!(matches!(tokens[0], TokenKind::LiteralLong(65)));
        assert!(matches!(tokens[1], TokenKind::LiteralLong(10)));
        assert!(matches!(tokens[2], TokenKind::LiteralLong(39)));
    }

    #[test]
    fn test_strings() {
        let tokens = lex("test.qp", r#""hello" "a\tb" "q\"q""#).unwrap();
        assert!(matches!(&tokens[0], TokenKind::LiteralString(s) if s == "hello"));
        assert!(matches!(&tokens[1], TokenKind::LiteralString(s) if s == "a\tb"));
        assert!(matches!(&tokens[2], TokenKind::LiteralString(s) if s == "q\"q"));
    }

    #[test]
    fn test_interpolated_string_opens_fragment() {
        // The lexer returns the prefix and hands control to the parser;
        // only the first fragment is visible at the raw token level.
        let mut lexer = Lexer::open("test.qp", r#"$"a{x"#);
        lexer.next_token().unwrap();
        assert!(matches!(lexer.current(), TokenKind::InterpolatedString(s) if s == "a"));
        lexer.next_token().unwrap();
        assert!(matches!(lexer.current(), TokenKind::Id(s) if s == "x"));
    }

    #[test]
    fn test_interpolated_string_without_arguments() {
        let tokens = lex("test.qp", r#"$"plain""#).unwrap();
        assert!(matches!(&tokens[0], TokenKind::LiteralString(s) if s == "plain"));
    }

    #[test]
    fn test_doc_comment() {
        let tokens = lex("test.qp", "/// Computes the hash.\nx").unwrap();
        assert!(matches!(&tokens[0], TokenKind::DocComment(s) if s == "Computes the hash."));
        assert!(matches!(&tokens[1], TokenKind::Id(s) if s == "x"));
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = lex("test.qp", "a // trailing\nb /* inline */ c").unwrap();
        assert!(matches!(&tokens[0], TokenKind::Id(s) if s == "a"));
        assert!(matches!(&tokens[1], TokenKind::Id(s) if s == "b"));
        assert!(matches!(&tokens[2], TokenKind::Id(s) if s == "c"));
        assert!(matches!(tokens[3], TokenKind::Eof));
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("test.qp", "\"abc").unwrap_err();
        assert!(err.message.contains("Unterminated string"));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_invalid_escape() {
        let err = lex("test.qp", r#""\q""#).unwrap_err();
        assert!(err.message.contains("escape"));
    }

    #[test]
    fn test_invalid_character() {
        let err = lex("test.qp", "@").unwrap_err();
        assert!(err.message.contains("Invalid character"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = lex("test.qp", "/* no end").unwrap_err();
        assert!(err.message.contains("block comment"));
    }

    #[test]
    fn test_token_lines() {
        let mut lexer = Lexer::open("test.qp", "a\n  b\n\nc");
        lexer.next_token().unwrap();
        assert_eq!(lexer.line(), 1);
        lexer.next_token().unwrap();
        assert_eq!(lexer.line(), 2);
        lexer.next_token().unwrap();
        assert_eq!(lexer.line(), 4);
    }

    #[test]
    fn test_shift_split_in_type_arg_mode() {
        let mut lexer = Lexer::open("test.qp", ">> >>");
        lexer.set_parsing_type_arg(true);
        lexer.next_token().unwrap();
        assert!(matches!(lexer.current(), TokenKind::Gt));
        lexer.next_token().unwrap();
        assert!(matches!(lexer.current(), TokenKind::Gt));
        lexer.set_parsing_type_arg(false);
        lexer.next_token().unwrap();
        assert!(matches!(lexer.current(), TokenKind::Shr));
    }
}
