//! Parser for the Quipu programming language
//!
//! A recursive-descent parser with one token of lookahead. It pulls tokens
//! from the [`Lexer`] on demand and builds the AST bottom-up, appending
//! top-level types to an accumulating [`Program`]. The first violation of
//! any rule aborts the parse; there is no error recovery.
//!
//! Besides the token stream the parser tracks a small amount of context:
//! a stack of enclosing loops and switches (for `break`/`continue` and the
//! `has_break` marks), the innermost `&&`/`||`/`?` context in which `++`
//! and `--` are rejected, and the generic type-argument mode that makes the
//! lexer split `>>` into two `>` tokens.

use crate::frontend::ast::*;
use crate::frontend::diagnostics::CompileError;
use crate::frontend::lexer::{Lexer, TokenKind};

/// One enclosing loop or switch during parsing.
struct LoopFrame {
    id: LoopId,
    is_loop: bool,
    has_break: bool,
}

/// Parser state. One instance may parse several files in sequence; the
/// program keeps accumulating declarations.
pub struct Parser {
    lexer: Lexer,
    program: Program,
    loop_stack: Vec<LoopFrame>,
    xcrement_parent: Option<&'static str>,
    next_loop_id: u32,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            lexer: Lexer::open(String::new(), String::new()),
            program: Program::new(),
            loop_stack: Vec::new(),
            xcrement_parent: None,
            next_loop_id: 0,
        }
    }

    /// The accumulating parse result.
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn into_program(self) -> Program {
        self.program
    }

    /// Parse one source file, appending its declarations to the program.
    #[tracing::instrument(skip_all, fields(filename = %filename, source_len = source.len()))]
    pub fn parse(&mut self, filename: &str, source: &str) -> Result<(), CompileError> {
        self.lexer = Lexer::open(filename, source);
        self.loop_stack.clear();
        self.xcrement_parent = None;
        self.lexer.next_token()?;
        while !self.see(&TokenKind::Eof) {
            self.parse_top_level()?;
        }
        Ok(())
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn see(&self, kind: &TokenKind) -> bool {
        self.lexer.see(kind)
    }

    fn next(&mut self) -> Result<TokenKind, CompileError> {
        self.lexer.next_token()
    }

    fn eat(&mut self, kind: &TokenKind) -> Result<bool, CompileError> {
        self.lexer.eat(kind)
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), CompileError> {
        self.lexer.expect(kind, what)
    }

    fn line(&self) -> usize {
        self.lexer.line()
    }

    fn err_structural(&self, message: impl Into<String>) -> CompileError {
        CompileError::structural(self.lexer.filename(), self.lexer.line(), message)
    }

    fn err_contextual(&self, message: impl Into<String>) -> CompileError {
        CompileError::contextual(self.lexer.filename(), self.lexer.line(), message)
    }

    fn err_lexical(&self, message: impl Into<String>) -> CompileError {
        CompileError::lexical(self.lexer.filename(), self.lexer.line(), message)
    }

    fn expect_id(&mut self, what: &str) -> Result<Ident, CompileError> {
        if let TokenKind::Id(name) = self.lexer.current() {
            let name = name.clone();
            self.next()?;
            Ok(name)
        } else {
            Err(self.err_structural(format!("Expected {}, found {}", what, self.lexer.current())))
        }
    }

    /// Collect consecutive `///` lines into one documentation block.
    fn parse_doc(&mut self) -> Result<Option<String>, CompileError> {
        let mut text = String::new();
        let mut found = false;
        while let TokenKind::DocComment(docline) = self.lexer.current() {
            found = true;
            text.push_str(docline);
            text.push('\n');
            self.next()?;
        }
        Ok(if found { Some(text) } else { None })
    }

    fn new_loop_id(&mut self) -> LoopId {
        let id = LoopId(self.next_loop_id);
        self.next_loop_id += 1;
        id
    }

    // ========================================================================
    // Increment/decrement restriction
    // ========================================================================

    /// Run `f` with `xcrement_parent` set, restoring the previous value on
    /// every exit path.
    fn with_xcrement<T>(
        &mut self,
        parent: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        let saved = std::mem::replace(&mut self.xcrement_parent, Some(parent));
        let result = f(self);
        self.xcrement_parent = saved;
        result
    }

    /// Reject `++`/`--` about to be parsed inside a `&&`, `||`, or `?`
    /// context.
    fn check_xcrement(&self, op: &str) -> Result<(), CompileError> {
        if let Some(parent) = self.xcrement_parent {
            return Err(self.err_contextual(format!("'{}' not allowed inside '{}'", op, parent)));
        }
        Ok(())
    }

    /// Reject an already-parsed operand that contains `++`/`--` when it
    /// turns out to be the left side of `&&`/`||` or the condition of `?`.
    fn check_operand_xcrement(&self, operand: &Expr, parent: &str) -> Result<(), CompileError> {
        if let Some(op) = find_xcrement(operand) {
            return Err(self.err_contextual(format!("'{}' not allowed inside '{}'", op, parent)));
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expr(&mut self) -> Result<Expr, CompileError> {
        self.parse_select()
    }

    /// `cond ? on_true : on_false`, right-associative. Both branches are
    /// `++`/`--`-restricted.
    fn parse_select(&mut self) -> Result<Expr, CompileError> {
        let cond = self.parse_cond_or()?;
        if !self.see(&TokenKind::Question) {
            return Ok(cond);
        }
        self.check_operand_xcrement(&cond, "?")?;
        self.next()?;
        let on_true = self.with_xcrement("?", |p| p.parse_select())?;
        self.expect(&TokenKind::Colon, "':'")?;
        let on_false = self.with_xcrement("?", |p| p.parse_select())?;
        Ok(Expr::Select {
            line: cond.line(),
            cond: Box::new(cond),
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
        })
    }

    fn parse_cond_or(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_cond_and()?;
        while self.see(&TokenKind::PipePipe) {
            self.check_operand_xcrement(&left, "||")?;
            self.next()?;
            let right = self.with_xcrement("||", |p| p.parse_cond_and())?;
            left = Expr::Binary {
                line: left.line(),
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_cond_and(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_or()?;
        while self.see(&TokenKind::AmpAmp) {
            self.check_operand_xcrement(&left, "&&")?;
            self.next()?;
            let right = self.with_xcrement("&&", |p| p.parse_or())?;
            left = Expr::Binary {
                line: left.line(),
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_xor()?;
        while self.eat(&TokenKind::Pipe)? {
            let right = self.parse_xor()?;
            left = Expr::Binary {
                line: left.line(),
                op: BinaryOp::BitOr,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_xor(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Caret)? {
            let right = self.parse_and()?;
            left = Expr::Binary {
                line: left.line(),
                op: BinaryOp::BitXor,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::Amp)? {
            let right = self.parse_equality()?;
            left = Expr::Binary {
                line: left.line(),
                op: BinaryOp::BitAnd,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_rel()?;
        loop {
            let op = if self.see(&TokenKind::EqEq) {
                BinaryOp::Eq
            } else if self.see(&TokenKind::NotEq) {
                BinaryOp::NotEq
            } else {
                return Ok(left);
            };
            self.next()?;
            let right = self.parse_rel()?;
            left = Expr::Binary {
                line: left.line(),
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_rel(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.lexer.current() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                TokenKind::Is => {
                    self.next()?;
                    let right = self.parse_is_operand()?;
                    left = Expr::Binary {
                        line: left.line(),
                        op: BinaryOp::Is,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    continue;
                }
                _ => return Ok(left),
            };
            self.next()?;
            let right = self.parse_shift()?;
            left = Expr::Binary {
                line: left.line(),
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    /// The right side of `is`: a type, optionally binding a variable
    /// (`expr is Shape s`).
    fn parse_is_operand(&mut self) -> Result<Expr, CompileError> {
        let ty = self.parse_primary()?;
        if matches!(self.lexer.current(), TokenKind::Id(_)) {
            let line = ty.line();
            let name = self.expect_id("a variable name")?;
            return Ok(Expr::Var(Box::new(VarDecl {
                line,
                doc: None,
                ty,
                name,
                value: None,
            })));
        }
        Ok(ty)
    }

    fn parse_shift(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.see(&TokenKind::Shl) {
                BinaryOp::Shl
            } else if self.see(&TokenKind::Shr) {
                BinaryOp::Shr
            } else {
                return Ok(left);
            };
            self.next()?;
            let right = self.parse_additive()?;
            left = Expr::Binary {
                line: left.line(),
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_mul()?;
        loop {
            let op = if self.see(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.see(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(left);
            };
            self.next()?;
            let right = self.parse_mul()?;
            left = Expr::Binary {
                line: left.line(),
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_mul(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_primary()?;
        loop {
            let op = if self.see(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.see(&TokenKind::Slash) {
                BinaryOp::Div
            } else if self.see(&TokenKind::Percent) {
                BinaryOp::Mod
            } else {
                return Ok(left);
            };
            self.next()?;
            let right = self.parse_primary()?;
            left = Expr::Binary {
                line: left.line(),
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    /// Unary prefixes, core primaries, and postfix operators. Prefixes are
    /// right-associative; `new` and `resource` take a type rather than an
    /// expression.
    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let line = self.line();
        match self.lexer.current() {
            TokenKind::Minus => {
                self.next()?;
                Ok(Expr::Prefix {
                    line,
                    op: UnaryOp::Neg,
                    inner: Box::new(self.parse_primary()?),
                })
            }
            TokenKind::Tilde => {
                self.next()?;
                Ok(Expr::Prefix {
                    line,
                    op: UnaryOp::BitNot,
                    inner: Box::new(self.parse_primary()?),
                })
            }
            TokenKind::Bang => {
                self.next()?;
                Ok(Expr::Prefix {
                    line,
                    op: UnaryOp::Not,
                    inner: Box::new(self.parse_primary()?),
                })
            }
            TokenKind::PlusPlus => {
                self.check_xcrement("++")?;
                self.next()?;
                Ok(Expr::Prefix {
                    line,
                    op: UnaryOp::Increment,
                    inner: Box::new(self.parse_primary()?),
                })
            }
            TokenKind::MinusMinus => {
                self.check_xcrement("--")?;
                self.next()?;
                Ok(Expr::Prefix {
                    line,
                    op: UnaryOp::Decrement,
                    inner: Box::new(self.parse_primary()?),
                })
            }
            TokenKind::New => {
                self.next()?;
                Ok(Expr::Prefix {
                    line,
                    op: UnaryOp::New,
                    inner: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Resource => self.parse_resource(),
            _ => self.parse_core_primary(),
        }
    }

    /// `resource<byte[]>(path)` is the only accepted `resource` form.
    fn parse_resource(&mut self) -> Result<Expr, CompileError> {
        let line = self.line();
        self.next()?;
        self.expect(&TokenKind::Lt, "'<'")?;
        match self.lexer.current() {
            TokenKind::Id(name) if name == "byte" => {
                self.next()?;
            }
            _ => return Err(self.err_structural("Expected 'resource<byte[]>'")),
        }
        self.expect(&TokenKind::LBracket, "'['")?;
        self.expect(&TokenKind::RBracket, "']'")?;
        self.expect(&TokenKind::Gt, "'>'")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let inner = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(Expr::Prefix {
            line,
            op: UnaryOp::Resource,
            inner: Box::new(inner),
        })
    }

    fn parse_core_primary(&mut self) -> Result<Expr, CompileError> {
        let line = self.line();
        let mut result = match self.lexer.current() {
            TokenKind::LiteralLong(value) => {
                let value = *value;
                self.next()?;
                Expr::LiteralLong { line, value }
            }
            TokenKind::LiteralDouble(value) => {
                let value = *value;
                self.next()?;
                Expr::LiteralDouble { line, value }
            }
            TokenKind::LiteralString(value) => {
                let value = value.clone();
                self.next()?;
                Expr::LiteralString { line, value }
            }
            TokenKind::True => {
                self.next()?;
                Expr::LiteralBool { line, value: true }
            }
            TokenKind::False => {
                self.next()?;
                Expr::LiteralBool { line, value: false }
            }
            TokenKind::Null => {
                self.next()?;
                Expr::LiteralNull { line }
            }
            TokenKind::InterpolatedString(_) => self.parse_interpolated()?,
            TokenKind::Id(name) => {
                let name = name.clone();
                self.next()?;
                let type_args = match GENERIC_CLASSES.get(name.as_str()) {
                    Some(&arity) if self.see(&TokenKind::Lt) => {
                        self.parse_type_args(&name, arity)?
                    }
                    _ => Vec::new(),
                };
                Expr::Symbol {
                    line,
                    qualifier: None,
                    name,
                    type_args,
                    symbol: None,
                }
            }
            TokenKind::LParen => {
                self.next()?;
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                inner
            }
            other => {
                return Err(
                    self.err_structural(format!("Expected an expression, found {}", other))
                )
            }
        };

        loop {
            match self.lexer.current() {
                TokenKind::Dot => {
                    self.next()?;
                    let name = self.expect_id("a member name")?;
                    result = Expr::Symbol {
                        line: result.line(),
                        qualifier: Some(Box::new(result)),
                        name,
                        type_args: Vec::new(),
                        symbol: None,
                    };
                }
                TokenKind::LParen => {
                    if !matches!(result, Expr::Symbol { .. }) {
                        return Err(self.err_contextual("Expected a method"));
                    }
                    self.next()?;
                    let mut args = Vec::new();
                    if !self.see(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.eat(&TokenKind::Comma)? {
                                break;
                            }
                        }
                    }
                    self.expect(&TokenKind::RParen, "')'")?;
                    result = Expr::Call {
                        line: result.line(),
                        method: Box::new(result),
                        args,
                    };
                }
                TokenKind::LBracket => {
                    self.next()?;
                    let index = if self.see(&TokenKind::RBracket) {
                        None
                    } else {
                        Some(Box::new(self.parse_expr()?))
                    };
                    self.expect(&TokenKind::RBracket, "']'")?;
                    result = Expr::Index {
                        line: result.line(),
                        container: Box::new(result),
                        index,
                    };
                }
                TokenKind::PlusPlus => {
                    self.check_xcrement("++")?;
                    self.next()?;
                    result = Expr::Postfix {
                        line: result.line(),
                        inner: Box::new(result),
                        op: PostfixOp::Increment,
                    };
                }
                TokenKind::MinusMinus => {
                    self.check_xcrement("--")?;
                    self.next()?;
                    result = Expr::Postfix {
                        line: result.line(),
                        inner: Box::new(result),
                        op: PostfixOp::Decrement,
                    };
                }
                TokenKind::Bang => {
                    self.next()?;
                    result = Expr::Postfix {
                        line: result.line(),
                        inner: Box::new(result),
                        op: PostfixOp::Bang,
                    };
                }
                TokenKind::Hash => {
                    self.next()?;
                    result = Expr::Postfix {
                        line: result.line(),
                        inner: Box::new(result),
                        op: PostfixOp::Hash,
                    };
                }
                _ => return Ok(result),
            }
        }
    }

    /// `<T>` / `<K, V>` after one of the known generic class names. The
    /// lexer runs in type-argument mode so that `>>` closes two nested
    /// lists.
    fn parse_type_args(&mut self, name: &str, arity: usize) -> Result<Vec<Expr>, CompileError> {
        let saved = self.lexer.set_parsing_type_arg(true);
        let result = self.parse_type_arg_list();
        self.lexer.set_parsing_type_arg(saved);
        let args = result?;
        if args.len() != arity {
            return Err(self.err_contextual(format!(
                "Expected {} type argument(s) for '{}', got {}",
                arity,
                name,
                args.len()
            )));
        }
        Ok(args)
    }

    fn parse_type_arg_list(&mut self) -> Result<Vec<Expr>, CompileError> {
        self.next()?; // past '<'
        let mut args = vec![self.parse_type()?];
        while self.eat(&TokenKind::Comma)? {
            args.push(self.parse_type()?);
        }
        self.expect(&TokenKind::Gt, "'>'")?;
        Ok(args)
    }

    /// A type expression: a primary, optionally followed by `..` forming a
    /// range type (`0 .. 99`).
    fn parse_type(&mut self) -> Result<Expr, CompileError> {
        let left = self.parse_primary()?;
        if !self.eat(&TokenKind::DotDot)? {
            return Ok(left);
        }
        let right = self.parse_primary()?;
        Ok(Expr::Binary {
            line: left.line(),
            op: BinaryOp::Range,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Interpolated string: the lexer has produced the first literal
    /// prefix; the parser parses each `{argument[,width][:format]}` and
    /// calls back into the lexer to continue the literal.
    fn parse_interpolated(&mut self) -> Result<Expr, CompileError> {
        let line = self.line();
        let mut parts = Vec::new();
        loop {
            match self.lexer.current().clone() {
                TokenKind::InterpolatedString(prefix) => {
                    self.next()?;
                    let arg = self.parse_expr()?;
                    let width = if self.eat(&TokenKind::Comma)? {
                        Some(self.parse_expr()?)
                    } else {
                        None
                    };
                    let (format, precision) = if self.see(&TokenKind::Colon) {
                        self.parse_format_spec()?
                    } else {
                        (None, None)
                    };
                    self.lexer.check(&TokenKind::RBrace, "'}'")?;
                    self.lexer.read_interpolated_string()?;
                    parts.push(InterpPart {
                        prefix,
                        arg,
                        width,
                        format,
                        precision,
                    });
                }
                TokenKind::LiteralString(suffix) => {
                    self.next()?;
                    return Ok(Expr::Interpolated { line, parts, suffix });
                }
                other => {
                    return Err(self
                        .err_structural(format!("Expected an interpolated string, found {}", other)))
                }
            }
        }
    }

    /// `:X`, `:D2`, ... - one format character from `DdEeFfGgXx` and an
    /// optional 1- or 2-digit precision.
    fn parse_format_spec(&mut self) -> Result<(Option<char>, Option<u8>), CompileError> {
        self.next()?; // past ':'
        let TokenKind::Id(spec) = self.lexer.current() else {
            return Err(self.err_lexical("Invalid format specifier"));
        };
        let spec = spec.clone();
        let mut chars = spec.chars();
        let format = match chars.next() {
            Some(c) if "DdEeFfGgXx".contains(c) => c,
            _ => return Err(self.err_lexical("Invalid format specifier")),
        };
        let rest = chars.as_str();
        let precision = if rest.is_empty() {
            None
        } else if rest.len() <= 2 && rest.bytes().all(|b| b.is_ascii_digit()) {
            rest.parse::<u8>().ok()
        } else {
            return Err(self.err_lexical("Invalid format precision"));
        };
        self.next()?; // past the specifier; the '}' follows
        Ok((Some(format), precision))
    }

    /// `{ field = expr, ... }` struct aggregate; items are `Assign`
    /// binaries.
    fn parse_object_literal(&mut self) -> Result<Expr, CompileError> {
        let line = self.line();
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut items = Vec::new();
        if !self.see(&TokenKind::RBrace) {
            loop {
                let field_line = self.line();
                let field = self.expect_id("a field name")?;
                self.expect(&TokenKind::Eq, "'='")?;
                let value = self.parse_expr()?;
                items.push(Expr::Binary {
                    line: field_line,
                    op: BinaryOp::Assign,
                    left: Box::new(Expr::Symbol {
                        line: field_line,
                        qualifier: None,
                        name: field,
                        type_args: Vec::new(),
                        symbol: None,
                    }),
                    right: Box::new(value),
                });
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Expr::Aggregate { line, items })
    }

    /// `{ e1, e2, ... }` array aggregate, used for const initializers.
    fn parse_array_aggregate(&mut self) -> Result<Expr, CompileError> {
        let line = self.line();
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut items = Vec::new();
        if !self.see(&TokenKind::RBrace) {
            loop {
                items.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
                if self.see(&TokenKind::RBrace) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Expr::Aggregate { line, items })
    }

    fn parse_initializer(&mut self) -> Result<Expr, CompileError> {
        if self.see(&TokenKind::LBrace) {
            self.parse_object_literal()
        } else {
            self.parse_expr()
        }
    }

    /// `Type name [= initializer]` with the type already parsed.
    fn parse_var_rest(&mut self, ty: Expr, doc: Option<String>) -> Result<Expr, CompileError> {
        let line = ty.line();
        let name = self.expect_id("a variable name")?;
        let value = if self.eat(&TokenKind::Eq)? {
            Some(self.parse_initializer()?)
        } else {
            None
        };
        Ok(Expr::Var(Box::new(VarDecl {
            line,
            doc,
            ty,
            name,
            value,
        })))
    }

    /// `[doc] Type name [= default]` - a method parameter.
    fn parse_param(&mut self) -> Result<VarDecl, CompileError> {
        let doc = self.parse_doc()?;
        let ty = self.parse_type()?;
        let line = ty.line();
        let name = self.expect_id("a parameter name")?;
        let value = if self.eat(&TokenKind::Eq)? {
            Some(self.parse_initializer()?)
        } else {
            None
        };
        Ok(VarDecl {
            line,
            doc,
            ty,
            name,
            value,
        })
    }

    /// A type-or-expression, a variable declaration (`allow_var` positions
    /// only), or an assignment. Assignments are right-associative.
    fn parse_assign(&mut self, allow_var: bool) -> Result<Expr, CompileError> {
        let mut left = self.parse_expr()?;
        // A trailing `..` makes the expression a range type (`0 .. 99 x;`)
        if self.eat(&TokenKind::DotDot)? {
            let right = self.parse_primary()?;
            left = Expr::Binary {
                line: left.line(),
                op: BinaryOp::Range,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        if allow_var && matches!(self.lexer.current(), TokenKind::Id(_)) {
            return self.parse_var_rest(left, None);
        }
        let Some(op) = assign_op(self.lexer.current()) else {
            return Ok(left);
        };
        self.next()?;
        let right = self.parse_assign(false)?;
        Ok(Expr::Binary {
            line: left.line(),
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_block(&mut self) -> Result<Stmt, CompileError> {
        let line = self.line();
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.see(&TokenKind::RBrace) {
            if self.see(&TokenKind::Eof) {
                return Err(self.err_structural("Expected '}'"));
            }
            statements.push(self.parse_statement()?);
        }
        self.next()?;
        Ok(Stmt::Block { line, statements })
    }

    /// Parse a loop body with a fresh frame on the loop stack, collecting
    /// whether any `break` targeted it.
    fn parse_loop_body(&mut self) -> Result<(LoopId, bool, Box<Stmt>), CompileError> {
        let id = self.new_loop_id();
        self.loop_stack.push(LoopFrame {
            id,
            is_loop: true,
            has_break: false,
        });
        let body = self.parse_statement();
        let has_break = self.loop_stack.pop().map(|f| f.has_break).unwrap_or(false);
        Ok((id, has_break, Box::new(body?)))
    }

    fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.line();
        match self.lexer.current() {
            TokenKind::LBrace => self.parse_block(),

            TokenKind::Assert => {
                self.next()?;
                let cond = self.parse_expr()?;
                let message = if self.eat(&TokenKind::Comma)? {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                self.expect(&TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Assert { line, cond, message })
            }

            TokenKind::Break => {
                let target = match self.loop_stack.last_mut() {
                    Some(frame) => {
                        frame.has_break = true;
                        frame.id
                    }
                    None => {
                        return Err(CompileError::contextual(
                            self.lexer.filename(),
                            line,
                            "'break' outside a loop or 'switch'",
                        ))
                    }
                };
                self.next()?;
                self.expect(&TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Break { line, target })
            }

            TokenKind::Continue => {
                let target = match self.loop_stack.iter().rev().find(|f| f.is_loop) {
                    Some(frame) => frame.id,
                    None => {
                        return Err(CompileError::contextual(
                            self.lexer.filename(),
                            line,
                            "'continue' outside a loop",
                        ))
                    }
                };
                self.next()?;
                self.expect(&TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Continue { line, target })
            }

            TokenKind::Const => {
                self.next()?;
                let decl = self.parse_const_decl(line, None, Visibility::Private)?;
                Ok(Stmt::Const(decl))
            }

            TokenKind::Do => {
                self.next()?;
                let (id, has_break, body) = self.parse_loop_body()?;
                self.expect(&TokenKind::While, "'while'")?;
                self.expect(&TokenKind::LParen, "'('")?;
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                self.expect(&TokenKind::Semicolon, "';'")?;
                Ok(Stmt::DoWhile {
                    line,
                    id,
                    has_break,
                    body,
                    cond,
                })
            }

            TokenKind::For => {
                self.next()?;
                self.expect(&TokenKind::LParen, "'('")?;
                let init = if self.see(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_assign(true)?)
                };
                self.expect(&TokenKind::Semicolon, "';'")?;
                let cond = if self.see(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&TokenKind::Semicolon, "';'")?;
                let advance = if self.see(&TokenKind::RParen) {
                    None
                } else {
                    Some(self.parse_assign(false)?)
                };
                self.expect(&TokenKind::RParen, "')'")?;
                let (id, has_break, body) = self.parse_loop_body()?;
                Ok(Stmt::For {
                    line,
                    id,
                    has_break,
                    init,
                    cond,
                    advance,
                    body,
                })
            }

            TokenKind::Foreach => {
                self.next()?;
                self.expect(&TokenKind::LParen, "'('")?;
                let (element, value_element) = if self.eat(&TokenKind::LParen)? {
                    let first = self.parse_foreach_var()?;
                    self.expect(&TokenKind::Comma, "','")?;
                    let second = self.parse_foreach_var()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    (first, Some(second))
                } else {
                    (self.parse_foreach_var()?, None)
                };
                self.expect(&TokenKind::In, "'in'")?;
                let collection = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                let (id, has_break, body) = self.parse_loop_body()?;
                Ok(Stmt::Foreach {
                    line,
                    id,
                    has_break,
                    element: Box::new(element),
                    value_element: value_element.map(Box::new),
                    collection,
                    body,
                })
            }

            TokenKind::If => {
                self.next()?;
                self.expect(&TokenKind::LParen, "'('")?;
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                let on_true = Box::new(self.parse_statement()?);
                let on_false = if self.eat(&TokenKind::Else)? {
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    line,
                    cond,
                    on_true,
                    on_false,
                })
            }

            TokenKind::Lock => {
                self.next()?;
                self.expect(&TokenKind::LParen, "'('")?;
                let lock = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                let body = Box::new(self.parse_statement()?);
                Ok(Stmt::Lock { line, lock, body })
            }

            TokenKind::Native => {
                let (line, content) = self.parse_native_content()?;
                Ok(Stmt::Native { line, content })
            }

            TokenKind::Return => {
                self.next()?;
                let value = if self.see(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Return { line, value })
            }

            TokenKind::Switch => {
                self.next()?;
                self.expect(&TokenKind::LParen, "'('")?;
                let value = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                self.expect(&TokenKind::LBrace, "'{'")?;
                let id = self.new_loop_id();
                self.loop_stack.push(LoopFrame {
                    id,
                    is_loop: false,
                    has_break: false,
                });
                let result = self.parse_switch_body();
                let has_break = self.loop_stack.pop().map(|f| f.has_break).unwrap_or(false);
                let (cases, default_body) = result?;
                Ok(Stmt::Switch {
                    line,
                    id,
                    has_break,
                    value,
                    cases,
                    default_body,
                })
            }

            TokenKind::Throw => {
                self.next()?;
                let message = self.parse_expr()?;
                self.expect(&TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Throw { line, message })
            }

            TokenKind::While => {
                self.next()?;
                self.expect(&TokenKind::LParen, "'('")?;
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                let (id, has_break, body) = self.parse_loop_body()?;
                Ok(Stmt::While {
                    line,
                    id,
                    has_break,
                    cond,
                    body,
                })
            }

            _ => {
                let expr = self.parse_assign(true)?;
                self.expect(&TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_foreach_var(&mut self) -> Result<VarDecl, CompileError> {
        let ty = self.parse_type()?;
        let line = ty.line();
        let name = self.expect_id("an iterator variable name")?;
        Ok(VarDecl {
            line,
            doc: None,
            ty,
            name,
            value: None,
        })
    }

    fn parse_switch_body(
        &mut self,
    ) -> Result<(Vec<SwitchCase>, Option<Vec<Stmt>>), CompileError> {
        let mut cases = Vec::new();
        while self.see(&TokenKind::Case) {
            let mut values = Vec::new();
            loop {
                self.next()?; // past 'case'
                values.push(self.parse_expr()?);
                self.expect(&TokenKind::Colon, "':'")?;
                if !self.see(&TokenKind::Case) {
                    break;
                }
            }
            if self.see(&TokenKind::Default) {
                return Err(self.err_contextual("Please remove 'case' before 'default'"));
            }
            let mut body = Vec::new();
            loop {
                body.push(self.parse_statement()?);
                if self.see(&TokenKind::Case)
                    || self.see(&TokenKind::Default)
                    || self.see(&TokenKind::RBrace)
                {
                    break;
                }
            }
            cases.push(SwitchCase { values, body });
        }
        if cases.is_empty() {
            return Err(
                self.err_structural(format!("Expected 'case', found {}", self.lexer.current()))
            );
        }
        let default_body = if self.eat(&TokenKind::Default)? {
            self.expect(&TokenKind::Colon, "':'")?;
            let mut body = Vec::new();
            loop {
                body.push(self.parse_statement()?);
                if self.see(&TokenKind::RBrace) {
                    break;
                }
            }
            Some(body)
        } else {
            None
        };
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok((cases, default_body))
    }

    // ========================================================================
    // Native blocks
    // ========================================================================

    /// `native { ... }`: the block is captured verbatim. Tokens are still
    /// read normally (so braces inside string literals do not count), but
    /// every consumed character goes to the capture buffer, which becomes
    /// the content once the braces balance.
    fn parse_native_content(&mut self) -> Result<(usize, String), CompileError> {
        let line = self.line();
        self.next()?; // past 'native'
        self.lexer.check(&TokenKind::LBrace, "'{'")?;
        self.lexer.attach_capture();
        let result = self.parse_native_tokens();
        let mut captured = self.lexer.detach_capture();
        result?;
        captured.pop(); // the trailing '}'
        self.next()?; // past '}', no longer captured
        Ok((line, captured))
    }

    fn parse_native_tokens(&mut self) -> Result<(), CompileError> {
        self.next()?; // past '{'
        let mut nesting = 1;
        loop {
            match self.lexer.current() {
                TokenKind::Eof => return Err(self.err_structural("Native block not terminated")),
                TokenKind::LBrace => nesting += 1,
                TokenKind::RBrace => {
                    nesting -= 1;
                    if nesting == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.next()?;
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// `static`, `abstract`, `virtual`, `override`, or `sealed` before a
    /// member or class; anything else is Normal.
    fn parse_call_kind(&mut self) -> Result<CallKind, CompileError> {
        let kind = match self.lexer.current() {
            TokenKind::Static => CallKind::Static,
            TokenKind::Abstract => CallKind::Abstract,
            TokenKind::Virtual => CallKind::Virtual,
            TokenKind::Override => CallKind::Override,
            TokenKind::Sealed => CallKind::Sealed,
            _ => return Ok(CallKind::Normal),
        };
        self.next()?;
        Ok(kind)
    }

    fn parse_visibility(&mut self) -> Result<Visibility, CompileError> {
        let visibility = match self.lexer.current() {
            TokenKind::Internal => Visibility::Internal,
            TokenKind::Protected => Visibility::Protected,
            TokenKind::Public => Visibility::Public,
            _ => return Ok(Visibility::Private),
        };
        self.next()?;
        Ok(visibility)
    }

    /// `const Type Name = value;` with the `const` keyword already
    /// consumed. The value may be an array aggregate.
    fn parse_const_decl(
        &mut self,
        line: usize,
        doc: Option<String>,
        visibility: Visibility,
    ) -> Result<ConstDecl, CompileError> {
        let ty = self.parse_type()?;
        let name = self.expect_id("a constant name")?;
        self.expect(&TokenKind::Eq, "'='")?;
        let value = if self.see(&TokenKind::LBrace) {
            self.parse_array_aggregate()?
        } else {
            self.parse_expr()?
        };
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(ConstDecl {
            line,
            doc,
            visibility,
            ty,
            name,
            value,
        })
    }

    /// Legal member call kinds per class call kind.
    fn check_member_kind(&self, klass: &Class, call_kind: CallKind) -> Result<(), CompileError> {
        match klass.call_kind {
            CallKind::Static if call_kind != CallKind::Static => {
                Err(self.err_contextual("Members of a static class must be static"))
            }
            CallKind::Abstract => Ok(()),
            _ if call_kind == CallKind::Abstract => {
                Err(self.err_contextual("Abstract methods are only allowed in an abstract class"))
            }
            CallKind::Sealed if call_kind == CallKind::Virtual => {
                Err(self.err_contextual("Virtual methods are not allowed in a sealed class"))
            }
            _ => Ok(()),
        }
    }

    fn parse_member(&mut self, klass: &mut Class) -> Result<(), CompileError> {
        let doc = self.parse_doc()?;
        let line = self.line();
        let visibility = self.parse_visibility()?;

        if self.eat(&TokenKind::Const)? {
            let konst = self.parse_const_decl(line, doc, visibility)?;
            klass.consts.push(konst);
            return Ok(());
        }

        let call_kind = self.parse_call_kind()?;
        self.check_member_kind(klass, call_kind)?;

        // Private members cannot take part in dynamic dispatch; there is no
        // `private` keyword, so the default is promoted instead.
        let visibility = if visibility == Visibility::Private
            && !matches!(call_kind, CallKind::Static | CallKind::Normal)
        {
            Visibility::Protected
        } else {
            visibility
        };

        let return_type = if self.eat(&TokenKind::Void)? {
            None
        } else {
            Some(self.parse_type()?)
        };

        // `Name() {` where Name is a no-argument call is the constructor.
        if self.see(&TokenKind::LBrace) && matches!(&return_type, Some(Expr::Call { .. })) {
            return self.parse_constructor(klass, line, doc, visibility, call_kind, return_type);
        }

        let name = self.expect_id("a member name")?;

        if self.see(&TokenKind::LParen) || self.see(&TokenKind::Bang) {
            let method = self.parse_method(line, doc, visibility, call_kind, return_type, name)?;
            klass.methods.push(method);
            return Ok(());
        }

        // Field
        if call_kind != CallKind::Normal {
            return Err(self.err_contextual(format!("Fields cannot be {}", call_kind.keyword())));
        }
        let Some(ty) = return_type else {
            return Err(self.err_contextual("Fields cannot be of type 'void'"));
        };
        if visibility == Visibility::Public {
            return Err(self.err_contextual("Fields cannot be public"));
        }
        let value = if self.eat(&TokenKind::Eq)? {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon, "';'")?;
        klass.fields.push(Field {
            line,
            doc,
            visibility,
            ty,
            name,
            value,
        });
        Ok(())
    }

    fn parse_constructor(
        &mut self,
        klass: &mut Class,
        line: usize,
        doc: Option<String>,
        visibility: Visibility,
        call_kind: CallKind,
        return_type: Option<Expr>,
    ) -> Result<(), CompileError> {
        let Some(Expr::Call { method, args, .. }) = return_type else {
            return Err(self.err_structural("Expected a member name"));
        };
        let name = match *method {
            Expr::Symbol {
                name,
                qualifier: None,
                ..
            } => name,
            _ => return Err(self.err_contextual("Constructor name does not match the class name")),
        };
        if name != klass.name {
            return Err(self.err_contextual("Constructor name does not match the class name"));
        }
        if !args.is_empty() {
            return Err(self.err_contextual("Constructor cannot have parameters"));
        }
        if call_kind != CallKind::Normal {
            return Err(
                self.err_contextual(format!("Constructor cannot be {}", call_kind.keyword()))
            );
        }
        if klass.constructor.is_some() {
            return Err(self.err_contextual("Duplicate constructor"));
        }
        // TODO: revisit the private-to-internal promotion once the resolver
        // understands constructor visibility on its own.
        let visibility = if visibility == Visibility::Private {
            Visibility::Internal
        } else {
            visibility
        };
        let body = self.parse_block()?;
        klass.constructor = Some(Constructor {
            line,
            doc,
            visibility,
            body,
        });
        Ok(())
    }

    fn parse_method(
        &mut self,
        line: usize,
        doc: Option<String>,
        visibility: Visibility,
        call_kind: CallKind,
        return_type: Option<Expr>,
        name: Ident,
    ) -> Result<Method, CompileError> {
        let is_mutator = self.eat(&TokenKind::Bang)?;
        self.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.see(&TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        let throws = self.eat(&TokenKind::Throws)?;

        let body = if call_kind == CallKind::Abstract {
            self.expect(&TokenKind::Semicolon, "';'")?;
            None
        } else if self.see(&TokenKind::FatArrow) {
            let return_line = self.line();
            self.next()?;
            let value = self.parse_expr()?;
            self.expect(&TokenKind::Semicolon, "';'")?;
            Some(Stmt::Return {
                line: return_line,
                value: Some(value),
            })
        } else {
            Some(self.parse_block()?)
        };

        Ok(Method {
            line,
            doc,
            visibility,
            call_kind,
            return_type,
            name,
            is_mutator,
            params,
            throws,
            body,
            owner: None,
        })
    }

    fn parse_class(
        &mut self,
        line: usize,
        doc: Option<String>,
        visibility: Visibility,
        call_kind: CallKind,
    ) -> Result<(), CompileError> {
        self.expect(&TokenKind::Class, "'class'")?;
        let name = self.expect_id("a class name")?;
        let base = if self.eat(&TokenKind::Colon)? {
            Some(self.expect_id("a base class name")?)
        } else {
            None
        };
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut klass = Class {
            line,
            doc,
            visibility,
            call_kind,
            name,
            base,
            constructor: None,
            consts: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            id: None,
        };
        while !self.eat(&TokenKind::RBrace)? {
            if self.see(&TokenKind::Eof) {
                return Err(self.err_structural("Expected '}'"));
            }
            self.parse_member(&mut klass)?;
        }
        tracing::debug!(class = %klass.name, "parsed class");
        self.program.add(TypeDecl::Class(klass));
        Ok(())
    }

    fn parse_enum(
        &mut self,
        line: usize,
        doc: Option<String>,
        visibility: Visibility,
    ) -> Result<(), CompileError> {
        self.expect(&TokenKind::Enum, "'enum'")?;
        let is_flags = self.eat(&TokenKind::Star)?;
        let name = self.expect_id("an enum name")?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut constants = Vec::new();
        loop {
            let constant_doc = self.parse_doc()?;
            let constant_line = self.line();
            let constant_name = self.expect_id("an enum constant name")?;
            let value = if self.eat(&TokenKind::Eq)? {
                Some(self.parse_expr()?)
            } else if is_flags {
                return Err(
                    self.err_contextual("Flags enum constants must have explicit values")
                );
            } else {
                None
            };
            constants.push(EnumConstant {
                line: constant_line,
                doc: constant_doc,
                name: constant_name,
                value,
            });
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
            if self.see(&TokenKind::RBrace) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        tracing::debug!(name = %name, "parsed enum");
        self.program.add(TypeDecl::Enum(EnumDecl {
            line,
            doc,
            visibility,
            name,
            is_flags,
            constants,
            id: None,
        }));
        Ok(())
    }

    /// One top-level item: a class (optionally `public` and
    /// `static`/`abstract`/`sealed`), an enum, or a bare `native` block.
    fn parse_top_level(&mut self) -> Result<(), CompileError> {
        let doc = self.parse_doc()?;
        let line = self.line();

        if self.see(&TokenKind::Native) {
            let (_, content) = self.parse_native_content()?;
            self.program.top_level_natives.push(content);
            return Ok(());
        }

        let visibility = if self.eat(&TokenKind::Public)? {
            Visibility::Public
        } else {
            Visibility::Internal
        };
        match self.lexer.current() {
            TokenKind::Class => self.parse_class(line, doc, visibility, CallKind::Normal),
            TokenKind::Static | TokenKind::Abstract | TokenKind::Sealed => {
                let call_kind = self.parse_call_kind()?;
                self.parse_class(line, doc, visibility, call_kind)
            }
            TokenKind::Enum => self.parse_enum(line, doc, visibility),
            _ => Err(self.err_structural("Expected class or enum")),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an assignment token to its operator.
fn assign_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Eq => Some(BinaryOp::Assign),
        TokenKind::PlusEq => Some(BinaryOp::AddAssign),
        TokenKind::MinusEq => Some(BinaryOp::SubAssign),
        TokenKind::StarEq => Some(BinaryOp::MulAssign),
        TokenKind::SlashEq => Some(BinaryOp::DivAssign),
        TokenKind::PercentEq => Some(BinaryOp::ModAssign),
        TokenKind::AmpEq => Some(BinaryOp::AndAssign),
        TokenKind::PipeEq => Some(BinaryOp::OrAssign),
        TokenKind::CaretEq => Some(BinaryOp::XorAssign),
        TokenKind::ShlEq => Some(BinaryOp::ShlAssign),
        TokenKind::ShrEq => Some(BinaryOp::ShrAssign),
        _ => None,
    }
}

/// Find a `++`/`--` anywhere in an already-parsed operand.
fn find_xcrement(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Prefix {
            op: UnaryOp::Increment,
            ..
        }
        | Expr::Postfix {
            op: PostfixOp::Increment,
            ..
        } => Some("++"),
        Expr::Prefix {
            op: UnaryOp::Decrement,
            ..
        }
        | Expr::Postfix {
            op: PostfixOp::Decrement,
            ..
        } => Some("--"),
        Expr::Prefix { inner, .. } | Expr::Postfix { inner, .. } => find_xcrement(inner),
        Expr::Binary { left, right, .. } => {
            find_xcrement(left).or_else(|| find_xcrement(right))
        }
        Expr::Index {
            container, index, ..
        } => find_xcrement(container).or_else(|| index.as_deref().and_then(find_xcrement)),
        Expr::Call { method, args, .. } => {
            find_xcrement(method).or_else(|| args.iter().find_map(find_xcrement))
        }
        Expr::Select {
            cond,
            on_true,
            on_false,
            ..
        } => find_xcrement(cond)
            .or_else(|| find_xcrement(on_true))
            .or_else(|| find_xcrement(on_false)),
        Expr::Aggregate { items, .. } => items.iter().find_map(find_xcrement),
        Expr::Interpolated { parts, .. } => parts.iter().find_map(|part| {
            find_xcrement(&part.arg).or_else(|| part.width.as_ref().and_then(find_xcrement))
        }),
        Expr::Symbol { qualifier, .. } => qualifier.as_deref().and_then(find_xcrement),
        Expr::Var(var) => var.value.as_ref().and_then(find_xcrement),
        Expr::LiteralLong { .. }
        | Expr::LiteralDouble { .. }
        | Expr::LiteralString { .. }
        | Expr::LiteralBool { .. }
        | Expr::LiteralNull { .. } => None,
    }
}

/// Parse a single source file into a fresh program.
#[tracing::instrument(skip_all, fields(filename = %filename))]
pub fn parse(filename: &str, source: &str) -> Result<Program, CompileError> {
    let mut parser = Parser::new();
    parser.parse(filename, source)?;
    Ok(parser.into_program())
}

// ============================================================================
// TESTS
// ============================================================================
