//! Abstract Syntax Tree definitions for Quipu
//!
//! Closed sum types for expressions, statements, and type declarations,
//! plus the `Program` container that accumulates the parsed compilation
//! unit. Every node records the 1-based line of its first token. The tree
//! is built bottom-up by the parser and is immutable afterwards, except for
//! the resolver-filled handles (`symbol`, `owner`).

use phf::phf_map;
use serde::Serialize;

/// Identifier in Quipu source.
pub type Ident = String;

// ============================================================================
// Opaque handles
// ============================================================================

/// Index of a top-level type in its owning [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub usize);

/// Parser-issued identity of a loop or switch, used to tie `break` and
/// `continue` to their enclosing statement without cyclic ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LoopId(pub u32);

/// Handle to a resolved symbol. The parser always leaves this empty; the
/// resolver fills it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SymbolId(pub usize);

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg,       // -
    BitNot,    // ~
    Not,       // !
    Increment, // ++
    Decrement, // --
    New,
    Resource,
}

/// Postfix operators. `Bang` marks a mutating use, `Hash` a shared
/// (reference-counted) one; both are resolved downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PostfixOp {
    Increment, // ++
    Decrement, // --
    Bang,      // !
    Hash,      // #
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    And, // &&
    Or,  // ||
    Is,
    Range, // ..
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

// ============================================================================
// Expressions
// ============================================================================

/// One `{argument}` of an interpolated string, together with the literal
/// text preceding it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpPart {
    pub prefix: String,
    pub arg: Expr,
    pub width: Option<Expr>,
    /// Format character, one of `DdEeFfGgXx`.
    pub format: Option<char>,
    /// Precision 0..=99; only meaningful with a format character.
    pub precision: Option<u8>,
}

/// A variable declaration: local, `for` initializer, `foreach` iterator, or
/// method parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub line: usize,
    pub doc: Option<String>,
    pub ty: Expr,
    pub name: Ident,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    LiteralLong {
        line: usize,
        value: i64,
    },
    LiteralDouble {
        line: usize,
        value: f64,
    },
    LiteralString {
        line: usize,
        value: String,
    },
    LiteralBool {
        line: usize,
        value: bool,
    },
    LiteralNull {
        line: usize,
    },
    /// `$"..."` with at least one argument. `parts` holds each literal
    /// prefix with its argument; `suffix` is the trailing literal text.
    Interpolated {
        line: usize,
        parts: Vec<InterpPart>,
        suffix: String,
    },
    /// A name, possibly qualified (`a.b`), possibly with generic type
    /// arguments (`List<int>`; empty for plain references).
    Symbol {
        line: usize,
        qualifier: Option<Box<Expr>>,
        name: Ident,
        type_args: Vec<Expr>,
        symbol: Option<SymbolId>,
    },
    Prefix {
        line: usize,
        op: UnaryOp,
        inner: Box<Expr>,
    },
    Postfix {
        line: usize,
        inner: Box<Expr>,
        op: PostfixOp,
    },
    Binary {
        line: usize,
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `container[index]`; an absent index (`int[]`) denotes an array type.
    Index {
        line: usize,
        container: Box<Expr>,
        index: Option<Box<Expr>>,
    },
    /// A call; `method` is always a `Symbol`.
    Call {
        line: usize,
        method: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `cond ? on_true : on_false`
    Select {
        line: usize,
        cond: Box<Expr>,
        on_true: Box<Expr>,
        on_false: Box<Expr>,
    },
    /// `{ e1, e2, ... }` array aggregate, or `{ field = e, ... }` struct
    /// aggregate whose items are `Assign` binaries.
    Aggregate {
        line: usize,
        items: Vec<Expr>,
    },
    Var(Box<VarDecl>),
}

impl Expr {
    /// Line of the node's first token.
    pub fn line(&self) -> usize {
        match self {
            Expr::LiteralLong { line, .. }
            | Expr::LiteralDouble { line, .. }
            | Expr::LiteralString { line, .. }
            | Expr::LiteralBool { line, .. }
            | Expr::LiteralNull { line }
            | Expr::Interpolated { line, .. }
            | Expr::Symbol { line, .. }
            | Expr::Prefix { line, .. }
            | Expr::Postfix { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Index { line, .. }
            | Expr::Call { line, .. }
            | Expr::Select { line, .. }
            | Expr::Aggregate { line, .. } => *line,
            Expr::Var(var) => var.line,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// One `case v1: [case v2:] ...` group of a `switch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Block {
        line: usize,
        statements: Vec<Stmt>,
    },
    Assert {
        line: usize,
        cond: Expr,
        message: Option<Expr>,
    },
    /// `target` is the innermost enclosing loop or switch.
    Break {
        line: usize,
        target: LoopId,
    },
    /// `target` is the innermost enclosing loop.
    Continue {
        line: usize,
        target: LoopId,
    },
    Const(ConstDecl),
    DoWhile {
        line: usize,
        id: LoopId,
        has_break: bool,
        body: Box<Stmt>,
        cond: Expr,
    },
    Expr(Expr),
    For {
        line: usize,
        id: LoopId,
        has_break: bool,
        init: Option<Expr>,
        cond: Option<Expr>,
        advance: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `value_element` is present for the two-iterator (dictionary) form.
    Foreach {
        line: usize,
        id: LoopId,
        has_break: bool,
        element: Box<VarDecl>,
        value_element: Option<Box<VarDecl>>,
        collection: Expr,
        body: Box<Stmt>,
    },
    If {
        line: usize,
        cond: Expr,
        on_true: Box<Stmt>,
        on_false: Option<Box<Stmt>>,
    },
    Lock {
        line: usize,
        lock: Expr,
        body: Box<Stmt>,
    },
    /// Verbatim target-language text, copied through by the generators.
    Native {
        line: usize,
        content: String,
    },
    Return {
        line: usize,
        value: Option<Expr>,
    },
    Switch {
        line: usize,
        id: LoopId,
        has_break: bool,
        value: Expr,
        cases: Vec<SwitchCase>,
        default_body: Option<Vec<Stmt>>,
    },
    Throw {
        line: usize,
        message: Expr,
    },
    While {
        line: usize,
        id: LoopId,
        has_break: bool,
        cond: Expr,
        body: Box<Stmt>,
    },
}

impl Stmt {
    /// Line of the node's first token.
    pub fn line(&self) -> usize {
        match self {
            Stmt::Block { line, .. }
            | Stmt::Assert { line, .. }
            | Stmt::Break { line, .. }
            | Stmt::Continue { line, .. }
            | Stmt::DoWhile { line, .. }
            | Stmt::For { line, .. }
            | Stmt::Foreach { line, .. }
            | Stmt::If { line, .. }
            | Stmt::Lock { line, .. }
            | Stmt::Native { line, .. }
            | Stmt::Return { line, .. }
            | Stmt::Switch { line, .. }
            | Stmt::Throw { line, .. }
            | Stmt::While { line, .. } => *line,
            Stmt::Const(decl) => decl.line,
            Stmt::Expr(expr) => expr.line(),
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Visibility {
    #[default]
    Private,
    Internal,
    Protected,
    Public,
}

/// How a class or method participates in dispatch and inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CallKind {
    #[default]
    Normal,
    Static,
    Abstract,
    Virtual,
    Override,
    Sealed,
}

impl CallKind {
    /// The source keyword, for error messages.
    pub fn keyword(self) -> &'static str {
        match self {
            CallKind::Normal => "normal",
            CallKind::Static => "static",
            CallKind::Abstract => "abstract",
            CallKind::Virtual => "virtual",
            CallKind::Override => "override",
            CallKind::Sealed => "sealed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstDecl {
    pub line: usize,
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub ty: Expr,
    pub name: Ident,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub line: usize,
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub ty: Expr,
    pub name: Ident,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub line: usize,
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub call_kind: CallKind,
    /// `None` is `void`.
    pub return_type: Option<Expr>,
    pub name: Ident,
    /// `name!(...)` declares a mutator.
    pub is_mutator: bool,
    pub params: Vec<VarDecl>,
    pub throws: bool,
    /// `None` for abstract methods; a single `Return` for `=>` bodies.
    pub body: Option<Stmt>,
    /// The owning class, stamped when the class is added to the program.
    pub owner: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constructor {
    pub line: usize,
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    pub line: usize,
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub call_kind: CallKind,
    pub name: Ident,
    pub base: Option<Ident>,
    pub constructor: Option<Constructor>,
    pub consts: Vec<ConstDecl>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    /// Position in the owning program, stamped by [`Program::add`].
    pub id: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumConstant {
    pub line: usize,
    pub doc: Option<String>,
    pub name: Ident,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub line: usize,
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub name: Ident,
    /// `enum*`: a flags enum whose constants all carry explicit values.
    pub is_flags: bool,
    pub constants: Vec<EnumConstant>,
    pub id: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeDecl {
    Class(Class),
    Enum(EnumDecl),
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Class(class) => &class.name,
            TypeDecl::Enum(decl) => &decl.name,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            TypeDecl::Class(class) => class.line,
            TypeDecl::Enum(decl) => decl.line,
        }
    }
}

// ============================================================================
// Program
// ============================================================================

/// Built-in generic collection classes and their arity. These are the only
/// names after which `<` opens a type-argument list.
pub static GENERIC_CLASSES: phf::Map<&'static str, usize> = phf_map! {
    "List" => 1,
    "Stack" => 1,
    "HashSet" => 1,
    "Dictionary" => 2,
    "SortedDictionary" => 2,
};

/// The accumulating root of the parse: top-level types in declaration order
/// plus verbatim top-level `native` snippets. One program may collect the
/// declarations of several source files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub types: Vec<TypeDecl>,
    pub top_level_natives: Vec<String>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parsed type, stamping its id and each method's owner.
    pub fn add(&mut self, mut decl: TypeDecl) -> TypeId {
        let id = TypeId(self.types.len());
        match &mut decl {
            TypeDecl::Class(class) => {
                class.id = Some(id);
                for method in &mut class.methods {
                    method.owner = Some(id);
                }
            }
            TypeDecl::Enum(e) => e.id = Some(id),
        }
        self.types.push(decl);
        id
    }

    /// Locate a top-level type by simple name.
    pub fn try_lookup(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| decl.name() == name)
    }
}
