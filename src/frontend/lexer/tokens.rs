//! Token types for the Quipu lexer

use phf::phf_map;
use std::fmt;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Token types for Quipu.
///
/// Literal tokens carry their decoded payload: a character literal becomes a
/// `LiteralLong`, string escapes are already resolved. `InterpolatedString`
/// is the literal prefix of an interpolated-string fragment with an argument
/// still to come; the final suffix arrives as a plain `LiteralString`.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Identifiers and Literals ==========
    Id(String),
    LiteralLong(i64),
    LiteralDouble(f64),
    LiteralString(String),
    InterpolatedString(String),
    DocComment(String),

    // ========== Keywords ==========
    Abstract,
    Assert,
    Break,
    Case,
    Class,
    Const,
    Continue,
    Default,
    Do,
    Else,
    Enum,
    False,
    For,
    Foreach,
    If,
    In,
    Internal,
    Is,
    Lock,
    Native,
    New,
    Null,
    Override,
    Protected,
    Public,
    Resource,
    Return,
    Sealed,
    Static,
    Switch,
    Throw,
    Throws,
    True,
    Virtual,
    Void,
    While,

    // ========== Operators ==========
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Amp,        // &
    Pipe,       // |
    Caret,      // ^
    Tilde,      // ~
    Bang,       // !
    AmpAmp,     // &&
    PipePipe,   // ||
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    EqEq,       // ==
    NotEq,      // !=
    Shl,        // <<
    Shr,        // >>
    PlusPlus,   // ++
    MinusMinus, // --
    Eq,         // =
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    SlashEq,    // /=
    PercentEq,  // %=
    AmpEq,      // &=
    PipeEq,     // |=
    CaretEq,    // ^=
    ShlEq,      // <<=
    ShrEq,      // >>=

    // ========== Punctuation ==========
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }
    Comma,    // ,
    Dot,      // .
    Semicolon, // ;
    Colon,    // :
    Question, // ?
    Hash,     // #
    DotDot,   // ..
    FatArrow, // =>

    // ========== Special ==========
    Eof,
}

/// Keyword lookup table using a perfect hash map for O(1) lookup.
///
/// Maps source text to `TokenKind` variants; the lexer consults this after
/// scanning an identifier, and anything absent here is a plain `Id`.
pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "abstract" => TokenKind::Abstract,
    "assert" => TokenKind::Assert,
    "break" => TokenKind::Break,
    "case" => TokenKind::Case,
    "class" => TokenKind::Class,
    "const" => TokenKind::Const,
    "continue" => TokenKind::Continue,
    "default" => TokenKind::Default,
    "do" => TokenKind::Do,
    "else" => TokenKind::Else,
    "enum" => TokenKind::Enum,
    "false" => TokenKind::False,
    "for" => TokenKind::For,
    "foreach" => TokenKind::Foreach,
    "if" => TokenKind::If,
    "in" => TokenKind::In,
    "internal" => TokenKind::Internal,
    "is" => TokenKind::Is,
    "lock" => TokenKind::Lock,
    "native" => TokenKind::Native,
    "new" => TokenKind::New,
    "null" => TokenKind::Null,
    "override" => TokenKind::Override,
    "protected" => TokenKind::Protected,
    "public" => TokenKind::Public,
    "resource" => TokenKind::Resource,
    "return" => TokenKind::Return,
    "sealed" => TokenKind::Sealed,
    "static" => TokenKind::Static,
    "switch" => TokenKind::Switch,
    "throw" => TokenKind::Throw,
    "throws" => TokenKind::Throws,
    "true" => TokenKind::True,
    "virtual" => TokenKind::Virtual,
    "void" => TokenKind::Void,
    "while" => TokenKind::While,
};

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Id(name) => return write!(f, "identifier '{}'", name),
            TokenKind::LiteralLong(_) => "integer literal",
            TokenKind::LiteralDouble(_) => "floating-point literal",
            TokenKind::LiteralString(_) => "string literal",
            TokenKind::InterpolatedString(_) => "interpolated string",
            TokenKind::DocComment(_) => "documentation comment",
            TokenKind::Abstract => "'abstract'",
            TokenKind::Assert => "'assert'",
            TokenKind::Break => "'break'",
            TokenKind::Case => "'case'",
            TokenKind::Class => "'class'",
            TokenKind::Const => "'const'",
            TokenKind::Continue => "'continue'",
            TokenKind::Default => "'default'",
            TokenKind::Do => "'do'",
            TokenKind::Else => "'else'",
            TokenKind::Enum => "'enum'",
            TokenKind::False => "'false'",
            TokenKind::For => "'for'",
            TokenKind::Foreach => "'foreach'",
            TokenKind::If => "'if'",
            TokenKind::In => "'in'",
            TokenKind::Internal => "'internal'",
            TokenKind::Is => "'is'",
            TokenKind::Lock => "'lock'",
            TokenKind::Native => "'native'",
            TokenKind::New => "'new'",
            TokenKind::Null => "'null'",
            TokenKind::Override => "'override'",
            TokenKind::Protected => "'protected'",
            TokenKind::Public => "'public'",
            TokenKind::Resource => "'resource'",
            TokenKind::Return => "'return'",
            TokenKind::Sealed => "'sealed'",
            TokenKind::Static => "'static'",
            TokenKind::Switch => "'switch'",
            TokenKind::Throw => "'throw'",
            TokenKind::Throws => "'throws'",
            TokenKind::True => "'true'",
            TokenKind::Virtual => "'virtual'",
            TokenKind::Void => "'void'",
            TokenKind::While => "'while'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::Bang => "'!'",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Lt => "'<'",
            TokenKind::LtEq => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::GtEq => "'>='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Shl => "'<<'",
            TokenKind::Shr => "'>>'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::ShlEq => "'<<='",
            TokenKind::ShrEq => "'>>='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Question => "'?'",
            TokenKind::Hash => "'#'",
            TokenKind::DotDot => "'..'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}
