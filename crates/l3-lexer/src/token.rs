//! Token types for the L3 lexer.

use l3_types::unparse::format_number;
use l3_types::Span;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in L3's s-expression syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `'`, shorthand for `(quote ...)`
    Quote,
    /// `42`, `-3.5`, `1e3`
    Number(f64),
    /// `"text"`, escapes already resolved
    Str(String),
    /// `#t`, `#f`, `#true`, `#false`
    Bool(bool),
    /// Any other atom: `x`, `+`, `string=?`, `make-point`
    Symbol(String),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Quote => write!(f, "'"),
            TokenKind::Number(n) => write!(f, "{}", format_number(*n)),
            TokenKind::Str(s) => write!(f, "{s:?}"),
            TokenKind::Bool(true) => write!(f, "#t"),
            TokenKind::Bool(false) => write!(f, "#f"),
            TokenKind::Symbol(s) => write!(f, "{s}"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
