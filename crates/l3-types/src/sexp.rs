//! Concrete syntax: the s-expressions produced by the reader.

use crate::stack::ensure_sufficient_stack;
use crate::unparse::{format_number, write_string_literal};
use crate::Span;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Sexp {
    pub kind: SexpKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SexpKind {
    Number(f64),
    Bool(bool),
    Str(String),
    Symbol(String),
    List(Vec<Sexp>),
}

impl Sexp {
    pub fn new(kind: SexpKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            SexpKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexp]> {
        match &self.kind {
            SexpKind::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Drop for Sexp {
    fn drop(&mut self) {
        if let SexpKind::List(items) = &mut self.kind {
            let items = std::mem::take(items);
            ensure_sufficient_stack(move || drop(items));
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SexpKind::Number(n) => f.write_str(&format_number(*n)),
            SexpKind::Bool(true) => f.write_str("#t"),
            SexpKind::Bool(false) => f.write_str("#f"),
            SexpKind::Str(s) => write_string_literal(f, s),
            SexpKind::Symbol(s) => f.write_str(s),
            SexpKind::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}
