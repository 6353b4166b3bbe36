//! AST node types for L3.
//!
//! Nodes are immutable once the parser has built them. Procedure and class
//! nodes sit behind [`Rc`] so closures and classes can share them with the
//! program tree instead of copying bodies on every evaluation.

use crate::stack::ensure_sufficient_stack;
use crate::Span;
use std::mem;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// `(L3 exp ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub exps: Vec<Exp>,
    pub span: Span,
}

/// A sequence element: either a definition or an ordinary expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Exp {
    Define(DefineExp),
    Expr(CExp),
}

/// `(define var val)`
#[derive(Debug, Clone, PartialEq)]
pub struct DefineExp {
    pub var: String,
    pub val: CExp,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// Every expression that produces a value.
#[derive(Debug, Clone, PartialEq)]
pub enum CExp {
    Num(f64),
    Bool(bool),
    Str(String),
    Prim(PrimOp),
    VarRef(String),
    /// `(quote datum)` / `'datum`
    Lit(Datum),
    If(Box<IfExp>),
    Proc(Rc<ProcExp>),
    Let(Box<LetExp>),
    App(Box<AppExp>),
    Class(Rc<ClassExp>),
}

/// `(if test then alt)`
#[derive(Debug, Clone, PartialEq)]
pub struct IfExp {
    pub test: CExp,
    pub then: CExp,
    pub alt: CExp,
}

/// `(lambda (params ...) body ...)`. The body is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcExp {
    pub params: Vec<String>,
    pub body: Vec<Exp>,
}

/// `(let ((var val) ...) body ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct LetExp {
    pub bindings: Vec<Binding>,
    pub body: Vec<Exp>,
}

/// `(rator rands ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct AppExp {
    pub rator: CExp,
    pub rands: Vec<CExp>,
}

/// `(class (fields ...) ((method (lambda ...)) ...))`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassExp {
    pub fields: Vec<String>,
    pub methods: Vec<Binding>,
}

impl ClassExp {
    /// First method bound under `name`, in declaration order.
    pub fn method(&self, name: &str) -> Option<&CExp> {
        self.methods.iter().find(|b| b.var == name).map(|b| &b.val)
    }
}

/// A `(name expression)` pair in a `let` or a class method list.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub var: String,
    pub val: CExp,
}

impl Binding {
    pub fn new(var: impl Into<String>, val: CExp) -> Self {
        Self {
            var: var.into(),
            val,
        }
    }
}

/// Quoted data: the value of `'x`, `'(1 2)`, `'()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Number(f64),
    Bool(bool),
    Str(String),
    Symbol(String),
    Empty,
    Pair(Box<Datum>, Box<Datum>),
}

impl Datum {
    /// Build a proper list from `items`.
    pub fn list(items: Vec<Datum>) -> Datum {
        items.into_iter().rev().fold(Datum::Empty, |tail, head| {
            Datum::Pair(Box::new(head), Box::new(tail))
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Primitive operators
// ══════════════════════════════════════════════════════════════════════════════

/// Built-in operators. Their names are reserved and cannot be rebound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    NumEq,
    Not,
    And,
    Or,
    IsEq,
    StringEq,
    Cons,
    Car,
    Cdr,
    List,
    IsPair,
    IsList,
    IsNumber,
    IsBoolean,
    IsSymbol,
    IsString,
}

impl PrimOp {
    pub const ALL: [PrimOp; 22] = [
        PrimOp::Add,
        PrimOp::Sub,
        PrimOp::Mul,
        PrimOp::Div,
        PrimOp::Gt,
        PrimOp::Lt,
        PrimOp::NumEq,
        PrimOp::Not,
        PrimOp::And,
        PrimOp::Or,
        PrimOp::IsEq,
        PrimOp::StringEq,
        PrimOp::Cons,
        PrimOp::Car,
        PrimOp::Cdr,
        PrimOp::List,
        PrimOp::IsPair,
        PrimOp::IsList,
        PrimOp::IsNumber,
        PrimOp::IsBoolean,
        PrimOp::IsSymbol,
        PrimOp::IsString,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimOp::Add => "+",
            PrimOp::Sub => "-",
            PrimOp::Mul => "*",
            PrimOp::Div => "/",
            PrimOp::Gt => ">",
            PrimOp::Lt => "<",
            PrimOp::NumEq => "=",
            PrimOp::Not => "not",
            PrimOp::And => "and",
            PrimOp::Or => "or",
            PrimOp::IsEq => "eq?",
            PrimOp::StringEq => "string=?",
            PrimOp::Cons => "cons",
            PrimOp::Car => "car",
            PrimOp::Cdr => "cdr",
            PrimOp::List => "list",
            PrimOp::IsPair => "pair?",
            PrimOp::IsList => "list?",
            PrimOp::IsNumber => "number?",
            PrimOp::IsBoolean => "boolean?",
            PrimOp::IsSymbol => "symbol?",
            PrimOp::IsString => "string?",
        }
    }

    pub fn from_name(name: &str) -> Option<PrimOp> {
        PrimOp::ALL.into_iter().find(|op| op.name() == name)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Constructors
// ══════════════════════════════════════════════════════════════════════════════

impl CExp {
    pub fn var(name: impl Into<String>) -> CExp {
        CExp::VarRef(name.into())
    }

    pub fn str(s: impl Into<String>) -> CExp {
        CExp::Str(s.into())
    }

    pub fn if_(test: CExp, then: CExp, alt: CExp) -> CExp {
        CExp::If(Box::new(IfExp { test, then, alt }))
    }

    pub fn proc<S: Into<String>>(params: impl IntoIterator<Item = S>, body: Vec<Exp>) -> CExp {
        CExp::Proc(Rc::new(ProcExp {
            params: params.into_iter().map(Into::into).collect(),
            body,
        }))
    }

    pub fn let_(bindings: Vec<Binding>, body: Vec<Exp>) -> CExp {
        CExp::Let(Box::new(LetExp { bindings, body }))
    }

    pub fn app(rator: CExp, rands: Vec<CExp>) -> CExp {
        CExp::App(Box::new(AppExp { rator, rands }))
    }

    pub fn class<S: Into<String>>(fields: impl IntoIterator<Item = S>, methods: Vec<Binding>) -> CExp {
        CExp::Class(Rc::new(ClassExp {
            fields: fields.into_iter().map(Into::into).collect(),
            methods,
        }))
    }
}

impl Exp {
    pub fn define(var: impl Into<String>, val: CExp) -> Exp {
        Exp::Define(DefineExp {
            var: var.into(),
            val,
        })
    }
}

impl From<CExp> for Exp {
    fn from(exp: CExp) -> Self {
        Exp::Expr(exp)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Teardown
// ══════════════════════════════════════════════════════════════════════════════

// Compound nodes release their children under `ensure_sufficient_stack`, so
// dropping a deeply nested tree can't overflow the native stack.

fn take_cexp(exp: &mut CExp) -> CExp {
    mem::replace(exp, CExp::Bool(false))
}

fn drop_deep<T>(value: T) {
    ensure_sufficient_stack(move || drop(value));
}

impl Drop for IfExp {
    fn drop(&mut self) {
        drop_deep([
            take_cexp(&mut self.test),
            take_cexp(&mut self.then),
            take_cexp(&mut self.alt),
        ]);
    }
}

impl Drop for ProcExp {
    fn drop(&mut self) {
        drop_deep(mem::take(&mut self.body));
    }
}

impl Drop for LetExp {
    fn drop(&mut self) {
        drop_deep((mem::take(&mut self.bindings), mem::take(&mut self.body)));
    }
}

impl Drop for AppExp {
    fn drop(&mut self) {
        drop_deep((take_cexp(&mut self.rator), mem::take(&mut self.rands)));
    }
}

impl Drop for ClassExp {
    fn drop(&mut self) {
        drop_deep(mem::take(&mut self.methods));
    }
}

impl Drop for Datum {
    // Quoted lists nest to the right; walk the tail chain in a loop.
    fn drop(&mut self) {
        let Datum::Pair(head, tail) = self else {
            return;
        };
        let head = mem::replace(head.as_mut(), Datum::Empty);
        let mut rest = mem::replace(tail.as_mut(), Datum::Empty);
        drop_deep(head);
        while let Datum::Pair(_, tail) = &mut rest {
            let next = mem::replace(tail.as_mut(), Datum::Empty);
            rest = next;
        }
    }
}
