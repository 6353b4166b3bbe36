//! Runtime values.

use crate::env::Env;
use l3_types::ast::{ClassExp, Datum, PrimOp, ProcExp};
use l3_types::stack::ensure_sufficient_stack;
use l3_types::unparse::{format_number, write_string_literal};
use std::fmt;
use std::mem;
use std::rc::Rc;

/// A runtime value.
///
/// Closures, classes and objects are reference-counted and share the
/// environment they captured. `==` is structural for data (numbers, strings,
/// symbols, lists) and identity for closures, classes and objects.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    Symbol(String),
    /// The empty list `'()`.
    Empty,
    Pair(Rc<Pair>),
    Prim(PrimOp),
    Closure(Rc<Closure>),
    Class(Rc<Class>),
    Object(Rc<Object>),
}

/// A cons cell.
#[derive(Debug)]
pub struct Pair {
    pub car: Value,
    pub cdr: Value,
}

impl Drop for Pair {
    // Unlink the cdr chain iteratively so dropping a long list can't
    // overflow the stack. Nested cars recurse under the stack guard.
    fn drop(&mut self) {
        let car = mem::replace(&mut self.car, Value::Empty);
        if let Value::Pair(_) = car {
            ensure_sufficient_stack(move || drop(car));
        }
        let mut next = mem::replace(&mut self.cdr, Value::Empty);
        while let Value::Pair(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut pair) => next = mem::replace(&mut pair.cdr, Value::Empty),
                Err(_) => break,
            }
        }
    }
}

/// A procedure paired with the environment it was created in.
#[derive(Debug)]
pub struct Closure {
    pub proc: Rc<ProcExp>,
    pub env: Env,
}

impl Closure {
    pub fn params(&self) -> &[String] {
        &self.proc.params
    }
}

/// A class definition paired with an environment.
///
/// Evaluating a class expression captures the defining environment;
/// instantiating it produces a fresh `Class` whose environment also binds
/// the fields.
#[derive(Debug, Clone)]
pub struct Class {
    pub def: Rc<ClassExp>,
    pub env: Env,
}

/// An instantiated class. Only callable with a method-name symbol first.
#[derive(Debug)]
pub struct Object {
    pub class: Class,
}

impl Value {
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Value {
        Value::Symbol(s.into())
    }

    pub fn cons(head: Value, tail: Value) -> Value {
        Value::Pair(Rc::new(Pair {
            car: head,
            cdr: tail,
        }))
    }

    /// Build a proper list.
    pub fn list(items: Vec<Value>) -> Value {
        items
            .into_iter()
            .rev()
            .fold(Value::Empty, |tail, head| Value::cons(head, tail))
    }

    /// Everything except `#f` counts as true.
    pub fn is_true(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn is_list(&self) -> bool {
        let mut current = self;
        loop {
            match current {
                Value::Empty => return true,
                Value::Pair(pair) => current = &pair.cdr,
                _ => return false,
            }
        }
    }

    /// Short name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Empty => "empty list",
            Value::Pair(_) => "pair",
            Value::Prim(_) => "primitive",
            Value::Closure(_) => "closure",
            Value::Class(_) => "class",
            Value::Object(_) => "object",
        }
    }
}

impl From<&Datum> for Value {
    fn from(datum: &Datum) -> Self {
        let mut heads = Vec::new();
        let mut rest = datum;
        while let Datum::Pair(head, tail) = rest {
            heads.push(ensure_sufficient_stack(|| Value::from(head.as_ref())));
            rest = tail.as_ref();
        }
        let last = match rest {
            Datum::Number(n) => Value::Number(*n),
            Datum::Bool(b) => Value::Bool(*b),
            Datum::Str(s) => Value::Str(s.clone()),
            Datum::Symbol(s) => Value::Symbol(s.clone()),
            Datum::Empty | Datum::Pair(..) => Value::Empty,
        };
        heads
            .into_iter()
            .rev()
            .fold(last, |tail, head| Value::cons(head, tail))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            return match (a, b) {
                (Value::Pair(x), Value::Pair(y)) => {
                    if !ensure_sufficient_stack(|| x.car == y.car) {
                        return false;
                    }
                    a = &x.cdr;
                    b = &y.cdr;
                    continue;
                }
                (Value::Number(x), Value::Number(y)) => x == y,
                (Value::Bool(x), Value::Bool(y)) => x == y,
                (Value::Str(x), Value::Str(y)) => x == y,
                (Value::Symbol(x), Value::Symbol(y)) => x == y,
                (Value::Empty, Value::Empty) => true,
                (Value::Prim(x), Value::Prim(y)) => x == y,
                (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
                (Value::Class(x), Value::Class(y)) => Rc::ptr_eq(x, y),
                (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
                _ => false,
            };
        }
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    write!(f, "({})", names.join(" "))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Bool(true) => f.write_str("#t"),
            Value::Bool(false) => f.write_str("#f"),
            Value::Str(s) => write_string_literal(f, s),
            Value::Symbol(s) => f.write_str(s),
            Value::Empty => f.write_str("'()"),
            Value::Pair(pair) => {
                write!(f, "({}", pair.car)?;
                let mut rest = &pair.cdr;
                loop {
                    match rest {
                        Value::Empty => break,
                        Value::Pair(next) => {
                            write!(f, " {}", next.car)?;
                            rest = &next.cdr;
                        }
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                f.write_str(")")
            }
            Value::Prim(op) => write!(f, "#<primitive {}>", op.name()),
            Value::Closure(closure) => {
                f.write_str("<Closure ")?;
                write_names(f, closure.params())?;
                for exp in &closure.proc.body {
                    write!(f, " {exp}")?;
                }
                f.write_str(">")
            }
            Value::Class(class) => {
                f.write_str("<Class ")?;
                write_names(f, &class.def.fields)?;
                f.write_str(">")
            }
            Value::Object(object) => {
                f.write_str("<Object ")?;
                write_names(f, &object.class.def.fields)?;
                f.write_str(">")
            }
        }
    }
}
