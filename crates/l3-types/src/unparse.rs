//! Render AST nodes back to canonical concrete syntax.
//!
//! Only used for diagnostics: traces and error messages.

use crate::ast::*;
use std::fmt::{self, Display, Formatter, Write};

/// Format a number the way L3 prints it: integral values without a
/// fractional part, everything else in Rust's shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Write `s` as a double-quoted literal with escapes.
pub fn write_string_literal(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            _ => f.write_char(ch)?,
        }
    }
    f.write_char('"')
}

fn write_spaced<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("(L3")?;
        for exp in &self.exps {
            write!(f, " {exp}")?;
        }
        f.write_char(')')
    }
}

impl Display for Exp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Exp::Define(def) => write!(f, "(define {} {})", def.var, def.val),
            Exp::Expr(exp) => write!(f, "{exp}"),
        }
    }
}

impl Display for CExp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CExp::Num(n) => f.write_str(&format_number(*n)),
            CExp::Bool(true) => f.write_str("#t"),
            CExp::Bool(false) => f.write_str("#f"),
            CExp::Str(s) => write_string_literal(f, s),
            CExp::Prim(op) => f.write_str(op.name()),
            CExp::VarRef(name) => f.write_str(name),
            CExp::Lit(datum) => write!(f, "'{datum}"),
            CExp::If(exp) => write!(f, "(if {} {} {})", exp.test, exp.then, exp.alt),
            CExp::Proc(proc) => {
                f.write_str("(lambda (")?;
                write_spaced(f, &proc.params)?;
                f.write_str(") ")?;
                write_spaced(f, &proc.body)?;
                f.write_char(')')
            }
            CExp::Let(exp) => {
                f.write_str("(let (")?;
                write_spaced(f, &exp.bindings)?;
                f.write_str(") ")?;
                write_spaced(f, &exp.body)?;
                f.write_char(')')
            }
            CExp::App(exp) => {
                write!(f, "({}", exp.rator)?;
                for rand in &exp.rands {
                    write!(f, " {rand}")?;
                }
                f.write_char(')')
            }
            CExp::Class(class) => {
                f.write_str("(class (")?;
                write_spaced(f, &class.fields)?;
                f.write_str(") (")?;
                write_spaced(f, &class.methods)?;
                f.write_str("))")
            }
        }
    }
}

impl Display for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.var, self.val)
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Number(n) => f.write_str(&format_number(*n)),
            Datum::Bool(true) => f.write_str("#t"),
            Datum::Bool(false) => f.write_str("#f"),
            Datum::Str(s) => write_string_literal(f, s),
            Datum::Symbol(s) => f.write_str(s),
            Datum::Empty => f.write_str("()"),
            Datum::Pair(head, tail) => {
                write!(f, "({head}")?;
                let mut rest = tail.as_ref();
                loop {
                    match rest {
                        Datum::Empty => break,
                        Datum::Pair(h, t) => {
                            write!(f, " {h}")?;
                            rest = t.as_ref();
                        }
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                f.write_char(')')
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }

    #[test]
    fn test_unparse_lambda_and_app() {
        let exp = CExp::app(
            CExp::proc(
                ["x"],
                vec![CExp::app(CExp::Prim(PrimOp::Add), vec![CExp::var("x"), CExp::Num(1.0)]).into()],
            ),
            vec![CExp::Num(2.0)],
        );
        assert_eq!(exp.to_string(), "((lambda (x) (+ x 1)) 2)");
    }

    #[test]
    fn test_unparse_let_if_define() {
        let exp = Exp::define(
            "y",
            CExp::let_(
                vec![Binding::new("x", CExp::Bool(true))],
                vec![CExp::if_(CExp::var("x"), CExp::str("a\"b"), CExp::Bool(false)).into()],
            ),
        );
        assert_eq!(exp.to_string(), r#"(define y (let ((x #t)) (if x "a\"b" #f)))"#);
    }

    #[test]
    fn test_unparse_class() {
        let exp = CExp::class(
            ["a", "b"],
            vec![Binding::new("first", CExp::proc(Vec::<String>::new(), vec![CExp::var("a").into()]))],
        );
        assert_eq!(exp.to_string(), "(class (a b) ((first (lambda () a))))");
    }

    #[test]
    fn test_unparse_quoted_data() {
        let proper = Datum::list(vec![Datum::Symbol("a".into()), Datum::Number(2.0)]);
        assert_eq!(CExp::Lit(proper).to_string(), "'(a 2)");
        let dotted = Datum::Pair(Box::new(Datum::Number(1.0)), Box::new(Datum::Number(2.0)));
        assert_eq!(dotted.to_string(), "(1 . 2)");
        assert_eq!(CExp::Lit(Datum::Empty).to_string(), "'()");
    }
}
