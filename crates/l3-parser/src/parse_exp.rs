//! Special-form analysis: concrete s-expressions to L3 AST nodes.

use l3_types::ast::*;
use l3_types::sexp::{Sexp, SexpKind};
use l3_types::stack::ensure_sufficient_stack;
use l3_types::{CompileErrors, ErrorCode, L3Error, SourceFile, Span};
use std::collections::HashSet;
use std::rc::Rc;

/// Keywords that can never be used as variable names.
pub const RESERVED_WORDS: &[&str] = &["define", "if", "lambda", "let", "quote", "class", "L3"];

/// Result of parsing a whole program.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

/// Turns [`Sexp`] trees into AST nodes.
///
/// Individual forms fail fast with the first error found; a program keeps
/// going after a bad top-level form so every broken form gets reported.
pub struct Parser<'src> {
    file_name: &'src str,
    source_file: Option<&'src SourceFile>,
}

impl Parser<'static> {
    /// A parser for forms that did not come from a file. Errors carry no
    /// source line.
    pub fn detached() -> Self {
        Parser {
            file_name: "<input>",
            source_file: None,
        }
    }
}

impl<'src> Parser<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            file_name: &source_file.name,
            source_file: Some(source_file),
        }
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> L3Error {
        let source_line = self
            .source_file
            .and_then(|sf| sf.line(span.start_line))
            .unwrap_or("");
        L3Error::new(self.file_name, code, message, span, source_line)
    }

    // ── Programs ──────────────────────────────────────────────────────────────

    /// `(L3 exp ...)`
    pub fn parse_program(&self, sexp: &Sexp) -> ParseResult {
        let mut errors = CompileErrors::empty();
        let items = match sexp.as_list() {
            Some([head, rest @ ..]) if head.as_symbol() == Some("L3") => rest,
            _ => {
                errors.push_error(
                    self.error(
                        ErrorCode::BAD_PROGRAM,
                        format!("Program must be of the form (L3 exp ...), got {sexp}"),
                        sexp.span,
                    )
                    .with_suggestion("(L3 (define x 1) x)"),
                );
                return ParseResult {
                    program: None,
                    errors,
                };
            }
        };

        let mut exps = Vec::with_capacity(items.len());
        for item in items {
            match self.parse_exp(item) {
                Ok(exp) => exps.push(exp),
                Err(err) => errors.push_error(err),
            }
        }

        let program = (!errors.has_errors()).then(|| Program {
            exps,
            span: sexp.span,
        });
        ParseResult { program, errors }
    }

    // ── Sequence elements ─────────────────────────────────────────────────────

    /// A definition or an ordinary expression.
    pub fn parse_exp(&self, sexp: &Sexp) -> l3_types::Result<Exp> {
        match sexp.as_list() {
            Some([head, rest @ ..]) if head.as_symbol() == Some("define") => {
                self.parse_define(rest, sexp.span)
            }
            _ => self.parse_cexp(sexp).map(Exp::Expr),
        }
    }

    fn parse_define(&self, operands: &[Sexp], span: Span) -> l3_types::Result<Exp> {
        let [var, val] = operands else {
            return Err(self
                .error(
                    ErrorCode::BAD_DEFINE,
                    format!("define expects 2 operands, got {}", operands.len()),
                    span,
                )
                .with_suggestion("(define name value)"));
        };
        let var = self.parse_var_decl(var)?;
        let val = self.parse_cexp(val)?;
        Ok(Exp::Define(DefineExp { var, val }))
    }

    fn parse_body(&self, items: &[Sexp]) -> l3_types::Result<Vec<Exp>> {
        items.iter().map(|item| self.parse_exp(item)).collect()
    }

    // ── Expressions ───────────────────────────────────────────────────────────

    pub fn parse_cexp(&self, sexp: &Sexp) -> l3_types::Result<CExp> {
        ensure_sufficient_stack(|| self.parse_cexp_inner(sexp))
    }

    fn parse_cexp_inner(&self, sexp: &Sexp) -> l3_types::Result<CExp> {
        match &sexp.kind {
            SexpKind::Number(n) => Ok(CExp::Num(*n)),
            SexpKind::Bool(b) => Ok(CExp::Bool(*b)),
            SexpKind::Str(s) => Ok(CExp::Str(s.clone())),
            SexpKind::Symbol(name) => self.parse_symbol(name, sexp.span),
            SexpKind::List(items) => self.parse_compound(items, sexp.span),
        }
    }

    fn parse_symbol(&self, name: &str, span: Span) -> l3_types::Result<CExp> {
        if let Some(op) = PrimOp::from_name(name) {
            return Ok(CExp::Prim(op));
        }
        if RESERVED_WORDS.contains(&name) {
            return Err(self.error(
                ErrorCode::RESERVED_WORD,
                format!("'{name}' is a keyword and cannot be used as a value"),
                span,
            ));
        }
        Ok(CExp::VarRef(name.to_string()))
    }

    fn parse_compound(&self, items: &[Sexp], span: Span) -> l3_types::Result<CExp> {
        let Some((head, operands)) = items.split_first() else {
            return Err(self
                .error(ErrorCode::EMPTY_APPLICATION, "Empty application ()", span)
                .with_suggestion("Use '() for the empty list"));
        };
        match head.as_symbol() {
            Some("if") => self.parse_if(operands, span),
            Some("lambda") => self.parse_lambda(operands, span),
            Some("let") => self.parse_let(operands, span),
            Some("quote") => self.parse_quote(operands, span),
            Some("class") => self.parse_class(operands, span),
            Some("define") => Err(self.error(
                ErrorCode::MISPLACED_DEFINE,
                "define is only allowed at the top of a program or body",
                span,
            )),
            Some("L3") => Err(self.error(
                ErrorCode::BAD_PROGRAM,
                "L3 may only appear as the outermost program form",
                span,
            )),
            _ => {
                let rator = self.parse_cexp(head)?;
                let rands = operands
                    .iter()
                    .map(|rand| self.parse_cexp(rand))
                    .collect::<l3_types::Result<Vec<_>>>()?;
                Ok(CExp::app(rator, rands))
            }
        }
    }

    fn parse_if(&self, operands: &[Sexp], span: Span) -> l3_types::Result<CExp> {
        let [test, then, alt] = operands else {
            return Err(self
                .error(
                    ErrorCode::BAD_IF,
                    format!("if expects 3 operands, got {}", operands.len()),
                    span,
                )
                .with_suggestion("(if test then else)"));
        };
        Ok(CExp::if_(
            self.parse_cexp(test)?,
            self.parse_cexp(then)?,
            self.parse_cexp(alt)?,
        ))
    }

    fn parse_lambda(&self, operands: &[Sexp], span: Span) -> l3_types::Result<CExp> {
        let Some((params, body)) = operands.split_first().filter(|(_, body)| !body.is_empty())
        else {
            return Err(self
                .error(ErrorCode::BAD_LAMBDA, "lambda needs a parameter list and a body", span)
                .with_suggestion("(lambda (x) (* x x))"));
        };
        let Some(params) = params.as_list() else {
            return Err(self.error(
                ErrorCode::BAD_LAMBDA,
                format!("lambda parameters must be a list, got {params}"),
                params.span,
            ));
        };
        let params = self.parse_var_decls(params)?;
        Ok(CExp::Proc(Rc::new(ProcExp {
            params,
            body: self.parse_body(body)?,
        })))
    }

    fn parse_let(&self, operands: &[Sexp], span: Span) -> l3_types::Result<CExp> {
        let Some((bindings, body)) = operands.split_first().filter(|(_, body)| !body.is_empty())
        else {
            return Err(self
                .error(ErrorCode::BAD_LET, "let needs a binding list and a body", span)
                .with_suggestion("(let ((x 1) (y 2)) (+ x y))"));
        };
        let bindings = self.parse_bindings(bindings, ErrorCode::BAD_LET)?;
        Ok(CExp::let_(bindings, self.parse_body(body)?))
    }

    fn parse_quote(&self, operands: &[Sexp], span: Span) -> l3_types::Result<CExp> {
        let [datum] = operands else {
            return Err(self.error(
                ErrorCode::BAD_QUOTE,
                format!("quote expects 1 operand, got {}", operands.len()),
                span,
            ));
        };
        Ok(CExp::Lit(to_datum(datum)))
    }

    fn parse_class(&self, operands: &[Sexp], span: Span) -> l3_types::Result<CExp> {
        let [fields, methods] = operands else {
            return Err(self
                .error(
                    ErrorCode::BAD_CLASS,
                    format!("class expects 2 operands, got {}", operands.len()),
                    span,
                )
                .with_suggestion("(class (field ...) ((method (lambda (arg ...) body)) ...))"));
        };
        let Some(field_list) = fields.as_list() else {
            return Err(self.error(
                ErrorCode::BAD_CLASS,
                format!("class fields must be a list, got {fields}"),
                fields.span,
            ));
        };
        let fields = self.parse_var_decls(field_list)?;
        let methods = self.parse_bindings(methods, ErrorCode::BAD_CLASS)?;
        Ok(CExp::Class(Rc::new(ClassExp { fields, methods })))
    }

    // ── Names ─────────────────────────────────────────────────────────────────

    fn parse_var_decl(&self, sexp: &Sexp) -> l3_types::Result<String> {
        let Some(name) = sexp.as_symbol() else {
            return Err(self.error(
                ErrorCode::EXPECTED_IDENTIFIER,
                format!("Expected an identifier, got {sexp}"),
                sexp.span,
            ));
        };
        if RESERVED_WORDS.contains(&name) || PrimOp::from_name(name).is_some() {
            return Err(self.error(
                ErrorCode::RESERVED_WORD,
                format!("'{name}' is reserved and cannot be bound"),
                sexp.span,
            ));
        }
        Ok(name.to_string())
    }

    /// A list of distinct variable names.
    fn parse_var_decls(&self, items: &[Sexp]) -> l3_types::Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(items.len());
        for item in items {
            let name = self.parse_var_decl(item)?;
            if !seen.insert(name.clone()) {
                return Err(self.error(
                    ErrorCode::DUPLICATE_NAME,
                    format!("'{name}' is bound more than once"),
                    item.span,
                ));
            }
            names.push(name);
        }
        Ok(names)
    }

    /// `((name exp) ...)`. Let bindings must have distinct names; class
    /// methods may repeat a name, and the first one wins at call time.
    fn parse_bindings(&self, sexp: &Sexp, code: ErrorCode) -> l3_types::Result<Vec<Binding>> {
        let Some(items) = sexp.as_list() else {
            return Err(self.error(code, format!("Expected a binding list, got {sexp}"), sexp.span));
        };
        let mut seen = HashSet::new();
        let mut bindings = Vec::with_capacity(items.len());
        for item in items {
            let Some([var, val]) = item.as_list() else {
                return Err(self.error(
                    code,
                    format!("Expected a (name value) binding, got {item}"),
                    item.span,
                ));
            };
            let var = self.parse_var_decl(var)?;
            if code == ErrorCode::BAD_LET && !seen.insert(var.clone()) {
                return Err(self.error(
                    ErrorCode::DUPLICATE_NAME,
                    format!("'{var}' is bound more than once"),
                    item.span,
                ));
            }
            bindings.push(Binding::new(var, self.parse_cexp(val)?));
        }
        Ok(bindings)
    }
}

/// Quoted forms become data verbatim; nothing inside is evaluated or checked.
fn to_datum(sexp: &Sexp) -> Datum {
    match &sexp.kind {
        SexpKind::Number(n) => Datum::Number(*n),
        SexpKind::Bool(b) => Datum::Bool(*b),
        SexpKind::Str(s) => Datum::Str(s.clone()),
        SexpKind::Symbol(s) => Datum::Symbol(s.clone()),
        SexpKind::List(items) => {
            ensure_sufficient_stack(|| Datum::list(items.iter().map(to_datum).collect()))
        }
    }
}
