//! Reader and parser tests: s-expression structure, every special form,
//! error codes, recovery across top-level forms, and determinism.

use l3_parser::{parse, parse_l3_exp, parse_l3_program, read_source, ParseResult};
use l3_types::ast::*;
use l3_types::sexp::SexpKind;
use l3_types::{ErrorCode, SourceFile, Span};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn exp(source: &str) -> Exp {
    let sexp = parse(source).unwrap_or_else(|e| panic!("read error: {e}"));
    parse_l3_exp(&sexp).unwrap_or_else(|e| panic!("parse error: {e}"))
}

fn cexp(source: &str) -> CExp {
    match exp(source) {
        Exp::Expr(e) => e,
        other => panic!("expected an expression, got {other}"),
    }
}

fn exp_error(source: &str) -> ErrorCode {
    let sexp = parse(source).unwrap_or_else(|e| panic!("read error: {e}"));
    parse_l3_exp(&sexp).expect_err("expected a parse error").code
}

fn read_error(source: &str) -> ErrorCode {
    parse(source).expect_err("expected a read error").code
}

fn program(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.l3", source);
    parse_l3_program(&sf)
}

// ─────────────────────────────────────────────────────────────────────
// Reader
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_read_nested_list() {
    let sexp = parse("(a (b 1) \"c\")").unwrap();
    let items = sexp.as_list().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_symbol(), Some("a"));
    assert_eq!(items[1].as_list().map(|l| l.len()), Some(2));
    assert_eq!(items[2].kind, SexpKind::Str("c".into()));
    assert_eq!(sexp.span, Span::new(1, 1, 1, 13));
}

#[test]
fn test_read_quote_shorthand() {
    let sexp = parse("'(1 x)").unwrap();
    assert_eq!(sexp.to_string(), "(quote (1 x))");
}

#[test]
fn test_read_errors() {
    assert_eq!(read_error("(+ 1 2"), ErrorCode::UNCLOSED_PAREN);
    assert_eq!(read_error(")"), ErrorCode::UNEXPECTED_CLOSE_PAREN);
    assert_eq!(read_error(""), ErrorCode::UNEXPECTED_EOF);
    assert_eq!(read_error("1 2"), ErrorCode::TRAILING_INPUT);
    assert_eq!(read_error("'"), ErrorCode::UNEXPECTED_EOF);
}

#[test]
fn test_read_source_collects_several_forms() {
    let sf = SourceFile::new("test.l3", "(a) b ) (c");
    let result = read_source(&sf);
    assert_eq!(result.forms.len(), 2);
    assert_eq!(result.errors.total_errors, 2);
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_CLOSE_PAREN);
    assert_eq!(result.errors.errors[1].code, ErrorCode::UNCLOSED_PAREN);
}

// ─────────────────────────────────────────────────────────────────────
// Atoms
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_atoms() {
    assert_eq!(cexp("42"), CExp::Num(42.0));
    assert_eq!(cexp("#f"), CExp::Bool(false));
    assert_eq!(cexp("\"hi\""), CExp::str("hi"));
    assert_eq!(cexp("x"), CExp::var("x"));
}

#[test]
fn test_primitive_names() {
    assert_eq!(cexp("+"), CExp::Prim(PrimOp::Add));
    assert_eq!(cexp("string=?"), CExp::Prim(PrimOp::StringEq));
    assert_eq!(cexp("car"), CExp::Prim(PrimOp::Car));
}

#[test]
fn test_keyword_as_value_rejected() {
    assert_eq!(exp_error("lambda"), ErrorCode::RESERVED_WORD);
}

// ─────────────────────────────────────────────────────────────────────
// Special forms
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_define() {
    assert_eq!(exp("(define x 5)"), Exp::define("x", CExp::Num(5.0)));
}

#[test]
fn test_define_errors() {
    assert_eq!(exp_error("(define x)"), ErrorCode::BAD_DEFINE);
    assert_eq!(exp_error("(define 1 2)"), ErrorCode::EXPECTED_IDENTIFIER);
    assert_eq!(exp_error("(define car 2)"), ErrorCode::RESERVED_WORD);
    assert_eq!(exp_error("(+ (define x 1) 2)"), ErrorCode::MISPLACED_DEFINE);
}

#[test]
fn test_if() {
    assert_eq!(
        cexp("(if #t 1 2)"),
        CExp::if_(CExp::Bool(true), CExp::Num(1.0), CExp::Num(2.0))
    );
    assert_eq!(exp_error("(if #t 1)"), ErrorCode::BAD_IF);
}

#[test]
fn test_lambda() {
    let CExp::Proc(proc) = cexp("(lambda (x y) (define z x) (+ z y))") else {
        panic!("expected lambda");
    };
    assert_eq!(proc.params, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(proc.body.len(), 2);
    assert!(matches!(proc.body[0], Exp::Define(_)));
}

#[test]
fn test_lambda_errors() {
    assert_eq!(exp_error("(lambda (x))"), ErrorCode::BAD_LAMBDA);
    assert_eq!(exp_error("(lambda x x)"), ErrorCode::BAD_LAMBDA);
    assert_eq!(exp_error("(lambda (x x) x)"), ErrorCode::DUPLICATE_NAME);
    assert_eq!(exp_error("(lambda (1) 1)"), ErrorCode::EXPECTED_IDENTIFIER);
}

#[test]
fn test_let() {
    assert_eq!(
        cexp("(let ((x 1) (y 2)) (+ x y))"),
        CExp::let_(
            vec![Binding::new("x", CExp::Num(1.0)), Binding::new("y", CExp::Num(2.0))],
            vec![CExp::app(CExp::Prim(PrimOp::Add), vec![CExp::var("x"), CExp::var("y")]).into()],
        )
    );
}

#[test]
fn test_let_errors() {
    assert_eq!(exp_error("(let ((x 1)))"), ErrorCode::BAD_LET);
    assert_eq!(exp_error("(let (x 1) x)"), ErrorCode::BAD_LET);
    assert_eq!(exp_error("(let ((x 1) (x 2)) x)"), ErrorCode::DUPLICATE_NAME);
}

#[test]
fn test_quote() {
    assert_eq!(
        cexp("'(a 1 #t)"),
        CExp::Lit(Datum::list(vec![
            Datum::Symbol("a".into()),
            Datum::Number(1.0),
            Datum::Bool(true),
        ]))
    );
    assert_eq!(cexp("(quote x)"), CExp::Lit(Datum::Symbol("x".into())));
    assert_eq!(cexp("'()"), CExp::Lit(Datum::Empty));
    assert_eq!(exp_error("(quote a b)"), ErrorCode::BAD_QUOTE);
}

#[test]
fn test_quote_keeps_keywords_as_data() {
    assert_eq!(cexp("'lambda"), CExp::Lit(Datum::Symbol("lambda".into())));
}

#[test]
fn test_class() {
    let CExp::Class(class) = cexp("(class (a b) ((sum (lambda () (+ a b))) (first (lambda () a))))")
    else {
        panic!("expected class");
    };
    assert_eq!(class.fields, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(class.methods.len(), 2);
    assert_eq!(class.methods[0].var, "sum");
    assert!(matches!(class.method("first"), Some(CExp::Proc(_))));
}

#[test]
fn test_class_allows_repeated_method_names() {
    let CExp::Class(class) = cexp("(class () ((m (lambda () 1)) (m (lambda () 2))))") else {
        panic!("expected class");
    };
    assert_eq!(class.methods.len(), 2);
}

#[test]
fn test_class_errors() {
    assert_eq!(exp_error("(class (a))"), ErrorCode::BAD_CLASS);
    assert_eq!(exp_error("(class a ())"), ErrorCode::BAD_CLASS);
    assert_eq!(exp_error("(class (a) (m))"), ErrorCode::BAD_CLASS);
    assert_eq!(exp_error("(class (a a) ())"), ErrorCode::DUPLICATE_NAME);
}

#[test]
fn test_application() {
    assert_eq!(
        cexp("(f 1 \"s\")"),
        CExp::app(CExp::var("f"), vec![CExp::Num(1.0), CExp::str("s")])
    );
    assert_eq!(exp_error("()"), ErrorCode::EMPTY_APPLICATION);
}

// ─────────────────────────────────────────────────────────────────────
// Programs
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_program() {
    let result = program("(L3 (define x 1) (+ x 1))");
    assert!(!result.errors.has_errors());
    let prog = result.program.unwrap();
    assert_eq!(prog.exps.len(), 2);
    assert_eq!(prog.to_string(), "(L3 (define x 1) (+ x 1))");
}

#[test]
fn test_program_requires_l3_head() {
    let result = program("(define x 1)");
    assert!(result.program.is_none());
    assert_eq!(result.errors.errors[0].code, ErrorCode::BAD_PROGRAM);
}

#[test]
fn test_program_rejects_several_forms() {
    let result = program("(L3 1) (L3 2)");
    assert_eq!(result.errors.errors[0].code, ErrorCode::BAD_PROGRAM);
}

#[test]
fn test_program_reports_every_bad_form() {
    let result = program("(L3\n  (if 1)\n  (define)\n  3)");
    assert!(result.program.is_none());
    let codes: Vec<_> = result.errors.errors.iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![ErrorCode::BAD_IF, ErrorCode::BAD_DEFINE]);
    assert_eq!(result.errors.errors[0].source_line, "  (if 1)");
    assert_eq!(result.errors.errors[0].span.start_line, 2);
}

#[test]
fn test_unparse_round_trip_is_stable() {
    let source = "(L3 (define c (class (n) ((get (lambda () n))))) (let ((o (c 5))) (o 'get)))";
    let prog = program(source).program.unwrap();
    assert_eq!(prog.to_string(), source);
    let again = program(&prog.to_string()).program.unwrap();
    assert_eq!(prog.exps, again.exps);
}

#[test]
fn test_deeply_nested_expression_parses() {
    let depth = 10_000;
    let source = format!("{}x{}", "(f ".repeat(depth), ")".repeat(depth));
    let parsed = cexp(&source);
    let mut current = &parsed;
    for _ in 0..depth {
        let CExp::App(app) = current else {
            panic!("expected an application");
        };
        current = &app.rands[0];
    }
    assert_eq!(current, &CExp::var("x"));
}

#[test]
fn test_deeply_nested_quote_reads() {
    let depth = 10_000;
    let source = format!("'{}(){}", "(".repeat(depth), ")".repeat(depth));
    assert!(matches!(cexp(&source), CExp::Lit(Datum::Pair(..))));
}

#[test]
fn test_determinism_100_iterations() {
    let source = "(L3 (define sq (lambda (x) (* x x))) (sq 3))";
    let first = program(source).program.unwrap();
    for i in 0..100 {
        let prog = program(source).program.unwrap();
        assert_eq!(first, prog, "Determinism failure at iteration {i}");
    }
}
