//! L3 parser: token stream to s-expressions, s-expressions to AST.
//!
//! Two stages, both usable on their own:
//! - [`Reader`] builds concrete [`Sexp`] trees from tokens;
//! - [`Parser`] recognises special forms and builds [`l3_types::ast`] nodes.

mod parse_exp;
mod reader;

pub use parse_exp::{ParseResult, Parser, RESERVED_WORDS};
pub use reader::{ReadResult, Reader};

use l3_lexer::Lexer;
use l3_types::ast::Exp;
use l3_types::sexp::Sexp;
use l3_types::{CompileErrors, ErrorCode, L3Error, SourceFile, Span};

/// Lex and read every top-level form of a source file.
pub fn read_source(source_file: &SourceFile) -> ReadResult {
    let lexed = Lexer::new(source_file).lex();
    let mut read = Reader::new(lexed.tokens, source_file).read_all();
    let mut errors = lexed.errors;
    errors.extend(read.errors);
    read.errors = errors;
    read
}

/// Read exactly one s-expression from `text`.
pub fn parse(text: &str) -> l3_types::Result<Sexp> {
    let source_file = SourceFile::new("<input>", text);
    let ReadResult { mut forms, errors } = read_source(&source_file);
    if let Some(err) = errors.errors.into_iter().next() {
        return Err(err);
    }
    match forms.len() {
        1 => Ok(forms.remove(0)),
        0 => Err(L3Error::new(
            &source_file.name,
            ErrorCode::UNEXPECTED_EOF,
            "Expected an expression, found end of input",
            Span::point(1, 1),
            source_file.line(1).unwrap_or(""),
        )),
        _ => {
            let span = forms[1].span;
            Err(L3Error::new(
                &source_file.name,
                ErrorCode::TRAILING_INPUT,
                "Unexpected input after the first expression",
                span,
                source_file.line(span.start_line).unwrap_or(""),
            ))
        }
    }
}

/// Parse one concrete expression into an AST node.
pub fn parse_l3_exp(sexp: &Sexp) -> l3_types::Result<Exp> {
    Parser::detached().parse_exp(sexp)
}

/// Read and parse a whole `(L3 exp ...)` program.
pub fn parse_l3_program(source_file: &SourceFile) -> ParseResult {
    let ReadResult { forms, errors } = read_source(source_file);
    if errors.has_errors() {
        return ParseResult {
            program: None,
            errors,
        };
    }
    match forms.as_slice() {
        [form] => Parser::new(source_file).parse_program(form),
        _ => {
            let mut errors = CompileErrors::empty();
            let span = forms.get(1).map(|f| f.span).unwrap_or(Span::point(1, 1));
            errors.push_error(L3Error::new(
                &source_file.name,
                ErrorCode::BAD_PROGRAM,
                format!("Expected a single (L3 ...) form, found {}", forms.len()),
                span,
                source_file.line(span.start_line).unwrap_or(""),
            ));
            ParseResult {
                program: None,
                errors,
            }
        }
    }
}
