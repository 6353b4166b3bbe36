//! Reader: token stream to concrete s-expressions.

use l3_lexer::token::{Token, TokenKind};
use l3_types::sexp::{Sexp, SexpKind};
use l3_types::stack::ensure_sufficient_stack;
use l3_types::{CompileErrors, ErrorCode, L3Error, SourceFile, Span};

/// Builds [`Sexp`] trees from tokens, collecting errors as it goes.
pub struct Reader<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: CompileErrors,
}

/// Result of reading: every complete top-level form plus any errors.
pub struct ReadResult {
    pub forms: Vec<Sexp>,
    pub errors: CompileErrors,
}

impl<'src> Reader<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> &TokenKind {
        self.peek().map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn current_span(&self) -> Span {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or(Span::point(1, 1))
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        Some(token)
    }

    fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = L3Error::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    // ── Forms ─────────────────────────────────────────────────────────────────

    /// Read every top-level form in the token stream.
    pub fn read_all(mut self) -> ReadResult {
        let mut forms = Vec::new();
        while !self.at_end() && !self.errors.is_full() {
            if matches!(self.peek_kind(), TokenKind::RParen) {
                let span = self.current_span();
                self.error_at(
                    ErrorCode::UNEXPECTED_CLOSE_PAREN,
                    "Unexpected ')' with no matching '('",
                    span,
                );
                self.advance();
                continue;
            }
            if let Some(form) = self.read_form() {
                forms.push(form);
            }
        }
        ReadResult {
            forms,
            errors: self.errors,
        }
    }

    /// Read one form. Returns `None` after reporting an error.
    fn read_form(&mut self) -> Option<Sexp> {
        ensure_sufficient_stack(|| self.read_form_inner())
    }

    fn read_form_inner(&mut self) -> Option<Sexp> {
        let token = self.advance()?;
        let span = token.span;
        match token.kind {
            TokenKind::Number(n) => Some(Sexp::new(SexpKind::Number(n), span)),
            TokenKind::Str(s) => Some(Sexp::new(SexpKind::Str(s), span)),
            TokenKind::Bool(b) => Some(Sexp::new(SexpKind::Bool(b), span)),
            TokenKind::Symbol(s) => Some(Sexp::new(SexpKind::Symbol(s), span)),
            TokenKind::Quote => self.read_quoted(span),
            TokenKind::LParen => self.read_list(span),
            TokenKind::RParen => {
                self.error_at(
                    ErrorCode::UNEXPECTED_CLOSE_PAREN,
                    "Unexpected ')' with no matching '('",
                    span,
                );
                None
            }
            TokenKind::Eof => {
                self.error_at(ErrorCode::UNEXPECTED_EOF, "Unexpected end of input", span);
                None
            }
        }
    }

    /// `'form` reads as `(quote form)`.
    fn read_quoted(&mut self, quote_span: Span) -> Option<Sexp> {
        if self.at_end() {
            self.error_at(
                ErrorCode::UNEXPECTED_EOF,
                "Expected a form after quote",
                quote_span,
            );
            return None;
        }
        let quoted = self.read_form()?;
        let span = quote_span.to(quoted.span);
        let head = Sexp::new(SexpKind::Symbol("quote".into()), quote_span);
        Some(Sexp::new(SexpKind::List(vec![head, quoted]), span))
    }

    /// Read list items up to the matching `)`. The `(` is already consumed.
    fn read_list(&mut self, open_span: Span) -> Option<Sexp> {
        let mut items = Vec::new();
        let mut ok = true;
        loop {
            match self.peek_kind() {
                TokenKind::RParen => {
                    let close = self.advance()?;
                    if !ok {
                        return None;
                    }
                    return Some(Sexp::new(SexpKind::List(items), open_span.to(close.span)));
                }
                TokenKind::Eof => {
                    self.error_at(
                        ErrorCode::UNCLOSED_PAREN,
                        "Unclosed '(' at end of input",
                        open_span,
                    );
                    return None;
                }
                _ => match self.read_form() {
                    Some(form) => items.push(form),
                    None => ok = false,
                },
            }
        }
    }
}
