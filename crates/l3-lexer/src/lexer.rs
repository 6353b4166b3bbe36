//! Core L3 lexer: converts source text to a token stream.
//!
//! - Parentheses, quote, numbers, strings, booleans and symbol atoms
//! - `;` line comments are stripped
//! - Error recovery: reports the problem, skips the bad input and keeps going
//!   until [`l3_types::MAX_ERRORS`] have been collected

use l3_types::{CompileErrors, ErrorCode, L3Error, SourceFile, Span};

use crate::token::{Token, TokenKind};

pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    line: u32,
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens plus any errors collected.
pub struct LexResult {
    /// Always ends with [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

/// Bytes that end an atom.
fn is_delimiter(ch: u8) -> bool {
    ch.is_ascii_whitespace()
        || matches!(ch, b'(' | b')' | b'\'' | b'"' | b';' | b'[' | b']' | b'{' | b'}')
}

/// Whether an atom should be read as a number rather than a symbol.
///
/// Rust's float parser also accepts `inf` and `nan`; those stay symbols.
fn looks_numeric(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let unsigned = unsigned.strip_prefix('.').unwrap_or(unsigned);
    unsigned.bytes().next().is_some_and(|b| b.is_ascii_digit())
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // UTF-8 continuation bytes don't start a new column
            self.col += 1;
        }
        Some(ch)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let err = self.make_error(code, message, span);
        self.errors.push_error(err);
    }

    fn make_error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> L3Error {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        L3Error::new(&self.source_file.name, code, message, span, source_line)
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() {
                self.advance();
            } else if ch == b';' {
                while let Some(ch) = self.peek() {
                    if ch == b'\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        self.skip_trivia();

        let start_line = self.line;
        let start_col = self.col;
        let start = self.pos;

        if self.errors.is_full() {
            return Token::new(TokenKind::Eof, Span::point(start_line, start_col));
        }

        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::point(start_line, start_col));
        };

        match ch {
            b'(' => Token::new(TokenKind::LParen, self.span_from(start_line, start_col)),
            b')' => Token::new(TokenKind::RParen, self.span_from(start_line, start_col)),
            b'\'' => Token::new(TokenKind::Quote, self.span_from(start_line, start_col)),
            b'"' => self.scan_string(start_line, start_col),
            b'[' | b']' | b'{' | b'}' => {
                let span = self.span_from(start_line, start_col);
                let err = self
                    .make_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("Unexpected character '{}'", ch as char),
                        span,
                    )
                    .with_suggestion("L3 only uses parentheses for grouping");
                self.errors.push_error(err);
                self.scan_token()
            }
            _ => self.scan_atom(start, start_line, start_col),
        }
    }

    /// Scan a number, boolean or symbol. The first byte is already consumed.
    fn scan_atom(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while let Some(ch) = self.peek() {
            if is_delimiter(ch) {
                break;
            }
            self.advance();
        }

        let span = self.span_from(start_line, start_col);
        // Atoms end on ASCII delimiters, so the slice is valid UTF-8
        let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();

        if let Some(rest) = text.strip_prefix('#') {
            return match rest {
                "t" | "true" => Token::new(TokenKind::Bool(true), span),
                "f" | "false" => Token::new(TokenKind::Bool(false), span),
                _ => {
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("Unknown literal '{text}'"),
                        span,
                    );
                    self.scan_token()
                }
            };
        }

        if looks_numeric(&text) {
            if let Ok(value) = text.parse::<f64>() {
                return Token::new(TokenKind::Number(value), span);
            }
        }

        Token::new(TokenKind::Symbol(text), span)
    }

    /// Scan a string literal. The opening `"` is already consumed.
    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Token {
        let mut buf = Vec::new();
        loop {
            match self.advance() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                    );
                    break;
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    let esc_line = self.line;
                    let esc_col = self.col.saturating_sub(1);
                    match self.advance() {
                        Some(b'n') => buf.push(b'\n'),
                        Some(b't') => buf.push(b'\t'),
                        Some(b'r') => buf.push(b'\r'),
                        Some(b'\\') => buf.push(b'\\'),
                        Some(b'"') => buf.push(b'"'),
                        Some(other) => {
                            let span = self.span_from(esc_line, esc_col);
                            self.emit_error(
                                ErrorCode::INVALID_ESCAPE,
                                format!("Invalid escape sequence '\\{}'", other as char),
                                span,
                            );
                            buf.push(other);
                        }
                        None => {
                            let span = self.span_from(start_line, start_col);
                            self.emit_error(
                                ErrorCode::UNTERMINATED_STRING,
                                "Unterminated string literal",
                                span,
                            );
                            break;
                        }
                    }
                }
                Some(ch) => buf.push(ch),
            }
        }
        let text = String::from_utf8_lossy(&buf).into_owned();
        Token::new(TokenKind::Str(text), self.span_from(start_line, start_col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("42"));
        assert!(looks_numeric("-1.5"));
        assert!(looks_numeric(".5"));
        assert!(looks_numeric("+7"));
        assert!(!looks_numeric("-"));
        assert!(!looks_numeric("inf"));
        assert!(!looks_numeric("nan"));
        assert!(!looks_numeric("x1"));
    }

    #[test]
    fn test_delimiters() {
        for b in [b' ', b'\n', b'(', b')', b'\'', b'"', b';'] {
            assert!(is_delimiter(b));
        }
        assert!(!is_delimiter(b'?'));
        assert!(!is_delimiter(b'-'));
    }
}
