use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors stored before the reader or parser gives up.
pub const MAX_ERRORS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// Error category, derived from the code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Lexing and reading s-expressions (E100–E199).
    Syntax,
    /// Malformed special forms (E200–E299).
    Form,
    /// Names and bindings (E300–E399).
    Scope,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Form => write!(f, "form"),
            Self::Scope => write!(f, "scope"),
        }
    }
}

/// Numeric error code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax (E100–E199) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const UNCLOSED_PAREN: Self = Self(102);
    pub const UNEXPECTED_CLOSE_PAREN: Self = Self(103);
    pub const UNEXPECTED_EOF: Self = Self(104);
    pub const TRAILING_INPUT: Self = Self(105);
    pub const INVALID_ESCAPE: Self = Self(106);

    // ── Special forms (E200–E299) ──
    pub const EMPTY_APPLICATION: Self = Self(200);
    pub const BAD_DEFINE: Self = Self(201);
    pub const BAD_IF: Self = Self(202);
    pub const BAD_LAMBDA: Self = Self(203);
    pub const BAD_LET: Self = Self(204);
    pub const BAD_QUOTE: Self = Self(205);
    pub const BAD_CLASS: Self = Self(206);
    pub const BAD_PROGRAM: Self = Self(207);
    pub const MISPLACED_DEFINE: Self = Self(208);

    // ── Scope (E300–E399) ──
    pub const RESERVED_WORD: Self = Self(300);
    pub const DUPLICATE_NAME: Self = Self(301);
    pub const EXPECTED_IDENTIFIER: Self = Self(302);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Form,
            _ => ErrorCategory::Scope,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured reader/parser error.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{span}: {code} [{category}] {message}")]
pub struct L3Error {
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, for context.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl L3Error {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Errors collected by one reader or parser run.
///
/// At most [`MAX_ERRORS`] are stored; `total_errors` keeps counting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<L3Error>,
    pub total_errors: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// True once the storage cap is reached.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    pub fn push_error(&mut self, error: L3Error) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn first(&self) -> Option<&L3Error> {
        self.errors.first()
    }

    pub fn extend(&mut self, other: CompileErrors) {
        let extra = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += extra;
    }
}
