//! Shared types for L3.
//!
//! Source spans, structured reader/parser errors, the concrete s-expression
//! syntax and the AST consumed by the evaluator.

mod error;
mod span;
pub mod ast;
pub mod sexp;
pub mod stack;
pub mod unparse;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, L3Error, Severity, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used by the reader and parser.
pub type Result<T> = std::result::Result<T, L3Error>;
