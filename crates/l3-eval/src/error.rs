//! Runtime error types for the L3 evaluator.

use l3_types::L3Error;

/// Every way an evaluation can fail.
///
/// Failures propagate unchanged from the innermost sub-evaluation to the
/// caller: the first one wins and nothing is retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// Symbol not bound in any enclosing frame.
    #[error("var not found: {0}")]
    UnboundVariable(String),
    /// Application target is not callable. Carries the rendered value.
    #[error("Bad procedure {0}")]
    BadProcedure(String),
    /// Closure or class called with the wrong number of arguments.
    #[error("Arity mismatch: expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("Unrecognized method: {0}")]
    UnrecognizedMethod(String),
    /// Object called without a method-name symbol first.
    #[error("Bad use of class instance")]
    BadClassUse,
    #[error("Method called with wrong number of arguments")]
    MethodArity,
    /// Building the closure for a method failed. Internal invariant.
    #[error("Failed to evaluate method")]
    MethodEvaluation,
    #[error("Empty sequence")]
    EmptySequence,
    /// Forwarded from the reader or parser.
    #[error("{0}")]
    Parse(String),
    /// Forwarded from the primitive table.
    #[error("{0}")]
    Primitive(String),
    /// The configured step budget ran out.
    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(u64),
}

impl From<L3Error> for EvalError {
    fn from(err: L3Error) -> Self {
        EvalError::Parse(err.to_string())
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
