//! L3 tree-walking evaluator over an explicit environment model.
//!
//! Procedures close over a persistent chain of frames ([`Env`]); classes
//! close over their defining environment and objects over their fields.
//! Every failure is an [`EvalError`] returned up the call chain.
//!
//! ```text
//! let value = l3_eval::eval_parse("((lambda (x) (* x x)) 4)")?;
//! assert_eq!(value.to_string(), "16");
//! ```

mod config;
mod env;
mod error;
mod evaluator;
mod primitives;
mod value;

pub use config::{EvalConfig, DEFAULT_STEP_LIMIT};
pub use env::Env;
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, Observer};
pub use primitives::apply_primitive;
pub use value::{Class, Closure, Object, Pair, Value};

use l3_types::ast::Program;
use l3_types::SourceFile;

/// Evaluate a parsed program with the default configuration.
pub fn eval_program(program: &Program) -> EvalResult<Value> {
    Evaluator::default().eval_program(program)
}

/// Read one expression from `text` and evaluate it from the empty
/// environment. A lone definition is an empty sequence.
pub fn eval_parse(text: &str) -> EvalResult<Value> {
    let sexp = l3_parser::parse(text)?;
    let exp = l3_parser::parse_l3_exp(&sexp)?;
    Evaluator::default().eval_sequence(std::slice::from_ref(&exp), &Env::empty())
}

/// Read, parse and evaluate a whole `(L3 exp ...)` program.
pub fn eval_source(text: &str) -> EvalResult<Value> {
    let source_file = SourceFile::new("<input>", text);
    let result = l3_parser::parse_l3_program(&source_file);
    if let Some(err) = result.errors.first() {
        return Err(EvalError::Parse(err.to_string()));
    }
    match result.program {
        Some(program) => eval_program(&program),
        None => Err(EvalError::Parse("no program".into())),
    }
}
