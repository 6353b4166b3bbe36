//! Persistent environment chain for the L3 evaluator.

use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// One level of the chain: names bound positionally to values.
struct Frame {
    vars: Vec<String>,
    vals: Vec<Value>,
    parent: Env,
}

/// A chain of frames, innermost first.
///
/// Extending never touches an existing frame; it allocates a new one whose
/// parent is `self`. Clones are cheap and share every frame, which is how
/// closures, classes and objects capture their environment.
#[derive(Clone, Default)]
pub struct Env {
    frame: Option<Rc<Frame>>,
}

impl Env {
    /// The root environment, with no bindings.
    pub fn empty() -> Self {
        Self { frame: None }
    }

    /// A new environment with one frame binding `vars` to `vals` on top of
    /// `self`. Fails if the two lengths differ.
    pub fn extend(&self, vars: &[String], vals: Vec<Value>) -> EvalResult<Env> {
        if vars.len() != vals.len() {
            return Err(EvalError::ArityMismatch {
                expected: vars.len(),
                got: vals.len(),
            });
        }
        Ok(Env {
            frame: Some(Rc::new(Frame {
                vars: vars.to_vec(),
                vals,
                parent: self.clone(),
            })),
        })
    }

    /// Find the innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> EvalResult<Value> {
        let mut current = self;
        while let Some(frame) = &current.frame {
            if let Some(i) = frame.vars.iter().position(|v| v == name) {
                return Ok(frame.vals[i].clone());
            }
            current = &frame.parent;
        }
        Err(EvalError::UnboundVariable(name.to_string()))
    }
}

impl Drop for Frame {
    // Unlink parents iteratively so dropping a long chain can't overflow
    // the stack.
    fn drop(&mut self) {
        let mut next = self.parent.frame.take();
        while let Some(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut frame) => next = frame.parent.frame.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut current = self;
        while let Some(frame) = &current.frame {
            list.entry(&frame.vars);
            current = &frame.parent;
        }
        list.finish()
    }
}
