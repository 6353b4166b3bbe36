//! Core expression evaluator.

use crate::config::EvalConfig;
use crate::env::Env;
use crate::error::{EvalError, EvalResult};
use crate::primitives::apply_primitive;
use crate::value::{Class, Closure, Object, Value};
use l3_types::ast::*;
use l3_types::stack::ensure_sufficient_stack;
use std::rc::Rc;

/// Callback invoked with every expression just before it is evaluated.
pub type Observer = Box<dyn FnMut(&CExp, &Env)>;

/// The environment-model evaluator: walks AST nodes and produces Values.
pub struct Evaluator {
    config: EvalConfig,
    /// Steps taken so far, across every call on this evaluator.
    steps: u64,
    observer: Option<Observer>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvalConfig::default())
    }
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            steps: 0,
            observer: None,
        }
    }

    /// Attach an observer. It sees each expression and the environment it is
    /// about to be evaluated in, and has no way to affect the result.
    pub fn with_observer(mut self, observer: impl FnMut(&CExp, &Env) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Consume one step. Fails once the budget is spent.
    fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if self.steps > self.config.step_limit {
            Err(EvalError::StepLimitExceeded(self.config.step_limit))
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Programs and sequences
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate a whole program from the empty environment.
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<Value> {
        self.eval_sequence(&program.exps, &Env::empty())
    }

    /// Evaluate a body or program top level.
    ///
    /// A definition extends the environment for everything after it, so a
    /// name is visible only to later elements. The value of the last element
    /// is the result; a sequence ending in a definition has none.
    pub fn eval_sequence(&mut self, exps: &[Exp], env: &Env) -> EvalResult<Value> {
        let mut env = env.clone();
        let mut rest = exps;
        loop {
            match rest {
                [] => return Err(EvalError::EmptySequence),
                [Exp::Define(def), tail @ ..] => {
                    let value = self.eval(&def.val, &env)?;
                    tracing::debug!(var = %def.var, "define");
                    env = env.extend(std::slice::from_ref(&def.var), vec![value])?;
                    rest = tail;
                }
                [Exp::Expr(last)] => return self.eval(last, &env),
                [Exp::Expr(first), tail @ ..] => {
                    self.eval(first, &env)?;
                    rest = tail;
                }
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression in `env`.
    pub fn eval(&mut self, exp: &CExp, env: &Env) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_inner(exp, env))
    }

    fn eval_inner(&mut self, exp: &CExp, env: &Env) -> EvalResult<Value> {
        self.tick()?;
        tracing::trace!(exp = %exp, "eval");
        if let Some(observer) = self.observer.as_mut() {
            observer(exp, env);
        }

        match exp {
            CExp::Num(n) => Ok(Value::Number(*n)),
            CExp::Bool(b) => Ok(Value::Bool(*b)),
            CExp::Str(s) => Ok(Value::Str(s.clone())),
            CExp::Lit(datum) => Ok(Value::from(datum)),
            CExp::Prim(op) => Ok(Value::Prim(*op)),
            CExp::VarRef(name) => env.lookup(name),
            CExp::If(if_exp) => self.eval_if(if_exp, env),
            CExp::Proc(proc) => Ok(Value::Closure(Rc::new(Closure {
                proc: Rc::clone(proc),
                env: env.clone(),
            }))),
            CExp::Let(let_exp) => self.eval_let(let_exp, env),
            CExp::App(app) => self.eval_app(app, env),
            CExp::Class(def) => Ok(Value::Class(Rc::new(Class {
                def: Rc::clone(def),
                env: env.clone(),
            }))),
        }
    }

    fn eval_if(&mut self, if_exp: &IfExp, env: &Env) -> EvalResult<Value> {
        if self.eval(&if_exp.test, env)?.is_true() {
            self.eval(&if_exp.then, env)
        } else {
            self.eval(&if_exp.alt, env)
        }
    }

    /// Values are evaluated in the outer environment, so bindings cannot see
    /// each other.
    fn eval_let(&mut self, let_exp: &LetExp, env: &Env) -> EvalResult<Value> {
        let mut vars = Vec::with_capacity(let_exp.bindings.len());
        let mut vals = Vec::with_capacity(let_exp.bindings.len());
        for binding in &let_exp.bindings {
            vars.push(binding.var.clone());
            vals.push(self.eval(&binding.val, env)?);
        }
        let body_env = env.extend(&vars, vals)?;
        self.eval_sequence(&let_exp.body, &body_env)
    }

    fn eval_app(&mut self, app: &AppExp, env: &Env) -> EvalResult<Value> {
        let rator = self.eval(&app.rator, env)?;
        let mut args = Vec::with_capacity(app.rands.len());
        for rand in &app.rands {
            args.push(self.eval(rand, env)?);
        }
        self.apply_procedure(&rator, args)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Application
    // ══════════════════════════════════════════════════════════════════════

    /// Apply an already-evaluated operator to already-evaluated arguments.
    pub fn apply_procedure(&mut self, proc: &Value, args: Vec<Value>) -> EvalResult<Value> {
        match proc {
            Value::Prim(op) => apply_primitive(*op, &args),
            Value::Closure(closure) => self.apply_closure(closure, args),
            Value::Class(class) => {
                tracing::debug!(fields = ?class.def.fields, "instantiate class");
                let env = class.env.extend(&class.def.fields, args)?;
                Ok(Value::Object(Rc::new(Object {
                    class: Class {
                        def: Rc::clone(&class.def),
                        env,
                    },
                })))
            }
            Value::Object(object) => self.apply_method(object, args),
            other => Err(EvalError::BadProcedure(other.to_string())),
        }
    }

    fn apply_closure(&mut self, closure: &Closure, args: Vec<Value>) -> EvalResult<Value> {
        tracing::debug!(params = ?closure.params(), args = args.len(), "apply closure");
        let env = closure.env.extend(closure.params(), args)?;
        self.eval_sequence(&closure.proc.body, &env)
    }

    /// `(object 'method arg ...)`: the first method with a matching name
    /// wins, and its closure is built over the object's field environment.
    fn apply_method(&mut self, object: &Object, mut args: Vec<Value>) -> EvalResult<Value> {
        let name = match args.first() {
            Some(Value::Symbol(name)) => name.clone(),
            _ => return Err(EvalError::BadClassUse),
        };
        let proc = match object.class.def.method(&name) {
            Some(proc @ CExp::Proc(method)) => {
                if args.len() - 1 != method.params.len() {
                    return Err(EvalError::MethodArity);
                }
                proc
            }
            _ => return Err(EvalError::UnrecognizedMethod(name)),
        };
        tracing::debug!(method = %name, "apply method");

        let closure = match self.eval(proc, &object.class.env) {
            Ok(Value::Closure(closure)) => closure,
            Err(err @ EvalError::StepLimitExceeded(_)) => return Err(err),
            _ => return Err(EvalError::MethodEvaluation),
        };
        args.remove(0);
        self.apply_closure(&closure, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> CExp {
        CExp::Num(n)
    }

    fn eval(exp: CExp) -> EvalResult<Value> {
        Evaluator::default().eval(&exp, &Env::empty())
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval(num(3.0)), Ok(Value::Number(3.0)));
        assert_eq!(eval(CExp::str("s")), Ok(Value::str("s")));
        assert_eq!(eval(CExp::Prim(PrimOp::Car)), Ok(Value::Prim(PrimOp::Car)));
    }

    #[test]
    fn test_application_of_closure() {
        let inc = CExp::proc(
            ["x"],
            vec![CExp::app(CExp::Prim(PrimOp::Add), vec![CExp::var("x"), num(1.0)]).into()],
        );
        assert_eq!(eval(CExp::app(inc, vec![num(4.0)])), Ok(Value::Number(5.0)));
    }

    #[test]
    fn test_closure_arity() {
        let id = CExp::proc(["x"], vec![CExp::var("x").into()]);
        assert_eq!(
            eval(CExp::app(id, vec![])),
            Err(EvalError::ArityMismatch { expected: 1, got: 0 })
        );
    }

    #[test]
    fn test_sequence_define_then_use() {
        let exps = vec![Exp::define("x", num(1.0)), CExp::var("x").into()];
        let result = Evaluator::default().eval_sequence(&exps, &Env::empty());
        assert_eq!(result, Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_sequence_ending_in_define() {
        let exps = vec![Exp::define("x", num(1.0))];
        let result = Evaluator::default().eval_sequence(&exps, &Env::empty());
        assert_eq!(result, Err(EvalError::EmptySequence));
    }

    #[test]
    fn test_steps_counted() {
        let mut evaluator = Evaluator::default();
        evaluator
            .eval(&CExp::app(CExp::Prim(PrimOp::Add), vec![num(1.0), num(2.0)]), &Env::empty())
            .unwrap();
        assert_eq!(evaluator.steps(), 4);
    }

    #[test]
    fn test_step_limit() {
        let mut evaluator = Evaluator::new(EvalConfig::with_step_limit(2));
        let err = evaluator
            .eval(&CExp::app(CExp::Prim(PrimOp::Add), vec![num(1.0), num(2.0)]), &Env::empty())
            .unwrap_err();
        assert_eq!(err, EvalError::StepLimitExceeded(2));
    }
}
