//! Built-in operators.

use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use l3_types::ast::PrimOp;
use std::rc::Rc;

/// Apply a primitive operator to already-evaluated arguments.
pub fn apply_primitive(op: PrimOp, args: &[Value]) -> EvalResult<Value> {
    match op {
        PrimOp::Add => Ok(Value::Number(numbers(op, args)?.into_iter().sum())),
        PrimOp::Mul => Ok(Value::Number(numbers(op, args)?.into_iter().product())),
        PrimOp::Sub => {
            let (a, b) = number_pair(op, args)?;
            Ok(Value::Number(a - b))
        }
        PrimOp::Div => {
            let (a, b) = number_pair(op, args)?;
            if b == 0.0 {
                return Err(EvalError::Primitive("Division by zero".into()));
            }
            Ok(Value::Number(a / b))
        }
        PrimOp::Gt => {
            let (a, b) = number_pair(op, args)?;
            Ok(Value::Bool(a > b))
        }
        PrimOp::Lt => {
            let (a, b) = number_pair(op, args)?;
            Ok(Value::Bool(a < b))
        }
        PrimOp::NumEq => {
            let (a, b) = number_pair(op, args)?;
            Ok(Value::Bool(a == b))
        }
        PrimOp::Not => {
            let [v] = exactly::<1>(op, args)?;
            Ok(Value::Bool(!v.is_true()))
        }
        PrimOp::And | PrimOp::Or => {
            let [a, b] = exactly::<2>(op, args)?;
            match (a, b) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == PrimOp::And {
                    *a && *b
                } else {
                    *a || *b
                })),
                _ => Err(EvalError::Primitive(format!(
                    "Arguments to \"{}\" not booleans",
                    op.name()
                ))),
            }
        }
        PrimOp::IsEq => {
            let [a, b] = exactly::<2>(op, args)?;
            Ok(Value::Bool(is_eq(a, b)))
        }
        PrimOp::StringEq => {
            let [a, b] = exactly::<2>(op, args)?;
            match (a, b) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(a == b)),
                (Value::Str(_), other) | (other, _) => Err(type_error(op, "strings", other)),
            }
        }
        PrimOp::Cons => {
            let [head, tail] = exactly::<2>(op, args)?;
            Ok(Value::cons(head.clone(), tail.clone()))
        }
        PrimOp::Car | PrimOp::Cdr => {
            let [v] = exactly::<1>(op, args)?;
            match v {
                Value::Pair(pair) if op == PrimOp::Car => Ok(pair.car.clone()),
                Value::Pair(pair) => Ok(pair.cdr.clone()),
                other => Err(type_error(op, "a pair", other)),
            }
        }
        PrimOp::List => Ok(Value::list(args.to_vec())),
        PrimOp::IsPair => predicate(op, args, |v| matches!(v, Value::Pair(_))),
        PrimOp::IsList => predicate(op, args, Value::is_list),
        PrimOp::IsNumber => predicate(op, args, |v| matches!(v, Value::Number(_))),
        PrimOp::IsBoolean => predicate(op, args, |v| matches!(v, Value::Bool(_))),
        PrimOp::IsSymbol => predicate(op, args, |v| matches!(v, Value::Symbol(_))),
        PrimOp::IsString => predicate(op, args, |v| matches!(v, Value::Str(_))),
    }
}

/// Atomic equality. Compound values compare by identity.
fn is_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
        _ => a == b,
    }
}

fn exactly<'a, const N: usize>(op: PrimOp, args: &'a [Value]) -> EvalResult<&'a [Value; N]> {
    args.try_into().map_err(|_| {
        EvalError::Primitive(format!(
            "{}: expected {N} arguments, got {}",
            op.name(),
            args.len()
        ))
    })
}

fn type_error(op: PrimOp, expected: &str, got: &Value) -> EvalError {
    EvalError::Primitive(format!(
        "{}: expected {expected}, got {} {got}",
        op.name(),
        got.type_name()
    ))
}

fn number(op: PrimOp, value: &Value) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(type_error(op, "numbers", other)),
    }
}

fn numbers(op: PrimOp, args: &[Value]) -> EvalResult<Vec<f64>> {
    args.iter().map(|v| number(op, v)).collect()
}

fn number_pair(op: PrimOp, args: &[Value]) -> EvalResult<(f64, f64)> {
    let [a, b] = exactly::<2>(op, args)?;
    Ok((number(op, a)?, number(op, b)?))
}

fn predicate(op: PrimOp, args: &[Value], test: impl Fn(&Value) -> bool) -> EvalResult<Value> {
    let [v] = exactly::<1>(op, args)?;
    Ok(Value::Bool(test(v)))
}
