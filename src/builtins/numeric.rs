//! Numeric built-ins: `clock`, `min`, `max`, `abs`, `floor`, `ceil`
//!
//! # Examples
//!
//! ```lox
//! min(3, 7);    // => 3
//! max(3, 7);    // => 7
//! abs(-4);      // => 4
//! floor(3.7);   // => 3
//! ceil(3.2);    // => 4
//! ```

use super::define_native;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::Value;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

fn number(value: &Value) -> Result<f64, RuntimeError> {
    value.as_number().ok_or_else(|| RuntimeError::TypeMismatch {
        expected: format!("number, got {}", value.type_name()),
        line: 0,
        column: 0,
    })
}

fn builtin_clock(_args: &[Value]) -> Result<Value, RuntimeError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| RuntimeError::Generic { message: e.to_string(), line: 0, column: 0 })?;
    Ok(Value::Number(now.as_secs_f64()))
}

fn builtin_min(args: &[Value]) -> Result<Value, RuntimeError> {
    let (a, b) = (number(&args[0])?, number(&args[1])?);
    Ok(Value::Number(a.min(b)))
}

fn builtin_max(args: &[Value]) -> Result<Value, RuntimeError> {
    let (a, b) = (number(&args[0])?, number(&args[1])?);
    Ok(Value::Number(a.max(b)))
}

fn builtin_abs(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&args[0])?.abs()))
}

fn builtin_floor(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&args[0])?.floor()))
}

fn builtin_ceil(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&args[0])?.ceil()))
}

pub fn register(env: &Rc<Environment>) {
    define_native(env, "clock", Some(0), |_interp, args| builtin_clock(args));
    define_native(env, "min", Some(2), |_interp, args| builtin_min(args));
    define_native(env, "max", Some(2), |_interp, args| builtin_max(args));
    define_native(env, "abs", Some(1), |_interp, args| builtin_abs(args));
    define_native(env, "floor", Some(1), |_interp, args| builtin_floor(args));
    define_native(env, "ceil", Some(1), |_interp, args| builtin_ceil(args));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_and_max_pick_the_right_operand() {
        assert_eq!(builtin_min(&[Value::Number(3.0), Value::Number(7.0)]).unwrap(), Value::Number(3.0));
        assert_eq!(builtin_max(&[Value::Number(3.0), Value::Number(7.0)]).unwrap(), Value::Number(7.0));
    }

    #[test]
    fn abs_negates_negative_numbers() {
        assert_eq!(builtin_abs(&[Value::Number(-4.0)]).unwrap(), Value::Number(4.0));
    }

    #[test]
    fn floor_and_ceil_round_toward_the_right_direction() {
        assert_eq!(builtin_floor(&[Value::Number(3.7)]).unwrap(), Value::Number(3.0));
        assert_eq!(builtin_ceil(&[Value::Number(3.2)]).unwrap(), Value::Number(4.0));
    }

    #[test]
    fn clock_returns_a_plausible_unix_timestamp() {
        let Value::Number(n) = builtin_clock(&[]).unwrap() else { panic!("expected a number") };
        assert!(n > 1_700_000_000.0);
    }
}
