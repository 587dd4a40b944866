//! Type conversion and inspection: `len`, `int`, `float`, `str`, `type`
//!
//! - `len(x)`: element/character count of a string, list, or dict
//! - `int(x)`: truncates a number toward zero, or parses a numeric string
//! - `float(x)`: passes a number through, or parses a numeric string
//! - `str(x)`: the value's printed representation, per the §6 formatting rules
//! - `type(x)`: the value's type name as a string

use super::define_native;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::Value;
use std::rc::Rc;

fn builtin_len(args: &[Value]) -> Result<Value, RuntimeError> {
    let n = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::List(list) => list.borrow().len(),
        Value::Dict(dict) => dict.borrow().len(),
        other => {
            return Err(RuntimeError::TypeMismatch {
                expected: format!("string, list, or dict, got {}", other.type_name()),
                line: 0,
                column: 0,
            })
        }
    };
    Ok(Value::Number(n as f64))
}

fn builtin_int(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(n.trunc())),
        Value::String(s) => s.trim().parse::<f64>().map(|n| Value::Number(n.trunc())).map_err(|_| RuntimeError::Generic {
            message: format!("Cannot convert '{s}' to a number."),
            line: 0,
            column: 0,
        }),
        other => Err(RuntimeError::TypeMismatch {
            expected: format!("number or string, got {}", other.type_name()),
            line: 0,
            column: 0,
        }),
    }
}

fn builtin_float(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::String(s) => s.trim().parse::<f64>().map(Value::Number).map_err(|_| RuntimeError::Generic {
            message: format!("Cannot convert '{s}' to a number."),
            line: 0,
            column: 0,
        }),
        other => Err(RuntimeError::TypeMismatch {
            expected: format!("number or string, got {}", other.type_name()),
            line: 0,
            column: 0,
        }),
    }
}

fn builtin_str(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::string(args[0].to_string()))
}

fn builtin_type(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::string(args[0].type_name()))
}

pub fn register(env: &Rc<Environment>) {
    define_native(env, "len", Some(1), |_interp, args| builtin_len(args));
    define_native(env, "int", Some(1), |_interp, args| builtin_int(args));
    define_native(env, "float", Some(1), |_interp, args| builtin_float(args));
    define_native(env, "str", Some(1), |_interp, args| builtin_str(args));
    define_native(env, "type", Some(1), |_interp, args| builtin_type(args));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_chars_list_and_dict_entries() {
        assert_eq!(builtin_len(&[Value::string("abc")]).unwrap(), Value::Number(3.0));
        assert_eq!(builtin_len(&[Value::new_list(vec![Value::Nil, Value::Nil])]).unwrap(), Value::Number(2.0));
        assert_eq!(builtin_len(&[Value::new_dict(vec![(Value::string("k"), Value::Nil)])]).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn int_truncates_toward_zero() {
        assert_eq!(builtin_int(&[Value::Number(3.7)]).unwrap(), Value::Number(3.0));
        assert_eq!(builtin_int(&[Value::Number(-3.7)]).unwrap(), Value::Number(-3.0));
    }

    #[test]
    fn int_parses_numeric_strings() {
        assert_eq!(builtin_int(&[Value::string("42")]).unwrap(), Value::Number(42.0));
    }

    #[test]
    fn str_matches_display_formatting() {
        assert_eq!(builtin_str(&[Value::Number(7.0)]).unwrap(), Value::string("7"));
        assert_eq!(builtin_str(&[Value::Bool(true)]).unwrap(), Value::string("true"));
    }

    #[test]
    fn type_reports_the_type_name() {
        assert_eq!(builtin_type(&[Value::Nil]).unwrap(), Value::string("nil"));
        assert_eq!(builtin_type(&[Value::new_list(vec![])]).unwrap(), Value::string("list"));
    }
}
