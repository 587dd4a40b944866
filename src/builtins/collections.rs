//! Collection construction and the list/dict host method protocol.
//!
//! `array()`/`hash()` construct the two container runtime values; the list
//! and dict themselves expose their member protocol (`get`/`set`/…) through
//! [`list_method`]/[`dict_method`], which the interpreter's `Get` evaluation
//! calls into whenever the receiver of a `.` access is a `List` or `Dict`
//! rather than an `Instance`.

use super::define_native;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::expect_list_index;
use crate::value::{Callable, DictRef, ListRef, NativeFunction, Value};
use std::rc::Rc;

pub fn register(env: &Rc<Environment>) {
    define_native(env, "array", None, |_interp, args| Ok(Value::new_list(args.to_vec())));
    define_native(env, "hash", Some(0), |_interp, _args| Ok(Value::new_dict(Vec::new())));
}

fn native(name: &str, arity: Option<usize>, func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static) -> Value {
    let native = NativeFunction { name: name.to_string(), arity, func: Box::new(move |_interp, args| func(args)) };
    Value::Callable(Callable::Native(Rc::new(native)))
}

/// Host methods exposed by list values: `get`, `set`, `append`, `pop`,
/// `copy`, `len`.
pub fn list_method(list: ListRef, name: &str) -> Option<Value> {
    let method = match name {
        "get" => {
            let list = Rc::clone(&list);
            native("get", Some(1), move |args| {
                let idx = expect_list_index(&args[0], 0, 0)?;
                list.borrow().get(idx).cloned().ok_or(RuntimeError::IndexOutOfRange { line: 0, column: 0 })
            })
        }
        "set" => {
            let list = Rc::clone(&list);
            native("set", Some(2), move |args| {
                let idx = expect_list_index(&args[0], 0, 0)?;
                let mut items = list.borrow_mut();
                if idx >= items.len() {
                    return Err(RuntimeError::IndexOutOfRange { line: 0, column: 0 });
                }
                items[idx] = args[1].clone();
                Ok(args[1].clone())
            })
        }
        "append" => {
            let list = Rc::clone(&list);
            native("append", Some(1), move |args| {
                list.borrow_mut().push(args[0].clone());
                Ok(Value::Nil)
            })
        }
        "pop" => {
            let list = Rc::clone(&list);
            native("pop", Some(0), move |_args| {
                list.borrow_mut().pop().ok_or_else(|| RuntimeError::Generic {
                    message: "pop from an empty list.".to_string(),
                    line: 0,
                    column: 0,
                })
            })
        }
        "copy" => {
            let list = Rc::clone(&list);
            native("copy", Some(0), move |_args| Ok(Value::new_list(list.borrow().clone())))
        }
        "len" => {
            let list = Rc::clone(&list);
            native("len", Some(0), move |_args| Ok(Value::Number(list.borrow().len() as f64)))
        }
        _ => return None,
    };
    Some(method)
}

/// Host methods exposed by dict values: `get`, `set`, `keys`, `values`,
/// `has`, `len`. `get` returns `nil` for a missing key rather than raising —
/// callers that want a hard error use the `d[key]` index form instead.
pub fn dict_method(dict: DictRef, name: &str) -> Option<Value> {
    let method = match name {
        "get" => {
            let dict = Rc::clone(&dict);
            native("get", Some(1), move |args| {
                Ok(dict.borrow().iter().find(|(k, _)| k.is_equal(&args[0])).map(|(_, v)| v.clone()).unwrap_or(Value::Nil))
            })
        }
        "set" => {
            let dict = Rc::clone(&dict);
            native("set", Some(2), move |args| {
                let mut entries = dict.borrow_mut();
                if let Some(entry) = entries.iter_mut().find(|(k, _)| k.is_equal(&args[0])) {
                    entry.1 = args[1].clone();
                } else {
                    entries.push((args[0].clone(), args[1].clone()));
                }
                Ok(args[1].clone())
            })
        }
        "keys" => {
            let dict = Rc::clone(&dict);
            native("keys", Some(0), move |_args| Ok(Value::new_list(dict.borrow().iter().map(|(k, _)| k.clone()).collect())))
        }
        "values" => {
            let dict = Rc::clone(&dict);
            native("values", Some(0), move |_args| Ok(Value::new_list(dict.borrow().iter().map(|(_, v)| v.clone()).collect())))
        }
        "has" => {
            let dict = Rc::clone(&dict);
            native("has", Some(1), move |args| Ok(Value::Bool(dict.borrow().iter().any(|(k, _)| k.is_equal(&args[0])))))
        }
        "len" => {
            let dict = Rc::clone(&dict);
            native("len", Some(0), move |_args| Ok(Value::Number(dict.borrow().len() as f64)))
        }
        _ => return None,
    };
    Some(method)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(v: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        match v {
            Value::Callable(Callable::Native(n)) => (n.func)(&mut crate::interpreter::Interpreter::new(), args),
            _ => panic!("expected a native callable"),
        }
    }

    #[test]
    fn list_append_then_len_and_get() {
        let list = Value::new_list(vec![Value::Number(1.0)]);
        let Value::List(list_ref) = list else { unreachable!() };

        call(&list_method(Rc::clone(&list_ref), "append").unwrap(), &[Value::Number(2.0)]).unwrap();
        assert_eq!(call(&list_method(Rc::clone(&list_ref), "len").unwrap(), &[]).unwrap(), Value::Number(2.0));
        assert_eq!(call(&list_method(Rc::clone(&list_ref), "get").unwrap(), &[Value::Number(1.0)]).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn list_get_out_of_range_raises() {
        let list = Value::new_list(vec![]);
        let Value::List(list_ref) = list else { unreachable!() };
        let result = call(&list_method(list_ref, "get").unwrap(), &[Value::Number(0.0)]);
        assert!(matches!(result, Err(RuntimeError::IndexOutOfRange { .. })));
    }

    #[test]
    fn dict_set_then_has_and_get() {
        let dict = Value::new_dict(vec![]);
        let Value::Dict(dict_ref) = dict else { unreachable!() };

        call(&dict_method(Rc::clone(&dict_ref), "set").unwrap(), &[Value::string("k"), Value::Number(1.0)]).unwrap();
        assert_eq!(call(&dict_method(Rc::clone(&dict_ref), "has").unwrap(), &[Value::string("k")]).unwrap(), Value::Bool(true));
        assert_eq!(call(&dict_method(Rc::clone(&dict_ref), "get").unwrap(), &[Value::string("k")]).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn dict_get_missing_key_yields_nil_not_an_error() {
        let dict = Value::new_dict(vec![]);
        let Value::Dict(dict_ref) = dict else { unreachable!() };
        assert_eq!(call(&dict_method(dict_ref, "get").unwrap(), &[Value::string("missing")]).unwrap(), Value::Nil);
    }

    #[test]
    fn unknown_method_name_returns_none() {
        let list = Value::new_list(vec![]);
        let Value::List(list_ref) = list else { unreachable!() };
        assert!(list_method(list_ref, "frobnicate").is_none());
    }
}
