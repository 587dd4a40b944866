//! # Built-in Functions Module
//!
//! Native callables and host object types installed into the globals
//! environment at startup, organized into categories:
//!
//! - **[types]**: `len`, `int`, `float`, `str`, `type` — type conversion/inspection
//! - **[numeric]**: `clock`, `min`, `max`, `abs`, `floor`, `ceil`
//! - **[collections]**: `array`, `hash`, plus the list/dict host method protocol
//! - **[io]**: `input`, and the `import` statement's module loading

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{Callable, NativeFunction, Value};
use std::rc::Rc;

pub mod collections;
pub mod io;
pub mod numeric;
pub mod types;

/// Installs every category of built-in into `env` (the globals environment).
pub fn register_builtins(env: &Rc<Environment>) {
    types::register(env);
    numeric::register(env);
    collections::register(env);
    io::register(env);
}

/// Defines a native (host-implemented) callable in `env`. `arity` of `None`
/// means variadic — the caller skips the arity check entirely.
fn define_native(
    env: &Rc<Environment>,
    name: &str,
    arity: Option<usize>,
    func: impl Fn(&mut Interpreter, &[Value]) -> Result<Value, RuntimeError> + 'static,
) {
    let native = NativeFunction { name: name.to_string(), arity, func: Box::new(func) };
    env.define(name, Value::Callable(Callable::Native(Rc::new(native))));
}
