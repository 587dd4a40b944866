//! Host I/O: the `input` built-in and the file read behind the `import` statement.
//!
//! Grounded on the teacher's filesystem built-ins' "open, read, implicit
//! close on exit" discipline — `std::fs::read_to_string` opens a `File`
//! internally and drops (closing) it before returning, on every exit path,
//! success or failure.

use super::define_native;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::Value;
use std::io::{self, Write};
use std::rc::Rc;

/// The prompt (if any) is written through the interpreter's own output
/// stream, the same one `Stmt::Print` writes through, so a caller capturing
/// that stream (a test, an embedding) sees it — rather than going straight
/// to the process's real stdout regardless of what the interpreter was
/// built with.
fn builtin_input(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() > 1 {
        return Err(RuntimeError::ArityMismatch { expected: "0 or 1".to_string(), actual: args.len(), line: 0, column: 0 });
    }
    if let Some(prompt) = args.first() {
        let output = interp.output();
        let mut out = output.borrow_mut();
        write!(out, "{prompt}").map_err(|e| RuntimeError::Generic { message: e.to_string(), line: 0, column: 0 })?;
        out.flush().map_err(|e| RuntimeError::Generic { message: e.to_string(), line: 0, column: 0 })?;
    }

    let mut line = String::new();
    io::stdin().read_line(&mut line).map_err(|e| RuntimeError::Generic { message: e.to_string(), line: 0, column: 0 })?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::string(line))
}

/// Reads a module's source text for the `import` statement. The file handle
/// is closed (dropped) before this returns, on both the success and failure
/// paths.
pub fn read_module(path: &str) -> io::Result<String> {
    std::fs::read_to_string(path)
}

pub fn register(env: &Rc<Environment>) {
    define_native(env, "input", None, builtin_input);
}
