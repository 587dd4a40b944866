// ABOUTME: Runtime value representation and the formatting rules for printed output

use crate::ast::Stmt;
use crate::class::{Class, Instance};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type DictRef = Rc<RefCell<Vec<(Value, Value)>>>;

/// A user-defined function or method body, shared between the `Stmt::Function`
/// that declared it and every `Callable::Function` value created when that
/// declaration is evaluated, or `bind`'s fresh copy for a specific instance.
pub struct LoxFunction {
    pub name: Option<String>,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<Environment>,
    pub is_initializer: bool,
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoxFunction({})", self.name.as_deref().unwrap_or("<anonymous>"))
    }
}

impl LoxFunction {
    /// Produces a new function whose closure is a fresh environment, parented
    /// on this function's own closure, with `this` bound. Methods are closed
    /// over their defining class's environment (plus a `super` binding, for
    /// subclass methods) at class-declaration time; `bind` layers the
    /// per-instance `this` on top of that shared closure at lookup time.
    pub fn bind(self: &Rc<Self>, this: Value) -> Rc<LoxFunction> {
        let env = Environment::with_parent(Rc::clone(&self.closure));
        env.define("this", this);
        Rc::new(LoxFunction {
            name: self.name.clone(),
            params: self.params.clone(),
            body: Rc::clone(&self.body),
            closure: env,
            is_initializer: self.is_initializer,
        })
    }
}

/// A host-implemented callable. Unlike the fixed-arity `fn` pointer the
/// teacher crate uses for builtins, this holds a boxed closure so that
/// host methods (list/dict methods, bound to a specific receiver) can
/// capture state instead of only dispatching on their argument vector.
pub struct NativeFunction {
    pub name: String,
    pub arity: Option<usize>,
    pub func: Box<dyn Fn(&mut Interpreter, &[Value]) -> Result<Value, RuntimeError>>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

#[derive(Clone, Debug)]
pub enum Callable {
    Function(Rc<LoxFunction>),
    Native(Rc<NativeFunction>),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Function(f) => f.name.as_deref().unwrap_or("lambda"),
            Callable::Native(n) => &n.name,
        }
    }

    pub fn arity(&self) -> Option<usize> {
        match self {
            Callable::Function(f) => Some(f.params.len()),
            Callable::Native(n) => n.arity,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Callable::Native(_))
    }
}

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    List(ListRef),
    Dict(DictRef),
    Callable(Callable),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::from(s.into()))
    }

    pub fn new_list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    pub fn new_dict(pairs: Vec<(Value, Value)>) -> Value {
        Value::Dict(Rc::new(RefCell::new(pairs)))
    }

    /// Only `nil` and `false` are falsy; `0`, `""`, and empty containers are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Value equality for `Nil`/`Bool`/`Number`/`String`; identity equality
    /// (same underlying allocation) for `List`/`Dict`/`Instance`/`Class`,
    /// per the decided equality semantics.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Callable(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                let items = items.borrow();
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Dict(pairs) => {
                let pairs = pairs.borrow();
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Instance(inst) => write!(f, "<{} instance>", inst.class.name),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Callable(c) => {
                if c.is_native() {
                    write!(f, "<native fn>")
                } else {
                    write!(f, "<fn {}>", c.name())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_print_without_trailing_zero() {
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
    }

    #[test]
    fn fractional_numbers_keep_decimals() {
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
    }

    #[test]
    fn nil_and_bools_print_lowercase() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }

    #[test]
    fn lists_print_bracketed_and_comma_joined() {
        let list = Value::new_list(vec![Value::Number(1.0), Value::string("a")]);
        assert_eq!(list.to_string(), "[1, a]");
    }

    #[test]
    fn dicts_print_braced_key_colon_value() {
        let dict = Value::new_dict(vec![(Value::string("k"), Value::Number(1.0))]);
        assert_eq!(dict.to_string(), "{k: 1}");
    }

    #[test]
    fn instances_and_lists_compare_by_identity_not_structure() {
        let a = Value::new_list(vec![Value::Number(1.0)]);
        let b = Value::new_list(vec![Value::Number(1.0)]);
        assert!(!a.is_equal(&b));
        let c = a.clone();
        assert!(a.is_equal(&c));
    }

    #[test]
    fn truthiness_excludes_only_nil_and_false() {
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }
}
