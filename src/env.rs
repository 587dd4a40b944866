// ABOUTME: Environment module for managing variable bindings and lexical scopes

use crate::error::RuntimeError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment { bindings: RefCell::new(HashMap::new()), parent: None })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment { bindings: RefCell::new(HashMap::new()), parent: Some(parent) })
    }

    /// Defines a binding in THIS scope (doesn't walk the parent chain).
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up a symbol in THIS scope and parent scopes recursively.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        if let Some(ref parent) = self.parent {
            return parent.get(name);
        }
        None
    }

    /// Assigns to an existing binding, walking the parent chain. Errors if
    /// the name was never declared anywhere in the chain.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        if let Some(ref parent) = self.parent {
            return parent.assign(name, value);
        }
        Err(RuntimeError::UndefinedVariable { name: name.to_string(), line: 0, column: 0 })
    }

    /// Walks `distance` parent links up from this environment.
    pub fn ancestor(self: &Rc<Self>, distance: usize) -> Rc<Environment> {
        let mut env = Rc::clone(self);
        for _ in 0..distance {
            env = Rc::clone(env.parent.as_ref().expect("resolver distance exceeds environment depth"));
        }
        env
    }

    /// Reads a binding at an exact resolver-computed distance.
    pub fn get_at(self: &Rc<Self>, distance: usize, name: &str) -> Option<Value> {
        self.ancestor(distance).bindings.borrow().get(name).cloned()
    }

    /// Assigns a binding at an exact resolver-computed distance.
    pub fn assign_at(self: &Rc<Self>, distance: usize, name: &str, value: Value) {
        self.ancestor(distance).bindings.borrow_mut().insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x", Value::Number(42.0));

        match env.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 42.0),
            _ => panic!("Expected Number(42.0)"),
        }
    }

    #[test]
    fn undefined_symbol() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn shadowing() {
        let parent = Environment::new();
        parent.define("x", Value::Number(42.0));

        let child = Environment::with_parent(parent);
        child.define("x", Value::Number(100.0));

        match child.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 100.0),
            _ => panic!("Expected Number(100.0)"),
        }
    }

    #[test]
    fn parent_lookup() {
        let parent = Environment::new();
        parent.define("x", Value::Number(42.0));
        let child = Environment::with_parent(parent);

        match child.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 42.0),
            _ => panic!("Expected Number(42.0)"),
        }
    }

    #[test]
    fn assign_walks_parent_chain() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_parent(parent);

        child.assign("x", Value::Number(2.0)).unwrap();
        match child.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 2.0),
            _ => panic!("Expected Number(2.0)"),
        }
    }

    #[test]
    fn assign_to_undefined_fails() {
        let env = Environment::new();
        assert!(env.assign("nope", Value::Nil).is_err());
    }

    #[test]
    fn ancestor_and_distance_lookup() {
        let grandparent = Environment::new();
        grandparent.define("a", Value::Number(1.0));
        let parent = Environment::with_parent(grandparent);
        parent.define("b", Value::Number(2.0));
        let child = Environment::with_parent(parent);
        child.define("c", Value::Number(3.0));

        assert_eq!(child.get_at(0, "c"), Some(Value::Number(3.0)));
        assert_eq!(child.get_at(1, "b"), Some(Value::Number(2.0)));
        assert_eq!(child.get_at(2, "a"), Some(Value::Number(1.0)));
    }
}
