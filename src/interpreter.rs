// ABOUTME: Tree-walking evaluator turning the resolved AST into effects and values

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::builtins;
use crate::class::{Class, Instance};
use crate::env::Environment;
use crate::error::{RuntimeError, Signal};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::token::{Literal, Token, TokenKind};
use crate::value::{Callable, LoxFunction, Value};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::rc::Rc;

/// Evaluates expressions and executes statements by walking the AST
/// directly. Two environment pointers are threaded through: `globals`,
/// which persists for the program's whole lifetime, and `environment`,
/// the innermost scope currently in effect.
pub struct Interpreter {
    pub globals: Rc<Environment>,
    environment: Rc<Environment>,
    locals: HashMap<ExprId, usize>,
    imports_in_progress: Rc<RefCell<HashSet<String>>>,
    imports_completed: Rc<RefCell<HashSet<String>>>,
    output: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        builtins::register_builtins(&globals);
        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            imports_in_progress: Rc::new(RefCell::new(HashSet::new())),
            imports_completed: Rc::new(RefCell::new(HashSet::new())),
            output: Rc::new(RefCell::new(std::io::stdout())),
        }
    }

    /// Builds an interpreter whose `print` output is captured into `output`
    /// instead of going to the process's stdout, for driving and asserting
    /// on the end-to-end scenarios in tests.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        let globals = Environment::new();
        builtins::register_builtins(&globals);
        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            imports_in_progress: Rc::new(RefCell::new(HashSet::new())),
            imports_completed: Rc::new(RefCell::new(HashSet::new())),
            output,
        }
    }

    /// The stream `print` and host built-ins like `input`'s prompt write
    /// through, so native code never reaches past the interpreter to the
    /// process's real stdout.
    pub(crate) fn output(&self) -> Rc<RefCell<dyn Write>> {
        Rc::clone(&self.output)
    }

    /// Merges a resolver's distance map into this interpreter's. Called once
    /// per resolved program; a REPL driver calls this for each line it feeds
    /// in, accumulating distances for every expression seen so far.
    pub fn load_locals(&mut self, locals: HashMap<ExprId, usize>) {
        self.locals.extend(locals);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.execute(stmt).map_err(finalize_escaping_signal)?;
        }
        Ok(())
    }

    /// Evaluates a single expression statement's worth of source and returns
    /// its value, for the REPL's "echo expression results" behavior.
    pub fn evaluate_public(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.evaluate(expr).map_err(finalize_escaping_signal)
    }

    // ---- statements ----

    fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let mut out = self.output.borrow_mut();
                let _ = writeln!(out, "{value}");
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(stmts) => {
                let env = Environment::with_parent(Rc::clone(&self.environment));
                self.execute_block(stmts, env)
            }
            Stmt::If { cond, then_branch, else_branch } => {
                if self.evaluate(cond)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { cond, body, increment, .. } => self.execute_while(cond, body, increment.as_ref()),
            Stmt::Function(decl) => {
                let function = self.make_function(decl);
                self.environment.define(decl.name.lexeme.clone(), Value::Callable(Callable::Function(function)));
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(RuntimeError::Signal(Signal::Return(value)))
            }
            Stmt::Break { .. } => Err(RuntimeError::Signal(Signal::Break)),
            Stmt::Continue { .. } => Err(RuntimeError::Signal(Signal::Continue)),
            Stmt::Class { name, superclass, methods } => self.execute_class(name, superclass, methods),
            Stmt::Throw { keyword, value } => {
                let value = self.evaluate(value)?;
                Err(RuntimeError::Signal(Signal::Thrown(value, keyword.line, keyword.column)))
            }
            Stmt::Try { try_block, except, finally } => self.execute_try(try_block, except, finally),
            Stmt::Import { path } => self.execute_import(path),
        }
    }

    /// Runs `stmts` with `env` as the current environment, restoring the
    /// previous environment on every exit path — normal completion or any
    /// propagated control signal / error.
    fn execute_block(&mut self, stmts: &[Stmt], env: Rc<Environment>) -> Result<(), RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, env);
        for stmt in stmts {
            if let Err(e) = self.execute(stmt) {
                self.environment = previous;
                return Err(e);
            }
        }
        self.environment = previous;
        Ok(())
    }

    /// A `while` tagged `is_for_desugared` retains its `for` loop's
    /// increment separately from its body (see the parser's desugaring), so
    /// that a `continue` — which unwinds out of the body before reaching any
    /// increment embedded at its tail — still runs it before retesting.
    fn execute_while(&mut self, cond: &Expr, body: &Stmt, increment: Option<&Expr>) -> Result<(), RuntimeError> {
        while self.evaluate(cond)?.is_truthy() {
            match self.execute(body) {
                Ok(()) => {}
                Err(RuntimeError::Signal(Signal::Break)) => break,
                Err(RuntimeError::Signal(Signal::Continue)) => {}
                Err(e) => return Err(e),
            }
            if let Some(increment) = increment {
                self.evaluate(increment)?;
            }
        }
        Ok(())
    }

    fn execute_try(
        &mut self,
        try_block: &[Stmt],
        except: &Option<crate::ast::ExceptClause>,
        finally: &Option<Vec<Stmt>>,
    ) -> Result<(), RuntimeError> {
        let try_env = Environment::with_parent(Rc::clone(&self.environment));
        let mut result = self.execute_block(try_block, try_env);

        if let Err(RuntimeError::Signal(Signal::Thrown(ref value, _, _))) = result {
            if let Some(except) = except {
                let caught = value.clone();
                let except_env = Environment::with_parent(Rc::clone(&self.environment));
                except_env.define(except.name.lexeme.clone(), caught);
                result = self.execute_block(&except.body, except_env);
            }
        }

        if let Some(finally) = finally {
            let finally_env = Environment::with_parent(Rc::clone(&self.environment));
            if let Err(e) = self.execute_block(finally, finally_env) {
                // An exception (or other signal) raised inside `finally`
                // replaces whatever was in flight from the try/except.
                return Err(e);
            }
        }

        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: &Option<Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<(), RuntimeError> {
        let superclass_value = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(c) => Some(c),
                _ => {
                    return Err(RuntimeError::Generic {
                        message: "Superclass must be a class.".to_string(),
                        line: name.line,
                        column: name.column,
                    })
                }
            },
            None => None,
        };

        self.environment.define(name.lexeme.clone(), Value::Nil);

        let method_closure = if let Some(sc) = &superclass_value {
            let env = Environment::with_parent(Rc::clone(&self.environment));
            env.define("super", Value::Class(Rc::clone(sc)));
            env
        } else {
            Rc::clone(&self.environment)
        };

        let mut method_map = HashMap::new();
        for decl in methods {
            let is_initializer = decl.name.lexeme == "init";
            let function = Rc::new(LoxFunction {
                name: Some(decl.name.lexeme.clone()),
                params: decl.params.clone(),
                body: Rc::clone(&decl.body),
                closure: Rc::clone(&method_closure),
                is_initializer,
            });
            method_map.insert(decl.name.lexeme.clone(), function);
        }

        let class = Rc::new(Class { name: name.lexeme.clone(), superclass: superclass_value, methods: method_map });
        self.environment
            .assign(&name.lexeme, Value::Class(class))
            .expect("class name was just defined in this scope");
        Ok(())
    }

    fn execute_import(&mut self, path: &Token) -> Result<(), RuntimeError> {
        let module_path = match &path.literal {
            Literal::Str(s) => s.clone(),
            _ => unreachable!("import path token always carries a string literal"),
        };

        if self.imports_completed.borrow().contains(&module_path) {
            return Ok(());
        }
        if !self.imports_in_progress.borrow_mut().insert(module_path.clone()) {
            return Err(RuntimeError::ImportCycle { path: module_path, line: path.line, column: path.column });
        }

        let result = self.run_module(&module_path, path.line, path.column);

        self.imports_in_progress.borrow_mut().remove(&module_path);
        if result.is_ok() {
            self.imports_completed.borrow_mut().insert(module_path);
        }
        result
    }

    fn run_module(&mut self, path: &str, line: usize, column: usize) -> Result<(), RuntimeError> {
        let source = builtins::io::read_module(path).map_err(|e| RuntimeError::ImportFailed {
            path: path.to_string(),
            reason: e.to_string(),
            line,
            column,
        })?;

        let (tokens, lex_errors) = Lexer::new(&source).scan();
        if let Some(e) = lex_errors.into_iter().next() {
            return Err(RuntimeError::ImportFailed { path: path.to_string(), reason: e.to_string(), line, column });
        }
        let (statements, parse_errors) = Parser::new(tokens).parse();
        if let Some(e) = parse_errors.into_iter().next() {
            return Err(RuntimeError::ImportFailed { path: path.to_string(), reason: e.to_string(), line, column });
        }
        let (locals, resolve_errors) = Resolver::new().resolve(&statements);
        if let Some(e) = resolve_errors.into_iter().next() {
            return Err(RuntimeError::ImportFailed { path: path.to_string(), reason: e.to_string(), line, column });
        }

        // A fresh sub-interpreter shares globals (so the module's top-level
        // declarations land where `import` promises) and the same
        // in-progress/completed sets (so a nested cycle is still caught),
        // but keeps its own expression-id distance map: the sub-parser
        // assigned ids from zero independently of the importing program's.
        let mut sub = Interpreter {
            globals: Rc::clone(&self.globals),
            environment: Rc::clone(&self.globals),
            locals,
            imports_in_progress: Rc::clone(&self.imports_in_progress),
            imports_completed: Rc::clone(&self.imports_completed),
            output: Rc::clone(&self.output),
        };
        sub.interpret(&statements)
    }

    // ---- expressions ----

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value, .. } => Ok(literal_value(value)),
            Expr::Variable { id, name } => self.look_up_variable(name, *id),
            Expr::Assign { id, name, value } => {
                let v = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&distance) => self.environment.assign_at(distance, &name.lexeme, v.clone()),
                    None => self.globals.assign(&name.lexeme, v.clone()).map_err(|_| RuntimeError::UndefinedVariable {
                        name: name.lexeme.clone(),
                        line: name.line,
                        column: name.column,
                    })?,
                }
                Ok(v)
            }
            Expr::Unary { op, right, .. } => self.evaluate_unary(op, right),
            Expr::Binary { left, op, right, .. } => self.evaluate_binary(left, op, right),
            Expr::Logical { left, op, right, .. } => self.evaluate_logical(left, op, right),
            Expr::Grouping { inner, .. } => self.evaluate(inner),
            Expr::Call { callee, paren, args, .. } => self.evaluate_call(callee, paren, args),
            Expr::Get { object, name, .. } => self.evaluate_get(object, name),
            Expr::Set { object, name, value, .. } => self.evaluate_set(object, name, value),
            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),
            Expr::Super { id, keyword, method } => self.evaluate_super(*id, keyword, method),
            Expr::Lambda { params, body, .. } => {
                let function = Rc::new(LoxFunction {
                    name: None,
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: Rc::clone(&self.environment),
                    is_initializer: false,
                });
                Ok(Value::Callable(Callable::Function(function)))
            }
            Expr::List { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for e in elements {
                    values.push(self.evaluate(e)?);
                }
                Ok(Value::new_list(values))
            }
            Expr::Dict { pairs, .. } => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    entries.push((self.evaluate(k)?, self.evaluate(v)?));
                }
                Ok(Value::new_dict(entries))
            }
            Expr::Index { object, bracket, key, .. } => {
                let obj = self.evaluate(object)?;
                let key = self.evaluate(key)?;
                self.index_get(&obj, &key, bracket.line, bracket.column)
            }
            Expr::IndexSet { object, bracket, key, value, .. } => {
                let obj = self.evaluate(object)?;
                let key = self.evaluate(key)?;
                let value = self.evaluate(value)?;
                self.index_set(&obj, &key, value, bracket.line, bracket.column)
            }
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value, RuntimeError> {
        let found = match self.locals.get(&id) {
            Some(&distance) => self.environment.get_at(distance, &name.lexeme),
            None => self.globals.get(&name.lexeme),
        };
        found.ok_or_else(|| RuntimeError::UndefinedVariable { name: name.lexeme.clone(), line: name.line, column: name.column })
    }

    fn evaluate_unary(&mut self, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;
        match op.kind {
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            TokenKind::Minus => {
                let n = expect_number(&right, op.line, op.column)?;
                Ok(Value::Number(-n))
            }
            _ => unreachable!("parser only produces ! or - as a unary operator"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        let line = op.line;
        let column = op.column;

        match op.kind {
            TokenKind::Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
                _ => Err(RuntimeError::AddTypeMismatch { line, column }),
            },
            TokenKind::Minus => {
                Ok(Value::Number(expect_number(&left, line, column)? - expect_number(&right, line, column)?))
            }
            TokenKind::Star => {
                Ok(Value::Number(expect_number(&left, line, column)? * expect_number(&right, line, column)?))
            }
            TokenKind::Slash => {
                let (a, b) = (expect_number(&left, line, column)?, expect_number(&right, line, column)?);
                if b == 0.0 {
                    return Err(RuntimeError::DivisionByZero { line, column });
                }
                Ok(Value::Number(a / b))
            }
            TokenKind::Backslash => {
                let (a, b) = (expect_integer(&left, line, column)?, expect_integer(&right, line, column)?);
                if b == 0.0 {
                    return Err(RuntimeError::DivisionByZero { line, column });
                }
                Ok(Value::Number((a / b).floor()))
            }
            TokenKind::Percent => {
                Ok(Value::Number(expect_number(&left, line, column)? % expect_number(&right, line, column)?))
            }
            TokenKind::Caret => {
                Ok(Value::Number(expect_number(&left, line, column)?.powf(expect_number(&right, line, column)?)))
            }
            TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
                self.evaluate_comparison(op.kind, &left, &right, line, column)
            }
            TokenKind::EqualEqual => Ok(Value::Bool(left.is_equal(&right))),
            TokenKind::BangEqual => Ok(Value::Bool(!left.is_equal(&right))),
            _ => unreachable!("parser only produces arithmetic/comparison/equality operators here"),
        }
    }

    fn evaluate_comparison(
        &self,
        kind: TokenKind,
        left: &Value,
        right: &Value,
        line: usize,
        column: usize,
    ) -> Result<Value, RuntimeError> {
        use std::cmp::Ordering;
        let ordering = match (left, right) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::String(a), Value::String(b)) => a.as_ref().cmp(b.as_ref()),
            _ => {
                return Err(RuntimeError::Generic {
                    message: "Operands must be two numbers or two strings.".to_string(),
                    line,
                    column,
                })
            }
        };
        let result = match kind {
            TokenKind::Greater => ordering == Ordering::Greater,
            TokenKind::GreaterEqual => ordering != Ordering::Less,
            TokenKind::Less => ordering == Ordering::Less,
            TokenKind::LessEqual => ordering != Ordering::Greater,
            _ => unreachable!(),
        };
        Ok(Value::Bool(result))
    }

    /// Short-circuits without coercing to bool: the result is whichever
    /// operand value decided the outcome.
    fn evaluate_logical(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        match op.kind {
            TokenKind::Or if left.is_truthy() => Ok(left),
            TokenKind::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(right),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, args: &[Expr]) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate(arg)?);
        }
        self.call(callee, arg_values, paren.line, paren.column)
    }

    fn call(&mut self, callee: Value, args: Vec<Value>, line: usize, column: usize) -> Result<Value, RuntimeError> {
        match callee {
            Value::Callable(Callable::Function(f)) => {
                if f.params.len() != args.len() {
                    return Err(RuntimeError::ArityMismatch {
                        expected: f.params.len().to_string(),
                        actual: args.len(),
                        line,
                        column,
                    });
                }
                self.call_function(&f, args)
            }
            Value::Callable(Callable::Native(native)) => {
                if let Some(arity) = native.arity {
                    if arity != args.len() {
                        return Err(RuntimeError::ArityMismatch {
                            expected: arity.to_string(),
                            actual: args.len(),
                            line,
                            column,
                        });
                    }
                }
                (native.func)(self, &args)
            }
            Value::Class(class) => {
                let arity = class.arity();
                if arity != args.len() {
                    return Err(RuntimeError::ArityMismatch { expected: arity.to_string(), actual: args.len(), line, column });
                }
                let instance = Instance::new(Rc::clone(&class));
                if let Some(init) = class.find_method("init") {
                    let bound = init.bind(Value::Instance(Rc::clone(&instance)));
                    self.call_function(&bound, args)?;
                }
                Ok(Value::Instance(instance))
            }
            _ => Err(RuntimeError::NotCallable { line, column }),
        }
    }

    fn call_function(&mut self, function: &Rc<LoxFunction>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let call_env = Environment::with_parent(Rc::clone(&function.closure));
        for (param, arg) in function.params.iter().zip(args) {
            call_env.define(param.lexeme.clone(), arg);
        }

        let previous = std::mem::replace(&mut self.environment, call_env);
        let mut result = Ok(Value::Nil);
        for stmt in function.body.iter() {
            match self.execute(stmt) {
                Ok(()) => continue,
                Err(RuntimeError::Signal(Signal::Return(value))) => {
                    result = Ok(value);
                    break;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        let call_env = std::mem::replace(&mut self.environment, previous);

        if function.is_initializer {
            // A bare `return;` (or falling off the end) in an initializer
            // still yields `this`; only a propagating error (e.g. an
            // uncaught `throw`) skips that and escapes instead.
            return match result {
                Err(e) => Err(e),
                Ok(_) => Ok(call_env.get("this").expect("initializer's closure always binds this")),
            };
        }
        result
    }

    fn make_function(&self, decl: &FunctionDecl) -> Rc<LoxFunction> {
        Rc::new(LoxFunction {
            name: Some(decl.name.lexeme.clone()),
            params: decl.params.clone(),
            body: Rc::clone(&decl.body),
            closure: Rc::clone(&self.environment),
            is_initializer: false,
        })
    }

    fn evaluate_get(&mut self, object: &Expr, name: &Token) -> Result<Value, RuntimeError> {
        let obj = self.evaluate(object)?;
        match &obj {
            Value::Instance(instance) => {
                if let Some(value) = instance.get(&name.lexeme) {
                    return Ok(value);
                }
                if let Some(method) = instance.class.find_method(&name.lexeme) {
                    let bound = method.bind(obj.clone());
                    return Ok(Value::Callable(Callable::Function(bound)));
                }
                Err(RuntimeError::UndefinedProperty { name: name.lexeme.clone(), line: name.line, column: name.column })
            }
            Value::List(list) => {
                builtins::collections::list_method(Rc::clone(list), &name.lexeme).ok_or_else(|| {
                    RuntimeError::UndefinedProperty { name: name.lexeme.clone(), line: name.line, column: name.column }
                })
            }
            Value::Dict(dict) => {
                builtins::collections::dict_method(Rc::clone(dict), &name.lexeme).ok_or_else(|| {
                    RuntimeError::UndefinedProperty { name: name.lexeme.clone(), line: name.line, column: name.column }
                })
            }
            _ => Err(RuntimeError::Generic {
                message: "Only instances have properties.".to_string(),
                line: name.line,
                column: name.column,
            }),
        }
    }

    fn evaluate_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> Result<Value, RuntimeError> {
        let obj = self.evaluate(object)?;
        let instance = match &obj {
            Value::Instance(instance) => instance,
            _ => {
                return Err(RuntimeError::Generic {
                    message: "Only instances have fields.".to_string(),
                    line: name.line,
                    column: name.column,
                })
            }
        };
        let value = self.evaluate(value)?;
        instance.set(&name.lexeme, value.clone());
        Ok(value)
    }

    /// `super.method` is resolved against the superclass of the method's
    /// *enclosing class*, never the runtime class of `this`, but the
    /// resulting bound method still closes over the current `this`. The
    /// resolver records the distance to the `super` binding; `this` always
    /// sits one scope closer in (see the resolver's class/method scope
    /// nesting).
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value, RuntimeError> {
        let distance = *self
            .locals
            .get(&id)
            .expect("resolver always records a distance for a valid super expression");
        let superclass = match self.environment.get_at(distance, "super") {
            Some(Value::Class(c)) => c,
            _ => unreachable!("resolver only permits super inside a subclass method"),
        };
        let this = self
            .environment
            .get_at(distance - 1, "this")
            .expect("this is always one scope closer than super");

        let found = superclass.find_method(&method.lexeme).ok_or_else(|| RuntimeError::UndefinedProperty {
            name: method.lexeme.clone(),
            line: keyword.line,
            column: keyword.column,
        })?;
        Ok(Value::Callable(Callable::Function(found.bind(this))))
    }

    fn index_get(&self, obj: &Value, key: &Value, line: usize, column: usize) -> Result<Value, RuntimeError> {
        match obj {
            Value::List(list) => {
                let idx = expect_list_index(key, line, column)?;
                list.borrow().get(idx).cloned().ok_or(RuntimeError::IndexOutOfRange { line, column })
            }
            Value::Dict(dict) => dict
                .borrow()
                .iter()
                .find(|(k, _)| k.is_equal(key))
                .map(|(_, v)| v.clone())
                .ok_or(RuntimeError::KeyNotFound { line, column }),
            Value::String(s) => {
                let idx = expect_list_index(key, line, column)?;
                s.chars()
                    .nth(idx)
                    .map(|c| Value::string(c.to_string()))
                    .ok_or(RuntimeError::IndexOutOfRange { line, column })
            }
            _ => Err(RuntimeError::Generic {
                message: format!("Cannot index into a {}.", obj.type_name()),
                line,
                column,
            }),
        }
    }

    fn index_set(&self, obj: &Value, key: &Value, value: Value, line: usize, column: usize) -> Result<Value, RuntimeError> {
        match obj {
            Value::List(list) => {
                let idx = expect_list_index(key, line, column)?;
                let mut list = list.borrow_mut();
                if idx >= list.len() {
                    return Err(RuntimeError::IndexOutOfRange { line, column });
                }
                list[idx] = value.clone();
                Ok(value)
            }
            Value::Dict(dict) => {
                let mut dict = dict.borrow_mut();
                if let Some(entry) = dict.iter_mut().find(|(k, _)| k.is_equal(key)) {
                    entry.1 = value.clone();
                } else {
                    dict.push((key.clone(), value.clone()));
                }
                Ok(value)
            }
            _ => Err(RuntimeError::Generic {
                message: format!("Cannot index-assign into a {}.", obj.type_name()),
                line,
                column,
            }),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// An uncaught `throw` surfaces internally as `RuntimeError::Signal(Signal::Thrown(..))`
/// so it can unwind through `?` the same way any other error does. By the
/// time it reaches the top of `interpret`/`evaluate_public`, no further
/// `try` frame could still catch it, so it is converted into a reportable
/// `UncaughtException` carrying the thrown value and its source line.
fn finalize_escaping_signal(err: RuntimeError) -> RuntimeError {
    match err {
        RuntimeError::Signal(Signal::Thrown(value, line, column)) => RuntimeError::UncaughtException { value, line, column },
        other => other,
    }
}

fn literal_value(value: &crate::ast::LiteralValue) -> Value {
    use crate::ast::LiteralValue as L;
    match value {
        L::Nil => Value::Nil,
        L::Bool(b) => Value::Bool(*b),
        L::Number(n) => Value::Number(*n),
        L::String(s) => Value::string(s.clone()),
    }
}

fn expect_number(value: &Value, line: usize, column: usize) -> Result<f64, RuntimeError> {
    value.as_number().ok_or(RuntimeError::TypeMismatch { expected: "number".to_string(), line, column })
}

/// `\` (floor division) requires both operands to hold integral values, per
/// the number/int distinction: there is one runtime `Number` type, checked
/// for integrality only at the operations that need it.
fn expect_integer(value: &Value, line: usize, column: usize) -> Result<f64, RuntimeError> {
    let n = expect_number(value, line, column)?;
    if n.fract() != 0.0 {
        return Err(RuntimeError::TypeMismatch { expected: "integer".to_string(), line, column });
    }
    Ok(n)
}

pub(crate) fn expect_list_index(value: &Value, line: usize, column: usize) -> Result<usize, RuntimeError> {
    let n = expect_integer(value, line, column)?;
    if n < 0.0 {
        return Err(RuntimeError::IndexOutOfRange { line, column });
    }
    Ok(n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn run(src: &str) -> String {
        let buf: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let mut interp = Interpreter::with_output(buf.clone());
        let (tokens, lex_errors) = Lexer::new(src).scan();
        assert!(lex_errors.is_empty(), "{lex_errors:?}");
        let (stmts, parse_errors) = Parser::new(tokens).parse();
        assert!(parse_errors.is_empty(), "{parse_errors:?}");
        let (locals, resolve_errors) = Resolver::new().resolve(&stmts);
        assert!(resolve_errors.is_empty(), "{resolve_errors:?}");
        interp.load_locals(locals);
        interp.interpret(&stmts).expect("program should run without raising");
        String::from_utf8(buf.borrow().clone()).unwrap()
    }

    fn run_err(src: &str) -> RuntimeError {
        let buf: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let mut interp = Interpreter::with_output(buf);
        let (tokens, _) = Lexer::new(src).scan();
        let (stmts, parse_errors) = Parser::new(tokens).parse();
        assert!(parse_errors.is_empty(), "{parse_errors:?}");
        let (locals, resolve_errors) = Resolver::new().resolve(&stmts);
        assert!(resolve_errors.is_empty(), "{resolve_errors:?}");
        interp.load_locals(locals);
        interp.interpret(&stmts).expect_err("program should raise")
    }

    #[test]
    fn closure_counter_increments_across_calls() {
        let out = run(
            "fun mk(){var i=0;fun c(){i=i+1;print i;}return c;}
             var c=mk(); c(); c(); c();",
        );
        assert_eq!(out, "1\n2\n3\n");
    }

    #[test]
    fn inheritance_and_super_dispatch() {
        let out = run(
            r#"class A{say(){print "A";}}
               class B<A{say(){super.say(); print "B";}}
               B().say();"#,
        );
        assert_eq!(out, "A\nB\n");
    }

    #[test]
    fn initializer_always_yields_the_new_instance() {
        let out = run(r#"class P{init(x){this.x=x;}} print P(7).x;"#);
        assert_eq!(out, "7\n");
    }

    #[test]
    fn for_loop_continue_still_runs_increment() {
        let out = run("for(var i=0;i<4;i=i+1){ if(i==2){continue;} print i; }");
        assert_eq!(out, "0\n1\n3\n");
    }

    #[test]
    fn exception_flow_runs_finally_after_except() {
        let out = run(r#"try{ throw "oops"; } except(e){ print e; } finally{ print "done"; }"#);
        assert_eq!(out, "oops\ndone\n");
    }

    #[test]
    fn uncaught_throw_surfaces_as_uncaught_exception_with_its_line() {
        let err = run_err("print 1;\nthrow \"boom\";");
        match err {
            RuntimeError::UncaughtException { value, line, .. } => {
                assert_eq!(value.to_string(), "boom");
                assert_eq!(line, 2);
            }
            other => panic!("expected UncaughtException, got {other:?}"),
        }
    }

    #[test]
    fn memoized_fibonacci_via_hash() {
        let out = run(
            "var m=hash(); fun f(n){if(n<2)return n; if(m.has(n))return m.get(n);
             var r=f(n-1)+f(n-2); m.set(n,r); return r;} print f(20);",
        );
        assert_eq!(out, "6765\n");
    }

    #[test]
    fn division_by_zero_raises() {
        assert!(matches!(run_err("print 1/0;"), RuntimeError::DivisionByZero { .. }));
    }

    #[test]
    fn adding_string_and_number_raises() {
        assert!(matches!(run_err(r#"print "a"+1;"#), RuntimeError::AddTypeMismatch { .. }));
    }

    #[test]
    fn calling_a_non_callable_raises() {
        assert!(matches!(run_err("var x=1; x();"), RuntimeError::NotCallable { .. }));
    }

    #[test]
    fn wrong_arity_raises() {
        assert!(matches!(run_err("fun f(a,b){} f(1);"), RuntimeError::ArityMismatch { .. }));
    }

    #[test]
    fn reading_undefined_variable_raises() {
        assert!(matches!(run_err("print nope;"), RuntimeError::UndefinedVariable { .. }));
    }

    #[test]
    fn logical_operators_short_circuit_and_return_operand_value() {
        let out = run(r#"print false and (1/0); print true or (1/0);"#);
        assert_eq!(out, "false\ntrue\n");
    }

    #[test]
    fn list_and_dict_literals_print_and_index() {
        let out = run(r#"var l=[1,2,3]; print l[1]; var d={"a":1}; print d["a"];"#);
        assert_eq!(out, "2\n1\n");
    }

    #[test]
    fn closures_capture_declaration_environment_not_call_environment() {
        let out = run(
            "var x = \"outer\";
             fun make() { var x = \"inner\"; fun show() { print x; } return show; }
             var f = make(); x = \"mutated\"; f();",
        );
        assert_eq!(out, "inner\n");
    }
}
