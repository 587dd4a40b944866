// ABOUTME: Static pass over the AST computing variable scope distances and enforcing scope rules

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::error::ResolveError;
use crate::token::Token;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq)]
enum FunctionKind {
    None,
    Function,
    Method,
    Initializer,
    Lambda,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

#[derive(Clone, Copy, PartialEq)]
enum LoopKind {
    None,
    Loop,
}

/// Whether a local name has only been declared, or also defined. Reading a
/// declared-but-undefined name in its own initializer is a static error.
#[derive(Clone, Copy, PartialEq)]
enum Binding {
    Declared,
    Defined,
}

type Scope = HashMap<String, Binding>;

pub struct Resolver {
    scopes: Vec<Scope>,
    locals: HashMap<ExprId, usize>,
    current_function: FunctionKind,
    current_class: ClassKind,
    current_loop: LoopKind,
    errors: Vec<ResolveError>,
}

type RResult = Result<(), ResolveError>;

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            current_loop: LoopKind::None,
            errors: Vec::new(),
        }
    }

    /// Resolves a whole program, returning the distance map keyed on
    /// expression identity and any resolution errors encountered. The
    /// driver must not run the interpreter if `errors` is non-empty.
    pub fn resolve(mut self, statements: &[Stmt]) -> (HashMap<ExprId, usize>, Vec<ResolveError>) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
        (self.locals, self.errors)
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        if scope.contains_key(&name.lexeme) {
            self.errors.push(ResolveError::DuplicateDeclaration {
                name: name.lexeme.clone(),
                line: name.line,
                column: name.column,
            });
        }
        scope.insert(name.lexeme.clone(), Binding::Declared);
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), Binding::Defined);
        }
    }

    /// Walks the scope stack from innermost outward, recording the hop
    /// count at the first match. Leaves the expression unresolved (global)
    /// if no enclosing scope declares the name.
    fn resolve_local(&mut self, id: ExprId, name: &str) {
        for (i, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                self.locals.insert(id, i);
                return;
            }
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Block(stmts) => {
                self.push_scope();
                for s in stmts {
                    self.resolve_stmt(s);
                }
                self.pop_scope();
            }
            Stmt::If { cond, then_branch, else_branch } => {
                self.resolve_expr(cond);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { cond, body, increment, .. } => {
                self.resolve_expr(cond);
                let enclosing_loop = self.current_loop;
                self.current_loop = LoopKind::Loop;
                self.resolve_stmt(body);
                if let Some(increment) = increment {
                    self.resolve_expr(increment);
                }
                self.current_loop = enclosing_loop;
            }
            Stmt::Function(decl) => {
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.errors.push(ResolveError::ReturnOutsideFunction {
                        line: keyword.line,
                        column: keyword.column,
                    });
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.errors.push(ResolveError::ReturnValueFromInitializer {
                            line: keyword.line,
                            column: keyword.column,
                        });
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Break { keyword } => {
                if self.current_loop == LoopKind::None {
                    self.errors.push(ResolveError::BreakOutsideLoop {
                        line: keyword.line,
                        column: keyword.column,
                    });
                }
            }
            Stmt::Continue { keyword } => {
                if self.current_loop == LoopKind::None {
                    self.errors.push(ResolveError::ContinueOutsideLoop {
                        line: keyword.line,
                        column: keyword.column,
                    });
                }
            }
            Stmt::Class { name, superclass, methods } => {
                self.resolve_class(name, superclass.as_ref(), methods);
            }
            Stmt::Throw { value, .. } => self.resolve_expr(value),
            Stmt::Try { try_block, except, finally } => {
                self.push_scope();
                for s in try_block {
                    self.resolve_stmt(s);
                }
                self.pop_scope();
                if let Some(except) = except {
                    self.push_scope();
                    self.declare(&except.name);
                    self.define(&except.name);
                    for s in &except.body {
                        self.resolve_stmt(s);
                    }
                    self.pop_scope();
                }
                if let Some(finally) = finally {
                    self.push_scope();
                    for s in finally {
                        self.resolve_stmt(s);
                    }
                    self.pop_scope();
                }
            }
            Stmt::Import { .. } => {}
        }
    }

    fn resolve_class(&mut self, name: &Token, superclass: Option<&Expr>, methods: &[std::rc::Rc<FunctionDecl>]) {
        let enclosing_class = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(name);
        self.define(name);

        if let Some(Expr::Variable { id, name: super_name }) = superclass {
            if super_name.lexeme == name.lexeme {
                self.errors.push(ResolveError::SelfInheritance {
                    name: name.lexeme.clone(),
                    line: super_name.line,
                    column: super_name.column,
                });
            }
            self.current_class = ClassKind::Subclass;
            self.resolve_local(*id, &super_name.lexeme);

            self.push_scope();
            self.scopes.last_mut().unwrap().insert("super".to_string(), Binding::Defined);
        }

        self.push_scope();
        self.scopes.last_mut().unwrap().insert("this".to_string(), Binding::Defined);

        for method in methods {
            let kind = if method.name.lexeme == "init" { FunctionKind::Initializer } else { FunctionKind::Method };
            self.resolve_function(method, kind);
        }

        self.pop_scope();
        if superclass.is_some() {
            self.pop_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.current_function;
        let enclosing_loop = self.current_loop;
        self.current_function = kind;
        self.current_loop = LoopKind::None;

        self.push_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        for stmt in decl.body.iter() {
            self.resolve_stmt(stmt);
        }
        self.pop_scope();

        self.current_function = enclosing_function;
        self.current_loop = enclosing_loop;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } => {}
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&Binding::Declared) {
                        self.errors.push(ResolveError::SelfReferentialInitializer {
                            name: name.lexeme.clone(),
                            line: name.line,
                            column: name.column,
                        });
                    }
                }
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Grouping { inner, .. } => self.resolve_expr(inner),
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This { id, keyword } => {
                if self.current_class == ClassKind::None {
                    self.errors.push(ResolveError::ThisOutsideClass { line: keyword.line, column: keyword.column });
                    return;
                }
                self.resolve_local(*id, "this");
            }
            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassKind::None => {
                        self.errors.push(ResolveError::SuperOutsideClass {
                            line: keyword.line,
                            column: keyword.column,
                        });
                        return;
                    }
                    ClassKind::Class => {
                        self.errors.push(ResolveError::SuperWithoutSuperclass {
                            line: keyword.line,
                            column: keyword.column,
                        });
                        return;
                    }
                    ClassKind::Subclass => {}
                }
                self.resolve_local(*id, "super");
            }
            Expr::Lambda { params, body, .. } => {
                let enclosing_function = self.current_function;
                let enclosing_loop = self.current_loop;
                self.current_function = FunctionKind::Lambda;
                self.current_loop = LoopKind::None;

                self.push_scope();
                for param in params {
                    self.declare(param);
                    self.define(param);
                }
                for stmt in body.iter() {
                    self.resolve_stmt(stmt);
                }
                self.pop_scope();

                self.current_function = enclosing_function;
                self.current_loop = enclosing_loop;
            }
            Expr::List { elements, .. } => {
                for e in elements {
                    self.resolve_expr(e);
                }
            }
            Expr::Dict { pairs, .. } => {
                for (k, v) in pairs {
                    self.resolve_expr(k);
                    self.resolve_expr(v);
                }
            }
            Expr::Index { object, key, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(key);
            }
            Expr::IndexSet { object, key, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(key);
                self.resolve_expr(value);
            }
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn resolve(src: &str) -> (HashMap<ExprId, usize>, Vec<ResolveError>) {
        let (tokens, lex_errors) = Lexer::new(src).scan();
        assert!(lex_errors.is_empty());
        let (stmts, parse_errors) = Parser::new(tokens).parse();
        assert!(parse_errors.is_empty(), "{parse_errors:?}");
        Resolver::new().resolve(&stmts)
    }

    #[test]
    fn closure_variable_resolves_to_enclosing_scope() {
        let (_, errors) = resolve("fun mk(){var i=0;fun c(){i=i+1;return i;}return c;}");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn reading_own_initializer_is_an_error() {
        let (_, errors) = resolve("{ var a = a; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::SelfReferentialInitializer { .. }));
    }

    #[test]
    fn duplicate_local_declaration_is_an_error() {
        let (_, errors) = resolve("{ var a = 1; var a = 2; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn duplicate_global_declaration_is_allowed() {
        let (_, errors) = resolve("var a = 1; var a = 2;");
        assert!(errors.is_empty());
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let (_, errors) = resolve("return 1;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::ReturnOutsideFunction { .. }));
    }

    #[test]
    fn return_value_from_initializer_is_an_error() {
        let (_, errors) = resolve("class A { init() { return 1; } }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::ReturnValueFromInitializer { .. }));
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let (_, errors) = resolve("print this;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::ThisOutsideClass { .. }));
    }

    #[test]
    fn super_without_superclass_is_an_error() {
        let (_, errors) = resolve("class A { m() { super.m(); } }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::SuperWithoutSuperclass { .. }));
    }

    #[test]
    fn self_inheritance_is_an_error() {
        let (_, errors) = resolve("class A < A {}");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::SelfInheritance { .. }));
    }

    #[test]
    fn break_and_continue_outside_loop_are_errors() {
        let (_, errors) = resolve("break;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::BreakOutsideLoop { .. }));

        let (_, errors) = resolve("continue;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ResolveError::ContinueOutsideLoop { .. }));
    }

    #[test]
    fn break_inside_loop_is_fine() {
        let (_, errors) = resolve("while (true) { break; }");
        assert!(errors.is_empty());
    }
}
