// ABOUTME: Error types for each stage of the lex -> parse -> resolve -> interpret pipeline

use crate::value::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum LexError {
    #[error("Unterminated string.")]
    UnterminatedString { line: usize, column: usize },

    #[error("Invalid number literal '{text}'.")]
    InvalidNumber { text: String, line: usize, column: usize },

    #[error("Unexpected character '{ch}'.")]
    UnexpectedChar { ch: char, line: usize, column: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnterminatedString { line, .. }
            | LexError::InvalidNumber { line, .. }
            | LexError::UnexpectedChar { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            LexError::UnterminatedString { column, .. }
            | LexError::InvalidNumber { column, .. }
            | LexError::UnexpectedChar { column, .. } => *column,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Expected {expected}, found '{found}'.")]
    UnexpectedToken { expected: String, found: String, line: usize, column: usize },

    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget { line: usize, column: usize },

    #[error("Can't have more than 255 parameters.")]
    TooManyParameters { line: usize, column: usize },

    #[error("{message}")]
    Generic { message: String, line: usize, column: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. }
            | ParseError::InvalidAssignmentTarget { line, .. }
            | ParseError::TooManyParameters { line, .. }
            | ParseError::Generic { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { column, .. }
            | ParseError::InvalidAssignmentTarget { column, .. }
            | ParseError::TooManyParameters { column, .. }
            | ParseError::Generic { column, .. } => *column,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("Already a variable with this name in this scope.")]
    DuplicateDeclaration { name: String, line: usize, column: usize },

    #[error("Can't read local variable in its own initializer.")]
    SelfReferentialInitializer { name: String, line: usize, column: usize },

    #[error("Can't return from top-level code.")]
    ReturnOutsideFunction { line: usize, column: usize },

    #[error("Can't return a value from an initializer.")]
    ReturnValueFromInitializer { line: usize, column: usize },

    #[error("Can't use 'this' outside of a class.")]
    ThisOutsideClass { line: usize, column: usize },

    #[error("Can't use 'super' outside of a class.")]
    SuperOutsideClass { line: usize, column: usize },

    #[error("Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass { line: usize, column: usize },

    #[error("A class can't inherit from itself.")]
    SelfInheritance { name: String, line: usize, column: usize },

    #[error("Can't use 'break' outside of a loop.")]
    BreakOutsideLoop { line: usize, column: usize },

    #[error("Can't use 'continue' outside of a loop.")]
    ContinueOutsideLoop { line: usize, column: usize },
}

impl ResolveError {
    pub fn line(&self) -> usize {
        match self {
            ResolveError::DuplicateDeclaration { line, .. }
            | ResolveError::SelfReferentialInitializer { line, .. }
            | ResolveError::ReturnOutsideFunction { line, .. }
            | ResolveError::ReturnValueFromInitializer { line, .. }
            | ResolveError::ThisOutsideClass { line, .. }
            | ResolveError::SuperOutsideClass { line, .. }
            | ResolveError::SuperWithoutSuperclass { line, .. }
            | ResolveError::SelfInheritance { line, .. }
            | ResolveError::BreakOutsideLoop { line, .. }
            | ResolveError::ContinueOutsideLoop { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            ResolveError::DuplicateDeclaration { column, .. }
            | ResolveError::SelfReferentialInitializer { column, .. }
            | ResolveError::ReturnOutsideFunction { column, .. }
            | ResolveError::ReturnValueFromInitializer { column, .. }
            | ResolveError::ThisOutsideClass { column, .. }
            | ResolveError::SuperOutsideClass { column, .. }
            | ResolveError::SuperWithoutSuperclass { column, .. }
            | ResolveError::SelfInheritance { column, .. }
            | ResolveError::BreakOutsideLoop { column, .. }
            | ResolveError::ContinueOutsideLoop { column, .. } => *column,
        }
    }
}

/// Non-local control transfers (`return`/`break`/`continue`/`throw`) are
/// folded into `RuntimeError` instead of a side channel, so they flow
/// through the interpreter's existing `Result`-threaded evaluation with
/// plain `?`, the same way the pipeline threads any other error. Each
/// construct that is allowed to catch one peels it back off before it
/// can escape further than it should.
#[derive(Debug, Clone)]
pub enum Signal {
    Return(Value),
    Break,
    Continue,
    Thrown(Value, usize, usize),
}

#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    #[error("Operand must be a number.")]
    TypeMismatch { expected: String, line: usize, column: usize },

    #[error("Operands must be two numbers or two strings.")]
    AddTypeMismatch { line: usize, column: usize },

    #[error("Division by zero.")]
    DivisionByZero { line: usize, column: usize },

    #[error("Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize, column: usize },

    #[error("Undefined property '{name}'.")]
    UndefinedProperty { name: String, line: usize, column: usize },

    #[error("Can only call functions and classes.")]
    NotCallable { line: usize, column: usize },

    #[error("Expected {expected} arguments but got {actual}.")]
    ArityMismatch { expected: String, actual: usize, line: usize, column: usize },

    #[error("Index out of range.")]
    IndexOutOfRange { line: usize, column: usize },

    #[error("Key not found.")]
    KeyNotFound { line: usize, column: usize },

    #[error("{message}")]
    Generic { message: String, line: usize, column: usize },

    #[error("Import cycle detected for '{path}'.")]
    ImportCycle { path: String, line: usize, column: usize },

    #[error("Could not read module '{path}': {reason}")]
    ImportFailed { path: String, reason: String, line: usize, column: usize },

    #[error("Uncaught exception: {value}.")]
    UncaughtException { value: Value, line: usize, column: usize },

    /// Not a real error: a non-local control transfer in flight. Every
    /// variant that can reach the top of `interpret`/`evaluate_public`
    /// unconverted is a bug — `Return`/`Break`/`Continue` are always caught
    /// by the construct they belong to, and an escaping `Thrown` is turned
    /// into `UncaughtException` before it gets there.
    #[error("uncaught control signal")]
    Signal(Signal),
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::TypeMismatch { line, .. }
            | RuntimeError::AddTypeMismatch { line, .. }
            | RuntimeError::DivisionByZero { line, .. }
            | RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::UndefinedProperty { line, .. }
            | RuntimeError::NotCallable { line, .. }
            | RuntimeError::ArityMismatch { line, .. }
            | RuntimeError::IndexOutOfRange { line, .. }
            | RuntimeError::KeyNotFound { line, .. }
            | RuntimeError::Generic { line, .. }
            | RuntimeError::ImportCycle { line, .. }
            | RuntimeError::ImportFailed { line, .. }
            | RuntimeError::UncaughtException { line, .. } => *line,
            RuntimeError::Signal(_) => 0,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            RuntimeError::TypeMismatch { column, .. }
            | RuntimeError::AddTypeMismatch { column, .. }
            | RuntimeError::DivisionByZero { column, .. }
            | RuntimeError::UndefinedVariable { column, .. }
            | RuntimeError::UndefinedProperty { column, .. }
            | RuntimeError::NotCallable { column, .. }
            | RuntimeError::ArityMismatch { column, .. }
            | RuntimeError::IndexOutOfRange { column, .. }
            | RuntimeError::KeyNotFound { column, .. }
            | RuntimeError::Generic { column, .. }
            | RuntimeError::ImportCycle { column, .. }
            | RuntimeError::ImportFailed { column, .. }
            | RuntimeError::UncaughtException { column, .. } => *column,
            RuntimeError::Signal(_) => 0,
        }
    }

    pub fn is_signal(&self) -> bool {
        matches!(self, RuntimeError::Signal(_))
    }
}

#[derive(Error, Debug, Clone)]
pub enum LoxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl LoxError {
    /// Exit code per the CLI contract: 65 for static errors, 70 for runtime errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Lex(_) | LoxError::Parse(_) | LoxError::Resolve(_) => 65,
            LoxError::Runtime(_) => 70,
        }
    }
}
