// ABOUTME: Library crate exposing the lex -> parse -> resolve -> interpret pipeline for testing and the CLI binary

pub mod ast;
pub mod builtins;
pub mod class;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod token;
pub mod value;

use error::LoxError;
use interpreter::Interpreter;
use lexer::Lexer;
use parser::Parser;
use resolver::Resolver;

/// Runs one chunk of source through the full pipeline against an existing
/// interpreter, so a REPL driver can feed it line by line and have `var`,
/// `fun`, and `class` declarations accumulate across calls in the same
/// globals environment. Returns the first diagnostic of whichever stage
/// failed; `diagnostics::render` turns it into the (line, column, excerpt,
/// caret) form the CLI prints.
pub fn run(source: &str, interpreter: &mut Interpreter) -> Result<(), LoxError> {
    let (tokens, lex_errors) = Lexer::new(source).scan();
    if let Some(e) = lex_errors.into_iter().next() {
        return Err(e.into());
    }

    let (statements, parse_errors) = Parser::new(tokens).parse();
    if let Some(e) = parse_errors.into_iter().next() {
        return Err(e.into());
    }

    let (locals, resolve_errors) = Resolver::new().resolve(&statements);
    if let Some(e) = resolve_errors.into_iter().next() {
        return Err(e.into());
    }

    interpreter.load_locals(locals);
    interpreter.interpret(&statements).map_err(LoxError::from)
}
