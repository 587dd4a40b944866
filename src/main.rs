mod config;

use clap::Parser as ClapParser;
use config::{HELP_TEXT, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use lox::ast::Stmt;
use lox::diagnostics;
use lox::error::LoxError;
use lox::interpreter::Interpreter;
use lox::lexer::Lexer;
use lox::parser::Parser;
use lox::resolver::Resolver;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;

/// A tree-walking interpreter for Lox
#[derive(ClapParser, Debug)]
#[command(name = "lox")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter for the Lox language")]
struct CliArgs {
    /// Script file to execute (starts a REPL if omitted)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match args.script {
        Some(path) => run_file(&path),
        None => {
            run_repl();
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot read script file {}: {e}", path.display());
            return ExitCode::from(70);
        }
    };

    let mut interpreter = Interpreter::new();
    match lox::run(&source, &mut interpreter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&source, &e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run_repl() {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), rustyline::history::DefaultHistory> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to initialize REPL: {e}");
            return;
        }
    };

    let history_file = ".lox_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline("lox> ") {
            Ok(line) => {
                match line.trim() {
                    "" => continue,
                    ":help" => {
                        println!("{HELP_TEXT}");
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }
                run_repl_line(&line, &mut interpreter);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
}

/// A REPL line gets one extra courtesy over file-mode execution: if it
/// parses down to a single bare expression statement, its value is echoed
/// instead of silently discarded, the way the file-mode pipeline would.
/// Runtime errors are printed and the REPL keeps going rather than exiting.
fn run_repl_line(line: &str, interpreter: &mut Interpreter) {
    let (tokens, lex_errors) = Lexer::new(line).scan();
    if let Some(e) = lex_errors.into_iter().next() {
        report(line, &LoxError::from(e));
        return;
    }

    let (statements, parse_errors) = Parser::new(tokens).parse();
    if let Some(e) = parse_errors.into_iter().next() {
        report(line, &LoxError::from(e));
        return;
    }

    let (locals, resolve_errors) = Resolver::new().resolve(&statements);
    if let Some(e) = resolve_errors.into_iter().next() {
        report(line, &LoxError::from(e));
        return;
    }
    interpreter.load_locals(locals);

    if let [Stmt::Expression(expr)] = statements.as_slice() {
        match interpreter.evaluate_public(expr) {
            Ok(value) => println!("{value}"),
            Err(e) => report(line, &LoxError::from(e)),
        }
        return;
    }

    if let Err(e) = interpreter.interpret(&statements) {
        report(line, &LoxError::from(e));
    }
}

fn report(source: &str, error: &LoxError) {
    let (line, column, message) = match error {
        LoxError::Lex(e) => (e.line(), e.column(), e.to_string()),
        LoxError::Parse(e) => (e.line(), e.column(), e.to_string()),
        LoxError::Resolve(e) => (e.line(), e.column(), e.to_string()),
        LoxError::Runtime(e) => (e.line(), e.column(), e.to_string()),
    };
    eprintln!("{}", diagnostics::render(source, line, column, &message));
}
